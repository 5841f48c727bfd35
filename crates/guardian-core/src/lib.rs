//! Guardian-core: Shared types, errors, and configuration
//!
//! This crate provides the foundational types used across the Guardian workspace.

pub mod config;
pub mod display;
pub mod errors;
pub mod types;

pub use config::*;
pub use display::*;
pub use errors::*;
pub use types::*;

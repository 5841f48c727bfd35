//! Guardian-api: HTTP API layer for Base Guardian
//!
//! Provides a RESTful API for front-ends to submit paid analysis requests
//! and follow their cross-chain confirmation.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::{ApiError, AppState, WalletSession};

//! CLI command implementations

pub mod deploy;
pub mod request;
pub mod serve;
pub mod watch;

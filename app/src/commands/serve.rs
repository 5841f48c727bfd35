//! `guardian serve` - run the HTTP API

use anyhow::{Context, Result};

use guardian_api::{start_server, AppState};
use guardian_core::AppConfig;

pub async fn run(config: AppConfig, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.api_port);
    if config.signer_key.is_none() {
        tracing::warn!(
            "GUARDIAN_SIGNER_KEY not set; analysis submission endpoints will be read-only"
        );
    }

    let state = AppState::with_config(config).context("building application state")?;
    start_server(state, port).await.context("API server exited")
}

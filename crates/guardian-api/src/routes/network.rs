//! Network status and configuration endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use guardian_core::Network;

use crate::dto::{ApiError, NetworkConfigRequest, NetworkStatusResponse};
use crate::AppState;

/// Create network routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/configure", post(configure))
}

/// GET /network/status - Get current network status
pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<NetworkStatusResponse>, (StatusCode, Json<ApiError>)> {
    let config = state.config().await;
    let supported = config.network.chain_id == Network::BASE_SEPOLIA_CHAIN_ID;

    // Try to reach the RPC endpoint through the contracts client
    match state.contracts().await {
        Ok(client) => Ok(Json(NetworkStatusResponse {
            connected: true,
            network: config.network.name,
            chain_id: config.network.chain_id,
            supported,
            rpc_url: config.network.rpc_url,
            signer: client.signer_address(),
            contracts: config.contracts,
        })),
        Err(_) => Ok(Json(NetworkStatusResponse {
            connected: false,
            network: config.network.name,
            chain_id: config.network.chain_id,
            supported,
            rpc_url: config.network.rpc_url,
            signer: None,
            contracts: config.contracts,
        })),
    }
}

/// POST /network/configure - Update network configuration
pub async fn configure(
    State(state): State<AppState>,
    Json(request): Json<NetworkConfigRequest>,
) -> Result<Json<NetworkStatusResponse>, (StatusCode, Json<ApiError>)> {
    state
        .set_network_config(request.rpc_url, request.chain_id)
        .await;

    if let Some(cctx_url) = request.cctx_url {
        state.set_cctx_url(cctx_url).await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::internal(e.to_string())),
            )
        })?;
    }

    get_status(State(state)).await
}

//! Session wallet endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::dto::{ApiError, WalletConnectRequest, WalletStatusResponse};
use crate::AppState;

/// Create wallet routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/connect", post(connect))
        .route("/disconnect", post(disconnect))
        .route("/status", get(status))
}

/// POST /wallet/connect - Register a wallet address for this session
pub async fn connect(
    State(state): State<AppState>,
    Json(request): Json<WalletConnectRequest>,
) -> Result<Json<WalletStatusResponse>, (StatusCode, Json<ApiError>)> {
    let session = state.connect_wallet(request.address).await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("invalid_address", e.to_string())),
        )
    })?;

    tracing::info!(address = %session.address, "wallet connected");
    Ok(Json(WalletStatusResponse {
        connected: true,
        address: Some(session.address),
    }))
}

/// POST /wallet/disconnect - Clear the session wallet
pub async fn disconnect(State(state): State<AppState>) -> Json<WalletStatusResponse> {
    state.disconnect_wallet().await;
    Json(WalletStatusResponse {
        connected: false,
        address: None,
    })
}

/// GET /wallet/status - Session wallet state
pub async fn status(State(state): State<AppState>) -> Json<WalletStatusResponse> {
    match state.wallet().await {
        Some(session) => Json(WalletStatusResponse {
            connected: true,
            address: Some(session.address),
        }),
        None => Json(WalletStatusResponse {
            connected: false,
            address: None,
        }),
    }
}

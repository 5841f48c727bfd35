//! Cross-chain transfer tracking endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::dto::{ApiError, ResetRequest, TransferResponse, WatchRequest};
use crate::AppState;

/// Create transfer routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/watch", post(watch))
        .route("/reset", post(reset))
}

async fn snapshot(state: &AppState) -> TransferResponse {
    let config = state.config().await;
    let watch_state = state.transfer_state().await;
    let label = state.transfer_label().await;
    TransferResponse::build(
        &watch_state,
        label.as_deref(),
        &config.network.explorer_url,
        &config.cctx.explorer_url,
    )
}

/// GET /transfer/status - Snapshot of the tracked transfer
pub async fn get_status(State(state): State<AppState>) -> Json<TransferResponse> {
    Json(snapshot(&state).await)
}

/// POST /transfer/watch - Poll a source-chain transaction until it settles
pub async fn watch(
    State(state): State<AppState>,
    Json(request): Json<WatchRequest>,
) -> Result<Json<TransferResponse>, (StatusCode, Json<ApiError>)> {
    if request.hash.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request("Transaction hash must not be empty")),
        ));
    }
    if !request.hash.is_wellformed() {
        tracing::debug!(hash = %request.hash, "hash does not look like an EVM transaction hash");
    }

    state.watch_transfer(request.hash, request.label).await;
    Ok(Json(snapshot(&state).await))
}

/// POST /transfer/reset - Stop watching and clear the tracked transfer
pub async fn reset(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<TransferResponse>, (StatusCode, Json<ApiError>)> {
    if let Err(e) = state.reset_transfer(request.force).await {
        return Err((
            StatusCode::CONFLICT,
            Json(ApiError::new("transfer_in_flight", e.to_string())),
        ));
    }
    Ok(Json(snapshot(&state).await))
}

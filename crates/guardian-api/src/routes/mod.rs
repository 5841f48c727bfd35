//! API route handlers

pub mod health;
pub mod network;
pub mod requests;
pub mod transfer;
pub mod wallet;

use axum::http::StatusCode;
use axum::{routing::get, Json, Router};

use guardian_core::ContractError;

use crate::dto::ApiError;
use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/network", network::router())
        .nest("/wallet", wallet::router())
        .nest("/requests", requests::router())
        .nest("/transfer", transfer::router())
        .with_state(state)
}

/// Map a contract layer error onto an HTTP error response
pub(crate) fn contract_error_response(e: &ContractError) -> (StatusCode, Json<ApiError>) {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiError::new(e.error_code(), e.to_string())))
}

//! Paid analysis request endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use guardian_core::tx_url;
use guardian_watcher::WatchPhase;

use crate::dto::{ApiError, RequestsQuery, RequestsResponse, SubmitRequest, SubmitResponse};
use crate::routes::contract_error_response;
use crate::AppState;

/// Create analysis request routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit))
        .route("/list", get(list))
}

/// POST /requests/submit - Submit a paid analysis request on-chain
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, (StatusCode, Json<ApiError>)> {
    let target = request.target.trim().to_string();
    if target.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request("Analysis target must not be empty")),
        ));
    }

    let client = state
        .contracts()
        .await
        .map_err(|e| contract_error_response(&e))?;

    let receipt = client
        .request_analysis(request.kind, &target)
        .await
        .map_err(|e| contract_error_response(&e))?;

    // Hand the submitted hash to the confirmation watcher unless the
    // caller opted out
    let mut watching = false;
    if request.watch.unwrap_or(true) {
        let label = request.label.unwrap_or_else(|| target.clone());
        let watch_state = state
            .watch_transfer(receipt.tx_hash.clone(), Some(label))
            .await;
        watching = watch_state.phase == WatchPhase::Polling;
    }

    let config = state.config().await;
    Ok(Json(SubmitResponse {
        kind: receipt.kind,
        target,
        explorer_url: tx_url(&config.network.explorer_url, &receipt.tx_hash),
        tx_hash: receipt.tx_hash,
        payment_wei: receipt.payment_wei,
        watching,
    }))
}

/// GET /requests/list - Past analysis requests for one address
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RequestsQuery>,
) -> Result<Json<RequestsResponse>, (StatusCode, Json<ApiError>)> {
    let address = match query.address {
        Some(address) => address,
        None => match state.wallet().await {
            Some(session) => session.address,
            None => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiError::bad_request(
                        "No address given and no wallet connected",
                    )),
                ));
            }
        },
    };

    let client = state
        .contracts()
        .await
        .map_err(|e| contract_error_response(&e))?;

    let requests = client
        .user_requests(query.kind, &address)
        .await
        .map_err(|e| contract_error_response(&e))?;

    Ok(Json(RequestsResponse {
        kind: query.kind,
        address,
        count: requests.len(),
        requests,
    }))
}

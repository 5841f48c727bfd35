//! Cctx-client: cross-chain transaction status lookups
//!
//! Wraps the LCD-style `inboundHashToCctxData` endpoint that maps a source
//! chain transaction hash to the matching destination-chain transaction,
//! once the relay network has observed and forwarded it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use guardian_core::{CctxError, TxHash};

/// Timeout for a single status request (seconds)
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Outcome of a single status lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CctxLookup {
    /// Destination-chain transaction found
    Settled(TxHash),
    /// Transfer not indexed yet, or no outbound hash published yet
    Pending,
}

/// Response body of the status endpoint.
///
/// Only the first transaction's first outbound parameter is consulted;
/// every other field the endpoint returns is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CrossChainTxResponse {
    #[serde(rename = "CrossChainTxs", default)]
    pub cross_chain_txs: Vec<CrossChainTx>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrossChainTx {
    #[serde(default)]
    pub outbound_params: Vec<OutboundParams>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutboundParams {
    #[serde(default)]
    pub hash: String,
}

impl CrossChainTxResponse {
    /// Destination-chain hash, when present and non-empty.
    pub fn outbound_hash(&self) -> Option<TxHash> {
        let hash = &self
            .cross_chain_txs
            .first()?
            .outbound_params
            .first()?
            .hash;
        if hash.is_empty() {
            None
        } else {
            Some(TxHash::new(hash.clone()))
        }
    }
}

/// Source of settlement lookups.
///
/// The confirmation watcher polls through this seam, so tests can swap in
/// scripted responses without a network.
#[async_trait]
pub trait CctxLookupSource: Send + Sync {
    async fn lookup(&self, inbound: &TxHash) -> Result<CctxLookup, CctxError>;
}

/// HTTP client for the status endpoint
#[derive(Debug, Clone)]
pub struct CctxClient {
    http: reqwest::Client,
    base_url: String,
}

impl CctxClient {
    /// Create a client for the given endpoint base.
    ///
    /// A trailing slash on `base_url` is tolerated; request URLs always
    /// carry exactly one separator before the hash.
    pub fn new(base_url: impl Into<String>) -> Result<Self, CctxError> {
        let http = reqwest::Client::builder()
            .user_agent("base-guardian")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CctxError::Transport(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for an inbound hash.
    pub fn endpoint_for(&self, inbound: &TxHash) -> String {
        format!("{}/{}", self.base_url, inbound)
    }
}

#[async_trait]
impl CctxLookupSource for CctxClient {
    async fn lookup(&self, inbound: &TxHash) -> Result<CctxLookup, CctxError> {
        let url = self.endpoint_for(inbound);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CctxError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // The indexer 404s until it has seen the inbound hash.
            tracing::debug!(%inbound, "transfer not indexed yet");
            return Ok(CctxLookup::Pending);
        }
        if !status.is_success() {
            return Err(CctxError::Status {
                status: status.as_u16(),
            });
        }

        let body: CrossChainTxResponse = response
            .json()
            .await
            .map_err(|e| CctxError::Parse(e.to_string()))?;

        match body.outbound_hash() {
            Some(hash) => {
                tracing::debug!(%inbound, destination = %hash, "transfer settled");
                Ok(CctxLookup::Settled(hash))
            }
            None => Ok(CctxLookup::Pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};

    fn settled_body(hash: &str) -> serde_json::Value {
        serde_json::json!({
            "CrossChainTxs": [{
                "creator": "base1g5mvynl6y5zwvlqhr9l6gtpuwjy9wjzj9slxpp",
                "index": "0x3a9f",
                "outbound_params": [{
                    "receiver": "0x70e967acfcc17c3941e87562161406d41676fd83",
                    "hash": hash
                }]
            }]
        })
    }

    #[test]
    fn test_outbound_hash_extraction() {
        let body: CrossChainTxResponse =
            serde_json::from_value(settled_body("0xdest")).unwrap();
        assert_eq!(body.outbound_hash(), Some(TxHash::new("0xdest")));
    }

    #[test]
    fn test_outbound_hash_missing_pieces() {
        let no_txs: CrossChainTxResponse =
            serde_json::from_value(serde_json::json!({ "CrossChainTxs": [] })).unwrap();
        assert_eq!(no_txs.outbound_hash(), None);

        let no_params: CrossChainTxResponse = serde_json::from_value(serde_json::json!({
            "CrossChainTxs": [{ "outbound_params": [] }]
        }))
        .unwrap();
        assert_eq!(no_params.outbound_hash(), None);

        let empty_hash: CrossChainTxResponse = serde_json::from_value(serde_json::json!({
            "CrossChainTxs": [{ "outbound_params": [{ "hash": "" }] }]
        }))
        .unwrap();
        assert_eq!(empty_hash.outbound_hash(), None);

        // Endpoint answered for an unknown hash with an empty body
        let bare: CrossChainTxResponse =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(bare.outbound_hash(), None);
    }

    #[test]
    fn test_endpoint_for_single_separator() {
        let client = CctxClient::new("https://example.invalid/lcd/cctx/").unwrap();
        assert_eq!(
            client.endpoint_for(&TxHash::new("0xabc")),
            "https://example.invalid/lcd/cctx/0xabc"
        );

        let client = CctxClient::new("https://example.invalid/lcd/cctx").unwrap();
        assert_eq!(
            client.endpoint_for(&TxHash::new("0xabc")),
            "https://example.invalid/lcd/cctx/0xabc"
        );
    }

    async fn status_stub(Path(hash): Path<String>) -> (StatusCode, Json<serde_json::Value>) {
        match hash.as_str() {
            "0xsettled" => (StatusCode::OK, Json(settled_body("0xdest"))),
            "0xpending" => (
                StatusCode::OK,
                Json(serde_json::json!({ "CrossChainTxs": [{ "outbound_params": [] }] })),
            ),
            "0xbroken" => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "indexer down" })),
            ),
            _ => (StatusCode::NOT_FOUND, Json(serde_json::json!({}))),
        }
    }

    async fn spawn_stub() -> CctxClient {
        let app = Router::new().route("/:hash", get(status_stub));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        CctxClient::new(format!("http://127.0.0.1:{port}")).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_settled() {
        let client = spawn_stub().await;
        let result = client.lookup(&TxHash::new("0xsettled")).await.unwrap();
        assert_eq!(result, CctxLookup::Settled(TxHash::new("0xdest")));
    }

    #[tokio::test]
    async fn test_lookup_pending_variants() {
        let client = spawn_stub().await;

        // Indexed but no outbound hash published yet
        let result = client.lookup(&TxHash::new("0xpending")).await.unwrap();
        assert_eq!(result, CctxLookup::Pending);

        // Not indexed at all
        let result = client.lookup(&TxHash::new("0xunknown")).await.unwrap();
        assert_eq!(result, CctxLookup::Pending);
    }

    #[tokio::test]
    async fn test_lookup_server_error() {
        let client = spawn_stub().await;
        let err = client.lookup(&TxHash::new("0xbroken")).await.unwrap_err();
        match err {
            CctxError::Status { status } => assert_eq!(status, 500),
            other => panic!("unexpected error: {other}"),
        }
    }
}

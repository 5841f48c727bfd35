//! Data Transfer Objects for API requests and responses

use serde::{Deserialize, Serialize};

use guardian_contracts::AnalysisRequest;
use guardian_core::{
    truncate_label, tx_url, AnalysisKind, ContractAddresses, TxHash, MAX_LABEL_LEN,
};
use guardian_watcher::{WatchPhase, WatchState};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}

/// Network status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStatusResponse {
    pub connected: bool,
    pub network: String,
    pub chain_id: u64,
    /// True when the configured chain is the one the stock contract
    /// addresses are deployed to
    pub supported: bool,
    pub rpc_url: String,
    /// Address of the loaded signer. None when running read-only.
    pub signer: Option<String>,
    pub contracts: ContractAddresses,
}

/// Network configuration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfigRequest {
    pub rpc_url: String,
    pub chain_id: u64,
    /// Optional new base URL for the cross-chain status endpoint
    #[serde(default)]
    pub cctx_url: Option<String>,
}

// =============================================================================
// Wallet Connection DTOs
// =============================================================================

/// Request to register a wallet address for this session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConnectRequest {
    /// The wallet's EVM address, 0x-prefixed hex
    pub address: String,
}

/// Response indicating whether a wallet is currently connected to the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletStatusResponse {
    /// True if a wallet is connected to this session.
    pub connected: bool,
    /// The connected wallet's address. Only populated when `connected` is true.
    pub address: Option<String>,
}

// =============================================================================
// Analysis Request DTOs
// =============================================================================

/// Request to submit a paid analysis to one of the guardian contracts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Which analysis contract to call
    pub kind: AnalysisKind,
    /// Contract address, token address, or project name, per kind
    pub target: String,
    /// Display label for the tracked transfer. Defaults to the target.
    #[serde(default)]
    pub label: Option<String>,
    /// Start the confirmation watch for the submitted transaction.
    /// Defaults to true.
    #[serde(default)]
    pub watch: Option<bool>,
}

/// Response for a submitted analysis request
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub kind: AnalysisKind,
    pub target: String,
    /// Source-chain transaction hash
    pub tx_hash: TxHash,
    /// Explorer link for the source-chain transaction
    pub explorer_url: String,
    /// Payment sent with the request, in wei
    pub payment_wei: String,
    /// Whether the confirmation watch was started for this transaction
    pub watching: bool,
}

/// Query parameters for listing past analysis requests
#[derive(Debug, Clone, Deserialize)]
pub struct RequestsQuery {
    pub kind: AnalysisKind,
    /// Defaults to the session wallet when omitted
    #[serde(default)]
    pub address: Option<String>,
}

/// Past analysis requests recorded on-chain for one user
#[derive(Debug, Clone, Serialize)]
pub struct RequestsResponse {
    pub kind: AnalysisKind,
    pub address: String,
    pub requests: Vec<AnalysisRequest>,
    pub count: usize,
}

// =============================================================================
// Transfer Tracking DTOs
// =============================================================================

/// Request to watch a source-chain transaction for settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchRequest {
    /// Source-chain transaction hash
    pub hash: TxHash,
    /// Display label for the transfer
    #[serde(default)]
    pub label: Option<String>,
}

/// Request to clear the tracked transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequest {
    /// Clear even while the transfer is still being polled
    #[serde(default)]
    pub force: bool,
}

/// Snapshot of the tracked transfer, shaped for display.
///
/// Explorer links are only populated alongside the hash they point to, so
/// clients never render a link to a transaction that is not known yet.
#[derive(Debug, Clone, Serialize)]
pub struct TransferResponse {
    pub status: WatchPhase,
    /// Display label, truncated for rendering
    pub label: Option<String>,
    pub source_tx_hash: Option<TxHash>,
    pub source_link: Option<String>,
    pub destination_tx_hash: Option<TxHash>,
    pub destination_link: Option<String>,
    /// Poll cycles issued for the current target
    pub attempts: u32,
    /// True once the transfer reached a terminal state and a new one can
    /// be submitted
    pub can_send_another: bool,
}

impl TransferResponse {
    pub fn build(
        state: &WatchState,
        label: Option<&str>,
        source_explorer: &str,
        destination_explorer: &str,
    ) -> Self {
        Self {
            status: state.phase,
            label: label.map(|l| truncate_label(l, MAX_LABEL_LEN).into_owned()),
            source_link: state
                .target
                .as_ref()
                .map(|h| tx_url(source_explorer, h)),
            source_tx_hash: state.target.clone(),
            destination_link: state
                .destination
                .as_ref()
                .map(|h| tx_url(destination_explorer, h)),
            destination_tx_hash: state.destination.clone(),
            attempts: state.attempts,
            can_send_another: state.is_terminal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polling_state() -> WatchState {
        WatchState {
            phase: WatchPhase::Polling,
            target: Some(TxHash::new("0xaaa")),
            destination: None,
            attempts: 3,
        }
    }

    #[test]
    fn test_links_gated_on_hash_presence() {
        let response = TransferResponse::build(
            &polling_state(),
            Some("My Transfer"),
            "https://sepolia.basescan.org",
            "https://basechain-athens-3.blockscout.com",
        );

        assert_eq!(
            response.source_link.as_deref(),
            Some("https://sepolia.basescan.org/tx/0xaaa")
        );
        // No destination hash yet, so no destination link either
        assert_eq!(response.destination_tx_hash, None);
        assert_eq!(response.destination_link, None);
        assert!(!response.can_send_another);
    }

    #[test]
    fn test_confirmed_transfer_links_both_chains() {
        let state = WatchState {
            phase: WatchPhase::Confirmed,
            target: Some(TxHash::new("0xaaa")),
            destination: Some(TxHash::new("0xbbb")),
            attempts: 5,
        };
        let response = TransferResponse::build(&state, None, "https://s", "https://d");

        assert_eq!(response.source_link.as_deref(), Some("https://s/tx/0xaaa"));
        assert_eq!(
            response.destination_link.as_deref(),
            Some("https://d/tx/0xbbb")
        );
        assert!(response.can_send_another);
    }

    #[test]
    fn test_label_truncated_for_display() {
        let response = TransferResponse::build(
            &polling_state(),
            Some("a very long transfer label indeed"),
            "https://s",
            "https://d",
        );
        assert_eq!(response.label.as_deref(), Some("a very long transfer..."));

        let short = TransferResponse::build(&polling_state(), Some("short"), "s", "d");
        assert_eq!(short.label.as_deref(), Some("short"));
    }

    #[test]
    fn test_timed_out_allows_resubmission() {
        let state = WatchState {
            phase: WatchPhase::TimedOut,
            target: Some(TxHash::new("0xaaa")),
            destination: None,
            attempts: 160,
        };
        let response = TransferResponse::build(&state, None, "s", "d");
        assert_eq!(response.destination_link, None);
        assert!(response.can_send_another);
    }

    #[test]
    fn test_transfer_wire_shape() {
        let response = TransferResponse::build(
            &polling_state(),
            Some("swap"),
            "https://s",
            "https://d",
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "polling");
        assert_eq!(value["label"], "swap");
        assert_eq!(value["source_tx_hash"], "0xaaa");
        assert!(value["destination_tx_hash"].is_null());
        assert_eq!(value["attempts"], 3);
        assert_eq!(value["can_send_another"], false);
    }
}

//! Error types for Guardian

use thiserror::Error;

/// Core errors that can occur in Guardian
#[derive(Debug, Error)]
pub enum Error {
    #[error("Status endpoint error: {0}")]
    Cctx(#[from] CctxError),

    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Cross-chain status endpoint errors
#[derive(Debug, Error)]
pub enum CctxError {
    #[error("Endpoint unreachable: {0}")]
    Transport(String),

    #[error("Endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// On-chain request and deployment errors
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Invalid RPC endpoint {url}: {reason}")]
    Endpoint { url: String, reason: String },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Connected to chain {actual}, expected {expected}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("No signer key configured")]
    SignerMissing,

    #[error("Invalid signer key: {0}")]
    SignerInvalid(String),

    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Invalid ABI: {0}")]
    Abi(String),

    #[error("Contract call failed: {message}")]
    CallFailed { message: String },

    #[error("Transaction reverted: {tx_hash}")]
    TxReverted { tx_hash: String },

    #[error("Transaction dropped from the mempool: {tx_hash}")]
    TxDropped { tx_hash: String },

    #[error("Artifact error for {name}: {reason}")]
    Artifact { name: String, reason: String },

    #[error("Failed to write deployment summary: {reason}")]
    SummaryWrite { reason: String },
}

/// Result type alias for Guardian operations
pub type Result<T> = std::result::Result<T, Error>;

impl CctxError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "cctx_unreachable",
            Self::Status { .. } => "cctx_status",
            Self::Parse(_) => "cctx_parse",
        }
    }
}

impl ContractError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Endpoint { .. } => "bad_endpoint",
            Self::Rpc(_) => "rpc_error",
            Self::ChainMismatch { .. } => "chain_mismatch",
            Self::SignerMissing => "signer_missing",
            Self::SignerInvalid(_) => "signer_invalid",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::Abi(_) => "invalid_abi",
            Self::CallFailed { .. } => "call_failed",
            Self::TxReverted { .. } => "tx_reverted",
            Self::TxDropped { .. } => "tx_dropped",
            Self::Artifact { .. } => "artifact_error",
            Self::SummaryWrite { .. } => "summary_write_failed",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAddress { .. } | Self::Abi(_) => 400,
            Self::SignerMissing | Self::SignerInvalid(_) => 422,
            Self::ChainMismatch { .. } => 422,
            Self::CallFailed { .. } | Self::TxReverted { .. } | Self::TxDropped { .. } => 502,
            Self::Endpoint { .. } | Self::Rpc(_) => 503,
            Self::Artifact { .. } | Self::SummaryWrite { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_error_codes() {
        let err = ContractError::ChainMismatch {
            expected: 84532,
            actual: 1,
        };
        assert_eq!(err.error_code(), "chain_mismatch");
        assert_eq!(err.status_code(), 422);

        let err = ContractError::SignerMissing;
        assert_eq!(err.error_code(), "signer_missing");
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_cctx_error_display() {
        let err = CctxError::Status { status: 500 };
        assert_eq!(err.to_string(), "Endpoint returned HTTP 500");
        assert_eq!(err.error_code(), "cctx_status");
    }
}

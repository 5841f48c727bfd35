//! Application state shared across API handlers

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::RwLock;

use cctx_client::{CctxClient, CctxLookupSource};
use guardian_contracts::GuardianContracts;
use guardian_core::{AppConfig, CctxError, ContractError, TxHash};
use guardian_watcher::{ConfirmationWatcher, WatchPhase, WatchPolicy, WatchState};

/// Transfers unresolved after this long are timed out (seconds).
const WATCH_DEADLINE_SECS: u64 = 40 * 60; // 40 minutes

/// Errors that can occur in the API layer
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid wallet address format
    #[error("Invalid wallet address: {reason}")]
    InvalidAddress { reason: String },

    /// Status endpoint client could not be built
    #[error("Status endpoint error: {0}")]
    Cctx(#[from] CctxError),

    /// Reset requested while a transfer is still being polled
    #[error("Transfer still in flight; pass force=true to reset anyway")]
    TransferInFlight,
}

/// State representing a connected wallet.
///
/// The address is stored as a 0x-prefixed, 20-byte hex EVM address.
/// Checksum casing is preserved but not enforced.
#[derive(Clone, Debug)]
pub struct WalletSession {
    /// The wallet's EVM address, 0x-prefixed hex
    pub address: String,
    /// When the wallet was connected
    pub connected_at: Instant,
}

impl WalletSession {
    pub fn new(address: String) -> Self {
        Self {
            address,
            connected_at: Instant::now(),
        }
    }
}

/// Validate that an address looks like an EVM account address.
///
/// This performs basic format validation only: 0x prefix, 40 hex digits.
/// EIP-55 checksum casing is not verified.
fn validate_evm_address(address: &str) -> Result<(), ApiError> {
    let len = address.len();

    if len != 42 {
        return Err(ApiError::InvalidAddress {
            reason: format!("Wrong length ({} chars, expected 42)", len),
        });
    }

    let Some(hex_part) = address.strip_prefix("0x") else {
        return Err(ApiError::InvalidAddress {
            reason: "Address must start with 0x".to_string(),
        });
    };

    for c in hex_part.chars() {
        if !c.is_ascii_hexdigit() {
            return Err(ApiError::InvalidAddress {
                reason: format!("Invalid hex character '{}' in address", c),
            });
        }
    }

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RwLock<AppConfig>,
    contracts: RwLock<Option<Arc<GuardianContracts>>>,
    wallet: RwLock<Option<WalletSession>>,
    watcher: RwLock<Arc<ConfirmationWatcher>>,
    transfer_label: RwLock<Option<String>>,
    watch_policy: WatchPolicy,
}

impl AppState {
    /// Create a new application state with default config
    pub fn new() -> Result<Self, ApiError> {
        Self::with_config(AppConfig::default())
    }

    /// Create with a specific config
    pub fn with_config(config: AppConfig) -> Result<Self, ApiError> {
        let watch_policy =
            WatchPolicy::default().with_deadline(Duration::from_secs(WATCH_DEADLINE_SECS));
        let watcher = Self::make_watcher(&config.cctx.base_url, &watch_policy)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config: RwLock::new(config),
                contracts: RwLock::new(None),
                wallet: RwLock::new(None),
                watcher: RwLock::new(watcher),
                transfer_label: RwLock::new(None),
                watch_policy,
            }),
        })
    }

    fn make_watcher(
        base_url: &str,
        policy: &WatchPolicy,
    ) -> Result<Arc<ConfirmationWatcher>, ApiError> {
        let source: Arc<dyn CctxLookupSource> = Arc::new(CctxClient::new(base_url)?);
        Ok(Arc::new(ConfirmationWatcher::new(source, policy.clone())))
    }

    /// Get current config
    pub async fn config(&self) -> AppConfig {
        self.inner.config.read().await.clone()
    }

    /// Update the RPC endpoint and chain id
    pub async fn set_network_config(&self, rpc_url: String, chain_id: u64) {
        {
            let mut config = self.inner.config.write().await;
            config.network.rpc_url = rpc_url;
            config.network.chain_id = chain_id;
        }

        // Clear cached contracts client
        *self.inner.contracts.write().await = None;
    }

    /// Point the watcher at a different status endpoint.
    ///
    /// The previous watcher is dropped, which cancels any active poll loop.
    pub async fn set_cctx_url(&self, base_url: String) -> Result<(), ApiError> {
        let watcher = Self::make_watcher(&base_url, &self.inner.watch_policy)?;

        {
            let mut config = self.inner.config.write().await;
            config.cctx.base_url = base_url;
        }

        *self.inner.watcher.write().await = watcher;
        *self.inner.transfer_label.write().await = None;
        Ok(())
    }

    /// Get or create the contracts client
    pub async fn contracts(&self) -> Result<Arc<GuardianContracts>, ContractError> {
        // Check if we have a cached client
        {
            let cached = self.inner.contracts.read().await;
            if let Some(ref client) = *cached {
                return Ok(client.clone());
            }
        }

        let config = self.config().await;

        let mut slot = self.inner.contracts.write().await;
        // Double-check after acquiring write lock
        if let Some(ref client) = *slot {
            return Ok(client.clone());
        }

        tracing::info!(rpc = %config.network.rpc_url, "Connecting contracts client");
        match GuardianContracts::connect(
            config.network,
            config.contracts,
            config.signer_key.as_deref(),
        )
        .await
        {
            Ok(client) => {
                let client = Arc::new(client);
                *slot = Some(client.clone());
                Ok(client)
            }
            Err(e) => {
                tracing::warn!("Failed to connect contracts client: {}", e);
                Err(e)
            }
        }
    }

    /// Get current wallet state
    pub async fn wallet(&self) -> Option<WalletSession> {
        self.inner.wallet.read().await.clone()
    }

    /// Set connected wallet with address validation.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidAddress` if the address format is invalid.
    pub async fn connect_wallet(&self, address: String) -> Result<WalletSession, ApiError> {
        validate_evm_address(&address)?;
        let session = WalletSession::new(address);
        *self.inner.wallet.write().await = Some(session.clone());
        Ok(session)
    }

    /// Disconnect wallet (clear wallet state)
    pub async fn disconnect_wallet(&self) {
        *self.inner.wallet.write().await = None;
    }

    /// Current confirmation watcher handle
    pub async fn watcher(&self) -> Arc<ConfirmationWatcher> {
        self.inner.watcher.read().await.clone()
    }

    /// Snapshot of the tracked transfer
    pub async fn transfer_state(&self) -> WatchState {
        self.watcher().await.state()
    }

    /// Label shown for the tracked transfer
    pub async fn transfer_label(&self) -> Option<String> {
        self.inner.transfer_label.read().await.clone()
    }

    /// Begin (or re-point) the confirmation watch.
    ///
    /// The label is only replaced when a fresh polling lifecycle actually
    /// starts; re-watching the current hash keeps the existing label.
    pub async fn watch_transfer(&self, hash: TxHash, label: Option<String>) -> WatchState {
        let watcher = self.watcher().await;
        if watcher.start(hash) {
            *self.inner.transfer_label.write().await = label;
        }
        watcher.state()
    }

    /// Stop watching and clear the tracked transfer.
    ///
    /// A transfer still being polled is only cleared when `force` is set;
    /// confirmed and timed-out transfers reset freely.
    pub async fn reset_transfer(&self, force: bool) -> Result<WatchState, ApiError> {
        let watcher = self.watcher().await;
        if !force && watcher.state().phase == WatchPhase::Polling {
            return Err(ApiError::TransferInFlight);
        }
        watcher.reset();
        *self.inner.transfer_label.write().await = None;
        Ok(watcher.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_evm_address() {
        assert!(validate_evm_address("0x1edBBfc2a68428A556212dF0c54263b6a251B74d").is_ok());
        assert!(validate_evm_address("0x072fa2ce02ecefdc123baf57a369581247b5e88c").is_ok());

        // Wrong length
        assert!(validate_evm_address("0x1edBBf").is_err());
        // Missing prefix
        assert!(validate_evm_address("001edBBfc2a68428A556212dF0c54263b6a251B74d").is_err());
        // Non-hex character
        assert!(validate_evm_address("0x1edBBfc2a68428A556212dF0c54263b6a251B7zz").is_err());
        assert!(validate_evm_address("").is_err());
    }
}

//! `guardian watch` - follow a cross-chain transfer from the terminal

use std::sync::Arc;

use anyhow::Result;

use cctx_client::{CctxClient, CctxLookupSource};
use guardian_core::{truncate_label, tx_url, AppConfig, TxHash, MAX_LABEL_LEN};
use guardian_watcher::{ConfirmationWatcher, WatchPhase, WatchPolicy};

pub async fn run(config: AppConfig, hash: TxHash, label: Option<String>) -> Result<()> {
    if hash.is_empty() {
        anyhow::bail!("transaction hash must not be empty");
    }
    if !hash.is_wellformed() {
        tracing::warn!(%hash, "hash does not look like an EVM transaction hash; the status endpoint may never resolve it");
    }

    let display = label.unwrap_or_else(|| hash.to_string());
    let display = truncate_label(&display, MAX_LABEL_LEN);

    let source: Arc<dyn CctxLookupSource> = Arc::new(CctxClient::new(&config.cctx.base_url)?);
    let watcher = ConfirmationWatcher::new(source, WatchPolicy::default());
    let mut updates = watcher.subscribe();

    println!(
        "Watching {display} on {} (checking every 15s, ctrl-c to stop)",
        config.network.name
    );
    println!("  source: {}", tx_url(&config.network.explorer_url, &hash));

    watcher.start(hash);

    loop {
        let state = updates.borrow_and_update().clone();
        match state.phase {
            WatchPhase::Polling if state.attempts > 0 => {
                println!("  not settled yet (attempt {})", state.attempts);
            }
            WatchPhase::Confirmed => {
                println!("Transfer settled after {} attempts", state.attempts);
                if let Some(destination) = state.destination {
                    println!(
                        "  destination: {}",
                        tx_url(&config.cctx.explorer_url, &destination)
                    );
                }
                return Ok(());
            }
            WatchPhase::TimedOut => {
                anyhow::bail!("gave up after {} attempts", state.attempts);
            }
            _ => {}
        }
        updates.changed().await?;
    }
}

//! `guardian request` / `guardian requests` - submit and list paid analyses

use anyhow::{anyhow, Context, Result};

use guardian_contracts::GuardianContracts;
use guardian_core::{constants, tx_url, AnalysisKind, AppConfig};

use crate::commands::watch;

pub async fn run(
    config: AppConfig,
    kind: AnalysisKind,
    target: String,
    no_watch: bool,
) -> Result<()> {
    let target = target.trim().to_string();
    if target.is_empty() {
        anyhow::bail!("analysis target must not be empty");
    }

    let client = GuardianContracts::connect(
        config.network.clone(),
        config.contracts.clone(),
        config.signer_key.as_deref(),
    )
    .await
    .context("connecting to the RPC endpoint")?;

    println!(
        "Submitting {kind} request for {target} ({} ETH fee)",
        constants::ANALYSIS_FEE_ETH
    );
    let receipt = client
        .request_analysis(kind, &target)
        .await
        .context("submitting the analysis request")?;

    println!(
        "Submitted: {}",
        tx_url(&config.network.explorer_url, &receipt.tx_hash)
    );
    if let Some(block) = receipt.block_number {
        println!("  mined in block {block}");
    }

    if no_watch {
        return Ok(());
    }
    watch::run(config, receipt.tx_hash, Some(target)).await
}

pub async fn list(config: AppConfig, kind: AnalysisKind, address: Option<String>) -> Result<()> {
    let client = GuardianContracts::connect(
        config.network,
        config.contracts,
        config.signer_key.as_deref(),
    )
    .await
    .context("connecting to the RPC endpoint")?;

    let address = address
        .or_else(|| client.signer_address())
        .ok_or_else(|| anyhow!("no address given and no signer configured; pass --address"))?;

    let requests = client
        .user_requests(kind, &address)
        .await
        .context("querying past requests")?;

    if requests.is_empty() {
        println!("No {kind} requests recorded for {address}");
        return Ok(());
    }

    println!("{} {kind} request(s) for {address}:", requests.len());
    for request in requests {
        let status = if request.completed { "done   " } else { "pending" };
        println!(
            "  [{status}] {} risk={} at={}",
            request.target, request.risk_score, request.timestamp
        );
        if !request.analysis.is_empty() {
            println!("            {}", request.analysis);
        }
    }
    Ok(())
}

//! `guardian deploy` - deploy the analysis contracts

use std::path::Path;

use anyhow::{Context, Result};

use guardian_contracts::{write_summary, GuardianContracts};
use guardian_core::{AnalysisKind, AppConfig};

pub async fn run(config: AppConfig, artifacts: &Path, out: &Path) -> Result<()> {
    if config.signer_key.is_none() {
        anyhow::bail!("deployment needs GUARDIAN_SIGNER_KEY set to a funded account");
    }

    let client = GuardianContracts::connect(
        config.network.clone(),
        config.contracts,
        config.signer_key.as_deref(),
    )
    .await
    .context("connecting to the RPC endpoint")?;

    println!(
        "Deploying guardian contracts to {} (chain id {})",
        config.network.name, config.network.chain_id
    );

    let summary = client
        .deploy_all(artifacts)
        .await
        .context("deploying contracts")?;
    write_summary(&summary, out).context("writing deployment summary")?;

    let book = summary.address_book();
    println!("Deployed:");
    for kind in AnalysisKind::ALL {
        println!("  {:<22} {}", kind.contract_name(), book.for_kind(kind));
    }
    println!("Summary written to {}", out.display());

    println!("To verify on the explorer:");
    for kind in AnalysisKind::ALL {
        println!(
            "  npx hardhat verify --network baseSepolia {}",
            book.for_kind(kind)
        );
    }

    Ok(())
}

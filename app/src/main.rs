//! Base Guardian command line interface

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use guardian_core::{AnalysisKind, AppConfig, TxHash};

mod commands;

#[derive(Parser)]
#[command(name = "guardian")]
#[command(about = "Paid contract analysis and cross-chain confirmation tracking on Base", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the guardian API server
    Serve {
        /// Port to listen on; defaults to the configured API port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Poll a source-chain transaction until it settles on the destination chain
    Watch {
        /// Source-chain transaction hash
        hash: String,

        /// Display label for the transfer
        #[arg(long)]
        label: Option<String>,
    },

    /// Submit a paid analysis request on-chain
    Request {
        /// Analysis kind: contract, tokenomics, social, or monitoring
        kind: String,

        /// Contract address, token address, or project name, per kind
        target: String,

        /// Return right after submission instead of waiting for settlement
        #[arg(long)]
        no_watch: bool,
    },

    /// List past analysis requests recorded on-chain for one address
    Requests {
        /// Analysis kind: contract, tokenomics, social, or monitoring
        kind: String,

        /// User address; defaults to the configured signer
        #[arg(long)]
        address: Option<String>,
    },

    /// Deploy the four analysis contracts and write the address summary
    Deploy {
        /// Directory holding compiled contract artifacts (JSON with abi and bytecode)
        #[arg(long)]
        artifacts: PathBuf,

        /// Where to write the deployment summary
        #[arg(long, default_value = "base-contract-addresses.json")]
        out: PathBuf,
    },
}

fn parse_kind(input: &str) -> Result<AnalysisKind> {
    AnalysisKind::parse(input).ok_or_else(|| {
        anyhow!("unknown analysis kind '{input}' (expected contract, tokenomics, social, or monitoring)")
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("guardian=debug".parse().unwrap())
                .add_directive("guardian_watcher=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(config, port).await,
        Commands::Watch { hash, label } => {
            commands::watch::run(config, TxHash::new(hash), label).await
        }
        Commands::Request {
            kind,
            target,
            no_watch,
        } => commands::request::run(config, parse_kind(&kind)?, target, no_watch).await,
        Commands::Requests { kind, address } => {
            commands::request::list(config, parse_kind(&kind)?, address).await
        }
        Commands::Deploy { artifacts, out } => {
            commands::deploy::run(config, &artifacts, &out).await
        }
    }
}

//! One-shot deployment of the Guardian analysis contracts
//!
//! Reads compiled artifacts (hardhat JSON shape), deploys the four
//! contracts in a fixed order, and produces the address summary JSON the
//! rest of the stack consumes.

use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use ethers::abi::Abi;
use ethers::contract::ContractFactory;
use ethers::types::Bytes;
use serde::{Deserialize, Serialize};

use guardian_core::{AnalysisKind, ContractAddresses, ContractError, Network};

use crate::service::{format_address, GuardianContracts};

/// File the deployment summary is written to
pub const SUMMARY_FILE: &str = "base-contract-addresses.json";

/// Deployment order, matching the historical deployment runs
const DEPLOY_ORDER: [AnalysisKind; 4] = [
    AnalysisKind::ContractAnalysis,
    AnalysisKind::Monitoring,
    AnalysisKind::SocialAnalysis,
    AnalysisKind::Tokenomics,
];

/// Compiled contract artifact, as emitted by the Solidity toolchain
#[derive(Debug, Deserialize)]
struct ContractArtifact {
    abi: Abi,
    bytecode: ArtifactBytecode,
}

/// Bytecode appears either as a bare hex string or wrapped in an object,
/// depending on the compiler output format.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    Plain(String),
    Wrapped { object: String },
}

impl ArtifactBytecode {
    fn decode(&self, name: &str) -> Result<Bytes, ContractError> {
        let raw = match self {
            Self::Plain(hex_str) => hex_str,
            Self::Wrapped { object } => object,
        };
        let bytes = hex::decode(raw.trim().trim_start_matches("0x")).map_err(|e| {
            ContractError::Artifact {
                name: name.to_string(),
                reason: format!("invalid bytecode hex: {e}"),
            }
        })?;
        if bytes.is_empty() {
            return Err(ContractError::Artifact {
                name: name.to_string(),
                reason: "empty bytecode".to_string(),
            });
        }
        Ok(Bytes::from(bytes))
    }
}

/// Network block of the deployment summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub name: String,
    #[serde(rename = "rpcUrl")]
    pub rpc_url: String,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub currency: String,
    pub explorer: String,
}

impl From<&Network> for NetworkSummary {
    fn from(network: &Network) -> Self {
        Self {
            name: network.name.clone(),
            rpc_url: network.rpc_url.clone(),
            chain_id: network.chain_id,
            currency: network.currency.clone(),
            explorer: network.explorer_url.clone(),
        }
    }
}

/// Deployment summary, serialized to [`SUMMARY_FILE`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSummary {
    #[serde(rename = "BaseContractAnalysis")]
    pub contract_analysis: String,
    #[serde(rename = "BaseMonitoring")]
    pub monitoring: String,
    #[serde(rename = "BaseSocialAnalysis")]
    pub social_analysis: String,
    #[serde(rename = "BaseTokenomics")]
    pub tokenomics: String,
    #[serde(rename = "Network")]
    pub network: NetworkSummary,
    #[serde(rename = "deployedAt")]
    pub deployed_at: String,
}

impl DeploymentSummary {
    /// Addresses in lookup form, for reconfiguring a running instance.
    pub fn address_book(&self) -> ContractAddresses {
        ContractAddresses {
            contract_analysis: self.contract_analysis.clone(),
            tokenomics: self.tokenomics.clone(),
            social_analysis: self.social_analysis.clone(),
            monitoring: self.monitoring.clone(),
        }
    }
}

impl GuardianContracts {
    /// Deploy all four analysis contracts from `artifacts_dir`.
    ///
    /// Artifacts are expected as `<dir>/<ContractName>.json`. The summary is
    /// only produced after every deployment succeeded; a failure part-way
    /// leaves no summary behind.
    pub async fn deploy_all(
        &self,
        artifacts_dir: &Path,
    ) -> Result<DeploymentSummary, ContractError> {
        let signer = self.signer_client()?;

        let mut book = ContractAddresses::empty();
        for kind in DEPLOY_ORDER {
            let name = kind.contract_name();
            tracing::info!(contract = name, "deploying");

            let artifact = load_artifact(artifacts_dir, name)?;
            let bytecode = artifact.bytecode.decode(name)?;

            let factory = ContractFactory::new(artifact.abi, bytecode, signer.clone());
            let deployer = factory.deploy(()).map_err(|e| ContractError::CallFailed {
                message: format!("{name}: {e}"),
            })?;
            let contract = deployer
                .send()
                .await
                .map_err(|e| ContractError::CallFailed {
                    message: format!("{name}: {e}"),
                })?;

            let address = format_address(contract.address());
            tracing::info!(contract = name, %address, "deployed");
            book.set(kind, address);
        }

        Ok(DeploymentSummary {
            contract_analysis: book.contract_analysis,
            monitoring: book.monitoring,
            social_analysis: book.social_analysis,
            tokenomics: book.tokenomics,
            network: NetworkSummary::from(self.network()),
            deployed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

fn load_artifact(dir: &Path, name: &str) -> Result<ContractArtifact, ContractError> {
    let path = dir.join(format!("{name}.json"));
    let raw = fs::read_to_string(&path).map_err(|e| ContractError::Artifact {
        name: name.to_string(),
        reason: format!("{}: {e}", path.display()),
    })?;
    serde_json::from_str(&raw).map_err(|e| ContractError::Artifact {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Write the summary JSON next to wherever the caller runs from.
pub fn write_summary(summary: &DeploymentSummary, path: &Path) -> Result<(), ContractError> {
    let json = serde_json::to_string_pretty(summary).map_err(|e| ContractError::SummaryWrite {
        reason: e.to_string(),
    })?;
    fs::write(path, json).map_err(|e| ContractError::SummaryWrite {
        reason: format!("{}: {e}", path.display()),
    })
}

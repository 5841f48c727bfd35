//! Configuration types for Guardian

use serde::{Deserialize, Serialize};

use crate::AnalysisKind;

/// EVM network parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Human-readable network name
    pub name: String,

    /// Chain id the RPC endpoint must report
    pub chain_id: u64,

    /// JSON-RPC endpoint URL
    pub rpc_url: String,

    /// Native currency symbol
    pub currency: String,

    /// Block explorer base URL, without a trailing slash
    pub explorer_url: String,
}

impl Network {
    /// Chain id of Base Sepolia, the network the stock contracts live on
    pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

    /// Base Sepolia, the network the analysis contracts are deployed to.
    pub fn base_sepolia() -> Self {
        Self {
            name: "Base Sepolia".to_string(),
            chain_id: Self::BASE_SEPOLIA_CHAIN_ID,
            rpc_url: "https://sepolia.base.org".to_string(),
            currency: "ETH".to_string(),
            explorer_url: "https://sepolia.basescan.org".to_string(),
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::base_sepolia()
    }
}

/// Deployed addresses of the four analysis contracts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    pub contract_analysis: String,
    pub tokenomics: String,
    pub social_analysis: String,
    pub monitoring: String,
}

impl ContractAddresses {
    pub fn for_kind(&self, kind: AnalysisKind) -> &str {
        match kind {
            AnalysisKind::ContractAnalysis => &self.contract_analysis,
            AnalysisKind::Tokenomics => &self.tokenomics,
            AnalysisKind::SocialAnalysis => &self.social_analysis,
            AnalysisKind::Monitoring => &self.monitoring,
        }
    }

    pub fn set(&mut self, kind: AnalysisKind, address: impl Into<String>) {
        let slot = match kind {
            AnalysisKind::ContractAnalysis => &mut self.contract_analysis,
            AnalysisKind::Tokenomics => &mut self.tokenomics,
            AnalysisKind::SocialAnalysis => &mut self.social_analysis,
            AnalysisKind::Monitoring => &mut self.monitoring,
        };
        *slot = address.into();
    }

    /// Empty address book, filled in by a deployment run.
    pub fn empty() -> Self {
        Self {
            contract_analysis: String::new(),
            tokenomics: String::new(),
            social_analysis: String::new(),
            monitoring: String::new(),
        }
    }
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            contract_analysis: "0x1edBBfc2a68428A556212dF0c54263b6a251B74d".to_string(),
            tokenomics: "0xEb470F2fc016C1770415a8d970F7cF09837c18Bc".to_string(),
            social_analysis: "0x072fa2ce02EcEFDC123bAf57A369581247B5E88c".to_string(),
            monitoring: "0xd5918c006Dc5ff19d30E988D11FAaC31f8b6ee2B".to_string(),
        }
    }
}

/// Cross-chain status endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CctxConfig {
    /// Status endpoint base; the inbound hash is appended as the final
    /// path segment
    pub base_url: String,

    /// Explorer base URL for destination-chain transactions, without a
    /// trailing slash
    #[serde(default = "default_cctx_explorer")]
    pub explorer_url: String,
}

fn default_cctx_explorer() -> String {
    "https://basechain-athens-3.blockscout.com".to_string()
}

impl Default for CctxConfig {
    fn default() -> Self {
        Self {
            base_url:
                "https://basechain-athens.blockpi.network/lcd/v1/public/Base-chain/crosschain/inboundHashToCctxData"
                    .to_string(),
            explorer_url: default_cctx_explorer(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network the contracts live on
    #[serde(default)]
    pub network: Network,

    /// Deployed contract addresses
    #[serde(default)]
    pub contracts: ContractAddresses,

    /// Cross-chain status endpoint settings
    #[serde(default)]
    pub cctx: CctxConfig,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Private key for payment-bearing calls; never serialized
    #[serde(skip)]
    pub signer_key: Option<String>,
}

fn default_api_port() -> u16 {
    18532
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            contracts: ContractAddresses::default(),
            cctx: CctxConfig::default(),
            api_port: default_api_port(),
            signer_key: None,
        }
    }
}

impl AppConfig {
    /// Defaults with environment overrides applied.
    ///
    /// Recognized variables: `GUARDIAN_RPC_URL`, `GUARDIAN_CHAIN_ID`,
    /// `GUARDIAN_CCTX_URL`, `GUARDIAN_API_PORT`, `GUARDIAN_SIGNER_KEY`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("GUARDIAN_RPC_URL") {
            if !url.is_empty() {
                config.network.rpc_url = url;
            }
        }
        if let Ok(raw) = std::env::var("GUARDIAN_CHAIN_ID") {
            if let Ok(id) = raw.parse() {
                config.network.chain_id = id;
            }
        }
        if let Ok(url) = std::env::var("GUARDIAN_CCTX_URL") {
            if !url.is_empty() {
                config.cctx.base_url = url;
            }
        }
        if let Ok(raw) = std::env::var("GUARDIAN_API_PORT") {
            if let Ok(port) = raw.parse() {
                config.api_port = port;
            }
        }
        if let Ok(key) = std::env::var("GUARDIAN_SIGNER_KEY") {
            if !key.is_empty() {
                config.signer_key = Some(key);
            }
        }
        config
    }
}

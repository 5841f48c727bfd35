//! Core type definitions for Guardian

use serde::{Deserialize, Serialize};
use std::fmt;

/// EVM transaction hash (32 bytes, 0x-prefixed hex)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check for the canonical 0x-prefixed 32-byte hex form.
    ///
    /// Hashes that fail this check are still accepted everywhere; the status
    /// endpoint simply never resolves them.
    pub fn is_wellformed(&self) -> bool {
        self.0.len() == 66 && self.0.starts_with("0x") && hex::decode(&self.0[2..]).is_ok()
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four paid analysis products offered by the on-chain contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    ContractAnalysis,
    Tokenomics,
    SocialAnalysis,
    Monitoring,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 4] = [
        Self::ContractAnalysis,
        Self::Tokenomics,
        Self::SocialAnalysis,
        Self::Monitoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContractAnalysis => "contract_analysis",
            Self::Tokenomics => "tokenomics",
            Self::SocialAnalysis => "social_analysis",
            Self::Monitoring => "monitoring",
        }
    }

    /// Solidity method that submits a paid request of this kind.
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::ContractAnalysis => "requestContractAnalysis",
            Self::Tokenomics => "requestTokenomicsAnalysis",
            Self::SocialAnalysis => "requestSocialAnalysis",
            Self::Monitoring => "requestMonitoring",
        }
    }

    /// Contract name as it appears in compiled artifacts and the
    /// deployment summary.
    pub fn contract_name(&self) -> &'static str {
        match self {
            Self::ContractAnalysis => "BaseContractAnalysis",
            Self::Tokenomics => "BaseTokenomics",
            Self::SocialAnalysis => "BaseSocialAnalysis",
            Self::Monitoring => "BaseMonitoring",
        }
    }

    /// Parse a user-facing name, accepting common short forms.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "contract" | "contract_analysis" | "contract-analysis" => Some(Self::ContractAnalysis),
            "tokenomics" => Some(Self::Tokenomics),
            "social" | "social_analysis" | "social-analysis" => Some(Self::SocialAnalysis),
            "monitoring" | "monitor" => Some(Self::Monitoring),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wei amount
pub type Wei = u128;

/// Constants
pub mod constants {
    use super::Wei;

    /// 1 ETH in wei
    pub const WEI_PER_ETH: Wei = 1_000_000_000_000_000_000;

    /// Fixed payment attached to every analysis request (0.0001 ETH)
    pub const ANALYSIS_FEE_WEI: Wei = 100_000_000_000_000;

    /// Display form of the analysis fee
    pub const ANALYSIS_FEE_ETH: &str = "0.0001";
}

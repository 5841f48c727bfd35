//! Guardian-contracts: on-chain access to the analysis contracts
//!
//! Covers the paid request calls, the `getUserRequests` read path, and
//! one-shot deployment of the four contracts from compiled artifacts.

pub mod abi;
pub mod deploy;
pub mod service;

pub use abi::{analysis_fee_wei, guardian_abi};
pub use deploy::{write_summary, DeploymentSummary, NetworkSummary, SUMMARY_FILE};
pub use service::{AnalysisReceipt, AnalysisRequest, GuardianContracts};

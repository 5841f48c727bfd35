//! Shared ABI of the four analysis contracts
//!
//! The contracts expose one interface: a payable request method, a
//! `getUserRequests` view, and completion/alert events. The tuple field
//! names vary per contract; reads use the generic shape below.

use ethers::abi::Abi;
use ethers::types::U256;

use guardian_core::{constants, ContractError};

/// JSON ABI covering the request methods, the read path, and the events
/// the contracts emit.
pub const GUARDIAN_ABI_JSON: &str = r#"[
  {"type":"function","name":"requestContractAnalysis","stateMutability":"payable",
   "inputs":[{"name":"contractAddress","type":"string"}],"outputs":[]},
  {"type":"function","name":"requestTokenomicsAnalysis","stateMutability":"payable",
   "inputs":[{"name":"tokenAddress","type":"string"}],"outputs":[]},
  {"type":"function","name":"requestSocialAnalysis","stateMutability":"payable",
   "inputs":[{"name":"projectName","type":"string"}],"outputs":[]},
  {"type":"function","name":"requestMonitoring","stateMutability":"payable",
   "inputs":[{"name":"targetAddress","type":"string"}],"outputs":[]},

  {"type":"function","name":"getUserRequests","stateMutability":"view",
   "inputs":[{"name":"user","type":"address"}],
   "outputs":[{"name":"","type":"tuple[]","components":[
     {"name":"user","type":"address"},
     {"name":"target","type":"string"},
     {"name":"payment","type":"uint256"},
     {"name":"completed","type":"bool"},
     {"name":"riskScore","type":"uint256"},
     {"name":"analysis","type":"string"},
     {"name":"timestamp","type":"uint256"}]}]},

  {"type":"event","name":"ContractAnalysisRequested","anonymous":false,
   "inputs":[{"name":"user","type":"address","indexed":true},
             {"name":"contractAddress","type":"string","indexed":false},
             {"name":"payment","type":"uint256","indexed":false}]},
  {"type":"event","name":"TokenomicsAnalysisRequested","anonymous":false,
   "inputs":[{"name":"user","type":"address","indexed":true},
             {"name":"tokenAddress","type":"string","indexed":false},
             {"name":"payment","type":"uint256","indexed":false}]},
  {"type":"event","name":"SocialAnalysisRequested","anonymous":false,
   "inputs":[{"name":"user","type":"address","indexed":true},
             {"name":"projectName","type":"string","indexed":false},
             {"name":"payment","type":"uint256","indexed":false}]},
  {"type":"event","name":"MonitoringRequested","anonymous":false,
   "inputs":[{"name":"user","type":"address","indexed":true},
             {"name":"targetAddress","type":"string","indexed":false},
             {"name":"payment","type":"uint256","indexed":false}]},

  {"type":"event","name":"ContractAnalysisCompleted","anonymous":false,
   "inputs":[{"name":"user","type":"address","indexed":true},
             {"name":"contractAddress","type":"string","indexed":false},
             {"name":"riskScore","type":"uint256","indexed":false},
             {"name":"analysis","type":"string","indexed":false}]},
  {"type":"event","name":"TokenomicsAnalysisCompleted","anonymous":false,
   "inputs":[{"name":"user","type":"address","indexed":true},
             {"name":"tokenAddress","type":"string","indexed":false},
             {"name":"riskScore","type":"uint256","indexed":false},
             {"name":"analysis","type":"string","indexed":false}]},
  {"type":"event","name":"SocialAnalysisCompleted","anonymous":false,
   "inputs":[{"name":"user","type":"address","indexed":true},
             {"name":"projectName","type":"string","indexed":false},
             {"name":"riskScore","type":"uint256","indexed":false},
             {"name":"analysis","type":"string","indexed":false}]},
  {"type":"event","name":"MonitoringCompleted","anonymous":false,
   "inputs":[{"name":"user","type":"address","indexed":true},
             {"name":"targetAddress","type":"string","indexed":false},
             {"name":"riskScore","type":"uint256","indexed":false},
             {"name":"analysis","type":"string","indexed":false}]},

  {"type":"event","name":"PaymentReceived","anonymous":false,
   "inputs":[{"name":"user","type":"address","indexed":true},
             {"name":"amount","type":"uint256","indexed":false}]},
  {"type":"event","name":"AlertTriggered","anonymous":false,
   "inputs":[{"name":"user","type":"address","indexed":true},
             {"name":"targetAddress","type":"string","indexed":false},
             {"name":"alertType","type":"string","indexed":false},
             {"name":"message","type":"string","indexed":false}]}
]"#;

/// Parse the shared contract ABI.
pub fn guardian_abi() -> Result<Abi, ContractError> {
    serde_json::from_str(GUARDIAN_ABI_JSON).map_err(|e| ContractError::Abi(e.to_string()))
}

/// Fixed payment attached to every request call.
pub fn analysis_fee_wei() -> U256 {
    U256::from(constants::ANALYSIS_FEE_WEI)
}

#[cfg(test)]
mod tests {
    use super::*;

    use guardian_core::AnalysisKind;

    #[test]
    fn test_abi_parses() {
        let abi = guardian_abi().unwrap();
        assert_eq!(abi.functions().count(), 5);
        assert_eq!(abi.events().count(), 10);
    }

    #[test]
    fn test_abi_covers_every_request_method() {
        let abi = guardian_abi().unwrap();
        for kind in AnalysisKind::ALL {
            let function = abi
                .function(kind.method_name())
                .unwrap_or_else(|_| panic!("missing {}", kind.method_name()));
            assert_eq!(function.inputs.len(), 1);
        }
    }

    #[test]
    fn test_read_path_shape() {
        let abi = guardian_abi().unwrap();
        let getter = abi.function("getUserRequests").unwrap();
        assert_eq!(getter.inputs.len(), 1);
        assert_eq!(getter.outputs.len(), 1);
    }

    #[test]
    fn test_fee_matches_display_form() {
        let parsed = ethers::utils::parse_ether(constants::ANALYSIS_FEE_ETH).unwrap();
        assert_eq!(analysis_fee_wei(), parsed);
    }
}

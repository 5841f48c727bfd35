//! On-chain request service for the analysis contracts

use std::sync::Arc;

use ethers::abi::Abi;
use ethers::contract::Contract;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256, U256};
use serde::Serialize;

use guardian_core::{AnalysisKind, ContractAddresses, ContractError, Network, TxHash};

use crate::abi::{analysis_fee_wei, guardian_abi};

pub(crate) type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Row returned by `getUserRequests`
type RequestRow = (Address, String, U256, bool, U256, String, U256);

/// A previously submitted analysis request, as stored on-chain
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub user: String,
    pub target: String,
    /// Payment in wei, as a decimal string
    pub payment_wei: String,
    pub completed: bool,
    pub risk_score: u64,
    pub analysis: String,
    /// Unix timestamp of the request
    pub timestamp: u64,
}

impl AnalysisRequest {
    fn from_row(row: RequestRow) -> Self {
        let (user, target, payment, completed, risk_score, analysis, timestamp) = row;
        Self {
            user: format!("{user:#x}"),
            target,
            payment_wei: payment.to_string(),
            completed,
            risk_score: risk_score.low_u64(),
            analysis,
            timestamp: timestamp.low_u64(),
        }
    }
}

/// Outcome of a confirmed request call
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReceipt {
    pub kind: AnalysisKind,
    pub target: String,
    /// Source-chain transaction hash; this is what the confirmation
    /// watcher polls on
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// Payment in wei, as a decimal string
    pub payment_wei: String,
}

/// Client for the deployed Guardian analysis contracts.
///
/// Reads go through the bare provider; payment-bearing request calls and
/// deployments need a signer key.
pub struct GuardianContracts {
    provider: Arc<Provider<Http>>,
    signer: Option<Arc<SignerClient>>,
    abi: Abi,
    addresses: ContractAddresses,
    network: Network,
    payment: U256,
}

impl GuardianContracts {
    /// Connect to the configured RPC endpoint and validate its chain id.
    pub async fn connect(
        network: Network,
        addresses: ContractAddresses,
        signer_key: Option<&str>,
    ) -> Result<Self, ContractError> {
        let provider =
            Provider::<Http>::try_from(network.rpc_url.as_str()).map_err(|e| {
                ContractError::Endpoint {
                    url: network.rpc_url.clone(),
                    reason: e.to_string(),
                }
            })?;

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| ContractError::Rpc(e.to_string()))?
            .as_u64();
        if chain_id != network.chain_id {
            return Err(ContractError::ChainMismatch {
                expected: network.chain_id,
                actual: chain_id,
            });
        }
        tracing::info!(chain_id, rpc = %network.rpc_url, "connected to RPC endpoint");

        let provider = Arc::new(provider);
        let signer = match signer_key {
            Some(key) => {
                let wallet = key
                    .trim()
                    .trim_start_matches("0x")
                    .parse::<LocalWallet>()
                    .map_err(|e| ContractError::SignerInvalid(e.to_string()))?
                    .with_chain_id(chain_id);
                tracing::info!(address = %format_address(wallet.address()), "signer configured");
                Some(Arc::new(SignerMiddleware::new(
                    (*provider).clone(),
                    wallet,
                )))
            }
            None => None,
        };

        Ok(Self {
            provider,
            signer,
            abi: guardian_abi()?,
            addresses,
            network,
            payment: analysis_fee_wei(),
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn addresses(&self) -> &ContractAddresses {
        &self.addresses
    }

    /// Payment attached to every request call, in wei.
    pub fn payment(&self) -> U256 {
        self.payment
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Address of the configured signer, 0x-prefixed.
    pub fn signer_address(&self) -> Option<String> {
        self.signer
            .as_ref()
            .map(|s| format_address(s.signer().address()))
    }

    /// Submit a paid analysis request and wait for inclusion.
    pub async fn request_analysis(
        &self,
        kind: AnalysisKind,
        target: &str,
    ) -> Result<AnalysisReceipt, ContractError> {
        let contract = self.write_contract(kind)?;

        let call = contract
            .method::<_, ()>(kind.method_name(), target.to_string())
            .map_err(|e| ContractError::CallFailed {
                message: e.to_string(),
            })?
            .value(self.payment);

        let pending = call.send().await.map_err(|e| ContractError::CallFailed {
            message: e.to_string(),
        })?;
        let submitted: H256 = *pending;
        tracing::info!(kind = %kind, target, tx = %format_hash(submitted), "request submitted");

        let receipt = pending
            .await
            .map_err(|e| ContractError::Rpc(e.to_string()))?
            .ok_or_else(|| ContractError::TxDropped {
                tx_hash: format_hash(submitted),
            })?;

        if receipt.status == Some(0u64.into()) {
            return Err(ContractError::TxReverted {
                tx_hash: format_hash(receipt.transaction_hash),
            });
        }

        Ok(AnalysisReceipt {
            kind,
            target: target.to_string(),
            tx_hash: TxHash::new(format_hash(receipt.transaction_hash)),
            block_number: receipt.block_number.map(|b| b.as_u64()),
            payment_wei: self.payment.to_string(),
        })
    }

    /// Read back every request `user` has submitted to the `kind` contract.
    pub async fn user_requests(
        &self,
        kind: AnalysisKind,
        user: &str,
    ) -> Result<Vec<AnalysisRequest>, ContractError> {
        let contract = self.read_contract(kind)?;
        let user = parse_address(user)?;

        let rows: Vec<RequestRow> = contract
            .method::<_, Vec<RequestRow>>("getUserRequests", user)
            .map_err(|e| ContractError::CallFailed {
                message: e.to_string(),
            })?
            .call()
            .await
            .map_err(|e| ContractError::CallFailed {
                message: e.to_string(),
            })?;

        Ok(rows.into_iter().map(AnalysisRequest::from_row).collect())
    }

    pub(crate) fn signer_client(&self) -> Result<Arc<SignerClient>, ContractError> {
        self.signer.clone().ok_or(ContractError::SignerMissing)
    }

    fn read_contract(&self, kind: AnalysisKind) -> Result<Contract<Provider<Http>>, ContractError> {
        let address = parse_address(self.addresses.for_kind(kind))?;
        Ok(Contract::new(address, self.abi.clone(), self.provider.clone()))
    }

    fn write_contract(&self, kind: AnalysisKind) -> Result<Contract<SignerClient>, ContractError> {
        let signer = self.signer_client()?;
        let address = parse_address(self.addresses.for_kind(kind))?;
        Ok(Contract::new(address, self.abi.clone(), signer))
    }
}

pub(crate) fn parse_address(input: &str) -> Result<Address, ContractError> {
    input
        .trim()
        .parse::<Address>()
        .map_err(|_| ContractError::InvalidAddress {
            address: input.to_string(),
        })
}

pub(crate) fn format_address(address: Address) -> String {
    format!("{address:#x}")
}

fn format_hash(hash: H256) -> String {
    format!("{hash:#x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let parsed = parse_address("0x1edBBfc2a68428A556212dF0c54263b6a251B74d").unwrap();
        assert_eq!(
            format_address(parsed),
            "0x1edbbfc2a68428a556212df0c54263b6a251b74d"
        );

        assert!(parse_address("").is_err());
        assert!(parse_address("0x123").is_err());
        assert!(parse_address("not-an-address").is_err());
    }

    #[test]
    fn test_request_row_conversion() {
        let row: RequestRow = (
            Address::from_low_u64_be(0xabcd),
            "uniswap".to_string(),
            U256::from(100_000_000_000_000u128),
            true,
            U256::from(42u64),
            "low risk".to_string(),
            U256::from(1_700_000_000u64),
        );

        let request = AnalysisRequest::from_row(row);
        assert!(request.user.starts_with("0x"));
        assert_eq!(request.user.len(), 42);
        assert_eq!(request.target, "uniswap");
        assert_eq!(request.payment_wei, "100000000000000");
        assert!(request.completed);
        assert_eq!(request.risk_score, 42);
        assert_eq!(request.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_payment_is_fixed_fee() {
        assert_eq!(
            analysis_fee_wei(),
            U256::from(100_000_000_000_000u128)
        );
    }
}

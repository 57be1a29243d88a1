use deployer_shared::primitives::{Address, Bytes, TxHash, U256};

/// A transaction to be signed by the chain's deployer key.
///
/// A request without a destination deploys `data` as contract creation code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransactionRequest {
    pub to: Option<Address>,
    pub data: Bytes,
    pub value: U256,
}

impl TransactionRequest {
    pub fn deploy(bytecode: Bytes) -> Self {
        Self {
            to: None,
            data: bytecode,
            value: U256::ZERO,
        }
    }

    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            to: Some(to),
            data,
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn is_deployment(&self) -> bool {
        self.to.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub success: bool,
    pub contract_address: Option<Address>,
}

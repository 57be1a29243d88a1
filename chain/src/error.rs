use {
    deployer_shared::primitives::{ChainSelector, TxHash},
    thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Chain {0} is not part of the environment")]
    UnknownChain(ChainSelector),
    #[error("RPC call on chain {chain} failed: {message}")]
    Rpc {
        chain: ChainSelector,
        message: String,
    },
    #[error("Transaction {tx_hash} reverted on chain {chain}")]
    Reverted {
        chain: ChainSelector,
        tx_hash: TxHash,
    },
    #[error("Transaction {tx_hash} on chain {chain} did not create a contract")]
    MissingContractAddress {
        chain: ChainSelector,
        tx_hash: TxHash,
    },
}

impl ChainError {
    pub fn rpc(chain: ChainSelector, message: impl Into<String>) -> Self {
        Self::Rpc {
            chain,
            message: message.into(),
        }
    }

    /// The chain the error happened on.
    pub fn chain(&self) -> ChainSelector {
        match self {
            Self::UnknownChain(chain)
            | Self::Rpc { chain, .. }
            | Self::Reverted { chain, .. }
            | Self::MissingContractAddress { chain, .. } => *chain,
        }
    }
}

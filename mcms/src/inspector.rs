use {
    async_trait::async_trait,
    deployer_chain::ChainError,
    deployer_shared::primitives::{Address, ChainSelector},
    std::{collections::BTreeMap, fmt::Debug, sync::Arc},
};

/// Reads the on-chain configuration of a multisig.
#[async_trait]
pub trait Inspector: Debug + Send + Sync {
    /// The number of operations the multisig at `mcm` has executed so far. A new proposal
    /// continues from this count.
    async fn op_count(&self, mcm: Address) -> Result<u64, ChainError>;
}

/// One inspector per chain.
pub type Inspectors = BTreeMap<ChainSelector, Arc<dyn Inspector>>;

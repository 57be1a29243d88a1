use {
    crate::{ContractBinder, ContractHandle, Inspector, McmsError, McmsRole, Result},
    async_trait::async_trait,
    deployer_chain::ChainError,
    deployer_shared::primitives::{Address, ChainSelector},
    std::{
        collections::{HashMap, HashSet},
        sync::{Mutex, PoisonError},
    },
};

/// An inspector answering from a fixed table of op counts.
#[derive(Debug, Default)]
pub struct StaticInspector {
    chain: ChainSelector,
    op_counts: HashMap<Address, u64>,
    unreachable: bool,
}

impl StaticInspector {
    pub fn new(chain: ChainSelector) -> Self {
        Self {
            chain,
            ..Default::default()
        }
    }

    pub fn with_op_count(mut self, mcm: Address, count: u64) -> Self {
        self.op_counts.insert(mcm, count);
        self
    }

    /// Every query fails as if the chain could not be reached.
    pub fn unreachable(chain: ChainSelector) -> Self {
        Self {
            unreachable: true,
            ..Self::new(chain)
        }
    }
}

#[async_trait]
impl Inspector for StaticInspector {
    async fn op_count(&self, mcm: Address) -> std::result::Result<u64, ChainError> {
        if self.unreachable {
            return Err(ChainError::rpc(self.chain, "connection refused"));
        }
        Ok(self.op_counts.get(&mcm).copied().unwrap_or_default())
    }
}

/// A binder that records its calls and binds anything not marked as failing.
#[derive(Debug, Default)]
pub struct RecordingBinder {
    failing: HashSet<Address>,
    calls: Mutex<Vec<(ChainSelector, McmsRole, Address)>>,
}

impl RecordingBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, address: Address) -> Self {
        self.failing.insert(address);
        self
    }

    pub fn calls(&self) -> Vec<(ChainSelector, McmsRole, Address)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ContractBinder for RecordingBinder {
    async fn bind(
        &self,
        chain: ChainSelector,
        role: McmsRole,
        address: Address,
    ) -> Result<ContractHandle> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((chain, role, address));

        if self.failing.contains(&address) {
            return Err(McmsError::Bind {
                chain,
                role,
                address,
                reason: "no contract deployed".to_owned(),
            });
        }

        Ok(ContractHandle::new(address, role.contract_type()))
    }
}

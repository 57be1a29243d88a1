use {
    crate::{ContractHandle, McmsError, McmsRole, Result},
    async_trait::async_trait,
    deployer_chain::Chains,
    deployer_shared::primitives::{Address, ChainSelector},
};

/// Derives a live contract handle for a governance role at an arbitrary address.
#[async_trait]
pub trait ContractBinder: Send + Sync {
    async fn bind(
        &self,
        chain: ChainSelector,
        role: McmsRole,
        address: Address,
    ) -> Result<ContractHandle>;
}

/// Binds an address after checking that code is deployed there.
#[derive(Debug, Clone)]
pub struct ChainBinder {
    chains: Chains,
}

impl ChainBinder {
    pub fn new(chains: Chains) -> Self {
        Self { chains }
    }
}

#[async_trait]
impl ContractBinder for ChainBinder {
    async fn bind(
        &self,
        chain: ChainSelector,
        role: McmsRole,
        address: Address,
    ) -> Result<ContractHandle> {
        let bind_error = |reason: String| McmsError::Bind {
            chain,
            role,
            address,
            reason,
        };

        let handle = self
            .chains
            .get(chain)
            .map_err(|e| bind_error(e.to_string()))?;
        let code = handle
            .code_at(address)
            .await
            .map_err(|e| bind_error(e.to_string()))?;

        if code.is_empty() {
            return Err(bind_error("no contract deployed".to_owned()));
        }

        Ok(ContractHandle::new(address, role.contract_type()))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        deployer_chain::SimulatedChain,
        deployer_shared::primitives::{Bytes, address},
        std::sync::Arc,
    };

    const CHAIN: ChainSelector = ChainSelector(7);
    const DEPLOYED: Address = address!("00000000000000000000000000000000000000d1");

    fn binder() -> ChainBinder {
        let chain = SimulatedChain::new(CHAIN, "avalanche-testnet-fuji")
            .with_code(DEPLOYED, Bytes::from_static(&[0x60]));
        ChainBinder::new(Chains::new().with_chain(Arc::new(chain)))
    }

    #[tokio::test]
    async fn test_bind_to_deployed_contract() {
        let actual = binder()
            .bind(CHAIN, McmsRole::Bypasser, DEPLOYED)
            .await
            .unwrap();

        assert_eq!(
            actual,
            ContractHandle::new(DEPLOYED, "BypasserManyChainMultiSig")
        );
    }

    #[tokio::test]
    async fn test_bind_to_empty_account_fails() {
        let empty = address!("00000000000000000000000000000000000000d2");

        let actual = binder().bind(CHAIN, McmsRole::Proposer, empty).await;

        assert!(matches!(
            actual,
            Err(McmsError::Bind {
                chain: CHAIN,
                role: McmsRole::Proposer,
                ..
            })
        ));
    }
}

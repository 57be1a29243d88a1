use {
    crate::{ChainError, Receipt, TransactionRequest},
    async_trait::async_trait,
    deployer_shared::primitives::{Address, Bytes, ChainSelector, TxHash},
    std::{collections::BTreeMap, fmt::Debug, sync::Arc},
    tokio::sync::Mutex,
    tracing::debug,
};

/// A client of one chain, signing with the chain's deployer key.
#[async_trait]
pub trait ChainAdapter: Debug + Send + Sync {
    fn selector(&self) -> ChainSelector;

    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// The address of the key that signs transactions sent through this adapter.
    fn deployer(&self) -> Address;

    /// Signs and broadcasts a transaction without waiting for its inclusion.
    async fn send(&self, request: TransactionRequest) -> Result<TxHash, ChainError>;

    /// Blocks until `tx_hash` is included and returns its receipt.
    async fn confirm(&self, tx_hash: TxHash) -> Result<Receipt, ChainError>;

    /// Returns the code deployed at `address`, empty when there is none.
    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError>;
}

/// A chain adapter together with the lock that keeps submissions on its chain sequential.
#[derive(Debug, Clone)]
pub struct ChainHandle {
    adapter: Arc<dyn ChainAdapter>,
    submission: Arc<Mutex<()>>,
}

impl ChainHandle {
    pub fn new(adapter: Arc<dyn ChainAdapter>) -> Self {
        Self {
            adapter,
            submission: Arc::new(Mutex::new(())),
        }
    }

    pub fn selector(&self) -> ChainSelector {
        self.adapter.selector()
    }

    pub fn name(&self) -> &str {
        self.adapter.name()
    }

    pub fn deployer(&self) -> Address {
        self.adapter.deployer()
    }

    pub fn adapter(&self) -> &dyn ChainAdapter {
        self.adapter.as_ref()
    }

    pub async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        self.adapter.code_at(address).await
    }

    /// Sends `request` and waits for its confirmation before any other submission on this chain
    /// may start. A reverted transaction is reported as [`ChainError::Reverted`].
    pub async fn send_and_confirm(
        &self,
        request: TransactionRequest,
    ) -> Result<Receipt, ChainError> {
        let _guard = self.submission.lock().await;
        let tx_hash = self.adapter.send(request).await?;
        let receipt = self.adapter.confirm(tx_hash).await?;

        debug!(
            chain = %self.selector(),
            name = self.name(),
            %tx_hash,
            block = receipt.block_number,
            "Confirmed transaction"
        );

        if !receipt.success {
            return Err(ChainError::Reverted {
                chain: self.selector(),
                tx_hash,
            });
        }

        Ok(receipt)
    }

    /// Deploys `bytecode` and returns the address of the created contract.
    pub async fn deploy(&self, bytecode: Bytes) -> Result<(Address, Receipt), ChainError> {
        let receipt = self
            .send_and_confirm(TransactionRequest::deploy(bytecode))
            .await?;

        match receipt.contract_address {
            Some(address) => Ok((address, receipt)),
            None => Err(ChainError::MissingContractAddress {
                chain: self.selector(),
                tx_hash: receipt.tx_hash,
            }),
        }
    }
}

/// Every chain of an environment keyed by selector.
#[derive(Debug, Clone, Default)]
pub struct Chains {
    handles: BTreeMap<ChainSelector, ChainHandle>,
}

impl Chains {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, adapter: Arc<dyn ChainAdapter>) -> Self {
        self.insert(adapter);
        self
    }

    pub fn insert(&mut self, adapter: Arc<dyn ChainAdapter>) {
        self.handles
            .insert(adapter.selector(), ChainHandle::new(adapter));
    }

    pub fn get(&self, selector: ChainSelector) -> Result<&ChainHandle, ChainError> {
        self.handles
            .get(&selector)
            .ok_or(ChainError::UnknownChain(selector))
    }

    pub fn contains(&self, selector: ChainSelector) -> bool {
        self.handles.contains_key(&selector)
    }

    pub fn selectors(&self) -> impl Iterator<Item = ChainSelector> + '_ {
        self.handles.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::SimulatedChain,
        deployer_shared::primitives::{U256, address},
    };

    const CHAIN: ChainSelector = ChainSelector(11);

    #[tokio::test]
    async fn test_deploy_returns_address_derived_from_deployer_nonce() {
        let simulated = Arc::new(SimulatedChain::new(CHAIN, "ethereum-testnet"));
        let chains = Chains::new().with_chain(simulated.clone());
        let chain = chains.get(CHAIN).unwrap();

        let (first, _) = chain.deploy(Bytes::from_static(&[0x60, 0x00])).await.unwrap();
        let (second, _) = chain.deploy(Bytes::from_static(&[0x60, 0x01])).await.unwrap();

        assert_eq!(first, chain.deployer().create(0));
        assert_eq!(second, chain.deployer().create(1));
        assert_eq!(
            chain.code_at(first).await.unwrap(),
            Bytes::from_static(&[0x60, 0x00])
        );
    }

    #[tokio::test]
    async fn test_reverted_call_is_an_error() {
        let target = address!("00000000000000000000000000000000000000c0");
        let simulated = Arc::new(SimulatedChain::new(CHAIN, "ethereum-testnet"));
        simulated.revert_calls_to(target);
        let chains = Chains::new().with_chain(simulated);

        let actual = chains
            .get(CHAIN)
            .unwrap()
            .send_and_confirm(
                TransactionRequest::call(target, Bytes::new()).with_value(U256::from(1)),
            )
            .await;

        assert!(matches!(actual, Err(ChainError::Reverted { chain: CHAIN, .. })));
    }

    #[test]
    fn test_unknown_chain_lookup_fails() {
        let chains = Chains::new();

        let actual = chains.get(CHAIN).unwrap_err();

        assert_eq!(actual, ChainError::UnknownChain(CHAIN));
    }
}

use {
    crate::{ChainAdapter, ChainError, Receipt, TransactionRequest},
    async_trait::async_trait,
    deployer_shared::primitives::{Address, Bytes, ChainSelector, TxHash, address, keccak256},
    std::{
        collections::{HashMap, HashSet},
        sync::{Mutex, MutexGuard, PoisonError},
    },
};

/// The address corresponding to the deployer key of every simulated chain.
pub const SIMULATED_DEPLOYER: Address = address!("8fd379246834eac74b8419ffda202cf8051f7a03");

/// An in-memory chain that mines every transaction into its own block.
#[derive(Debug)]
pub struct SimulatedChain {
    selector: ChainSelector,
    name: String,
    inner: Mutex<SimulatedState>,
}

#[derive(Debug, Default)]
struct SimulatedState {
    nonce: u64,
    code: HashMap<Address, Bytes>,
    receipts: HashMap<TxHash, Receipt>,
    sent: Vec<TransactionRequest>,
    reverting: HashSet<Address>,
    failing_after: Option<usize>,
}

impl SimulatedChain {
    pub fn new(selector: ChainSelector, name: impl Into<String>) -> Self {
        Self {
            selector,
            name: name.into(),
            inner: Mutex::new(SimulatedState::default()),
        }
    }

    /// Places `code` at `address` as if it had been deployed before the test started.
    pub fn with_code(self, address: Address, code: Bytes) -> Self {
        self.state().code.insert(address, code);
        self
    }

    /// Every transaction sent after the first `count` fails with an RPC error.
    pub fn fail_sends_after(&self, count: usize) {
        self.state().failing_after = Some(count);
    }

    /// Calls to `address` are mined but revert.
    pub fn revert_calls_to(&self, address: Address) {
        self.state().reverting.insert(address);
    }

    /// Transactions accepted by this chain in submission order.
    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.state().sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.state().sent.len()
    }

    fn state(&self) -> MutexGuard<'_, SimulatedState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ChainAdapter for SimulatedChain {
    fn selector(&self) -> ChainSelector {
        self.selector
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn deployer(&self) -> Address {
        SIMULATED_DEPLOYER
    }

    async fn send(&self, request: TransactionRequest) -> Result<TxHash, ChainError> {
        let mut state = self.state();

        if state
            .failing_after
            .is_some_and(|count| state.sent.len() >= count)
        {
            return Err(ChainError::rpc(self.selector, "connection refused"));
        }

        let nonce = state.nonce;
        let tx_hash = keccak256(
            [
                self.selector.get().to_be_bytes().as_slice(),
                nonce.to_be_bytes().as_slice(),
                request.data.as_ref(),
            ]
            .concat(),
        );
        let (success, contract_address) = match request.to {
            None => {
                let address = SIMULATED_DEPLOYER.create(nonce);
                state.code.insert(address, request.data.clone());
                (true, Some(address))
            }
            Some(to) => (!state.reverting.contains(&to), None),
        };

        state.nonce += 1;
        state.receipts.insert(
            tx_hash,
            Receipt {
                tx_hash,
                block_number: nonce + 1,
                success,
                contract_address,
            },
        );
        state.sent.push(request);

        Ok(tx_hash)
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Receipt, ChainError> {
        self.state()
            .receipts
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| ChainError::rpc(self.selector, format!("unknown transaction {tx_hash}")))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        Ok(self.state().code.get(&address).cloned().unwrap_or_default())
    }
}

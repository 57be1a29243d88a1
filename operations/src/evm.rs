use {
    crate::{Bundle, Operation, OperationDef, OperationError, Result},
    async_trait::async_trait,
    deployer_chain::{ChainHandle, TransactionRequest},
    deployer_datastore::{AddressRecord, ContractType},
    deployer_shared::primitives::{Address, Bytes, ChainSelector, TxHash, U256},
    semver::Version,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployInput {
    pub chain_selector: ChainSelector,
    pub contract_type: ContractType,
    pub version: Version,
    pub bytecode: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOutput {
    pub chain_selector: ChainSelector,
    pub address: Address,
    pub contract_type: ContractType,
    pub version: Version,
    pub tx_hash: TxHash,
}

impl DeployOutput {
    /// The address catalog record describing this deployment.
    pub fn to_record(&self) -> AddressRecord {
        AddressRecord::new(
            self.chain_selector,
            self.address,
            self.contract_type.clone(),
            self.version.clone(),
        )
    }
}

/// Deploys contract creation code with the deployer key of the chain it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployContract;

#[async_trait]
impl Operation for DeployContract {
    type Input = DeployInput;
    type Output = DeployOutput;
    type Deps = ChainHandle;

    fn def(&self) -> OperationDef {
        OperationDef::new(
            "evm-deploy-contract",
            Version::new(1, 0, 0),
            "Deploys a contract from its creation code",
        )
    }

    async fn execute(
        &self,
        _: &Bundle,
        chain: &ChainHandle,
        input: DeployInput,
    ) -> Result<DeployOutput> {
        ensure_same_chain(input.chain_selector, chain)?;

        let (address, receipt) = chain.deploy(input.bytecode).await?;

        Ok(DeployOutput {
            chain_selector: input.chain_selector,
            address,
            contract_type: input.contract_type,
            version: input.version,
            tx_hash: receipt.tx_hash,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallInput {
    pub chain_selector: ChainSelector,
    pub to: Address,
    pub data: Bytes,
    #[serde(default)]
    pub value: U256,
    pub contract_type: ContractType,
    /// Prepares the call for governance instead of sending it with the deployer key.
    #[serde(default)]
    pub no_send: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOutput {
    pub chain_selector: ChainSelector,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub contract_type: ContractType,
    /// Hash of the confirmed transaction, absent when the call was only prepared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
}

impl CallOutput {
    pub fn executed(&self) -> bool {
        self.tx_hash.is_some()
    }
}

/// Calls a deployed contract, or prepares the call for a governance proposal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractCall;

#[async_trait]
impl Operation for ContractCall {
    type Input = CallInput;
    type Output = CallOutput;
    type Deps = ChainHandle;

    fn def(&self) -> OperationDef {
        OperationDef::new(
            "evm-contract-call",
            Version::new(1, 0, 0),
            "Calls a contract or prepares the call for governance",
        )
    }

    async fn execute(
        &self,
        _: &Bundle,
        chain: &ChainHandle,
        input: CallInput,
    ) -> Result<CallOutput> {
        ensure_same_chain(input.chain_selector, chain)?;

        let tx_hash = if input.no_send {
            None
        } else {
            let request =
                TransactionRequest::call(input.to, input.data.clone()).with_value(input.value);
            Some(chain.send_and_confirm(request).await?.tx_hash)
        };

        Ok(CallOutput {
            chain_selector: input.chain_selector,
            to: input.to,
            data: input.data,
            value: input.value,
            contract_type: input.contract_type,
            tx_hash,
        })
    }
}

fn ensure_same_chain(input: ChainSelector, chain: &ChainHandle) -> Result<()> {
    if input != chain.selector() {
        return Err(OperationError::ChainMismatch {
            input,
            dependency: chain.selector(),
        });
    }
    Ok(())
}

use {
    crate::{Changeset, ChangesetError, ChangesetOutput, Environment},
    async_trait::async_trait,
    deployer_datastore::ContractType,
    deployer_mcms::GovernanceBatch,
    deployer_operations::{
        CallInput, ContractCall, DeployContract, DeployInput, execute_operation, fan_out,
    },
    deployer_shared::primitives::{Address, Bytes, ChainSelector},
    semver::Version,
    serde::{Deserialize, Serialize},
    std::{
        collections::BTreeMap,
        sync::{
            Arc, Mutex, PoisonError,
            atomic::{AtomicUsize, Ordering},
        },
    },
};

/// Deploys a contract to every configured chain that does not have one yet.
#[derive(Debug, Clone)]
pub struct DeployIfAbsent {
    pub contract_type: ContractType,
    pub version: Version,
    pub bytecode: Bytes,
    /// The contract address on every chain of the last apply, whether deployed or found.
    pub resolved: Arc<Mutex<BTreeMap<ChainSelector, Address>>>,
}

impl DeployIfAbsent {
    pub fn new(contract_type: impl Into<ContractType>, version: Version, bytecode: Bytes) -> Self {
        Self {
            contract_type: contract_type.into(),
            version,
            bytecode,
            resolved: Arc::default(),
        }
    }

    pub fn resolved(&self) -> BTreeMap<ChainSelector, Address> {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn resolve(&self, chain: ChainSelector, address: Address) {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(chain, address);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployIfAbsentConfig {
    pub chains: Vec<ChainSelector>,
    #[serde(default)]
    pub qualifier: Option<String>,
}

#[async_trait]
impl Changeset for DeployIfAbsent {
    type Config = DeployIfAbsentConfig;

    fn name(&self) -> &str {
        "deploy-if-absent"
    }

    fn verify(
        &self,
        env: &Environment,
        config: &DeployIfAbsentConfig,
    ) -> Result<(), ChangesetError> {
        if config.chains.is_empty() {
            return Err(ChangesetError::validation("no chains to deploy to"));
        }
        match config.chains.iter().find(|&&chain| !env.chains().contains(chain)) {
            Some(&chain) => Err(ChangesetError::UnknownChain(chain)),
            None => Ok(()),
        }
    }

    async fn apply(
        &self,
        env: &Environment,
        config: &DeployIfAbsentConfig,
    ) -> Result<ChangesetOutput, ChangesetError> {
        let deployed = fan_out(env.operations(), config.chains.iter().copied(), |chain, bundle| {
            let env = env.clone();
            let changeset = self.clone();
            let qualifier = config.qualifier.clone();

            async move {
                let existing = env
                    .addresses()
                    .find(chain, &changeset.contract_type, qualifier.as_deref())
                    .map(|record| record.address)
                    .next();
                if let Some(address) = existing {
                    changeset.resolve(chain, address);
                    return Ok(None);
                }

                let handle = env.chains().get(chain)?;
                let input = DeployInput {
                    chain_selector: chain,
                    contract_type: changeset.contract_type.clone(),
                    version: changeset.version.clone(),
                    bytecode: changeset.bytecode.clone(),
                };
                let record = execute_operation(&bundle, &DeployContract, handle, input)
                    .await?
                    .output
                    .to_record();
                changeset.resolve(chain, record.address);

                Ok(Some(match qualifier {
                    Some(qualifier) => record.with_qualifier(qualifier),
                    None => record,
                }))
            }
        })
        .await?;

        Ok(ChangesetOutput::new().with_records(deployed.into_values().flatten()))
    }
}

/// Fails on demand and counts how often it was verified and applied.
#[derive(Debug, Clone, Default)]
pub struct FailingChangeset {
    pub verified: Arc<AtomicUsize>,
    pub applied: Arc<AtomicUsize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailingConfig {
    pub chain: ChainSelector,
    #[serde(default)]
    pub fail_verify: bool,
    /// Deploys a contract before failing, leaving a report behind.
    #[serde(default)]
    pub deploy_before_failing: bool,
}

impl FailingChangeset {
    pub fn verified(&self) -> usize {
        self.verified.load(Ordering::SeqCst)
    }

    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Changeset for FailingChangeset {
    type Config = FailingConfig;

    fn name(&self) -> &str {
        "failing"
    }

    fn verify(&self, _: &Environment, config: &FailingConfig) -> Result<(), ChangesetError> {
        self.verified.fetch_add(1, Ordering::SeqCst);
        if config.fail_verify {
            return Err(ChangesetError::validation("threshold must be positive"));
        }
        Ok(())
    }

    async fn apply(
        &self,
        env: &Environment,
        config: &FailingConfig,
    ) -> Result<ChangesetOutput, ChangesetError> {
        self.applied.fetch_add(1, Ordering::SeqCst);

        if config.deploy_before_failing {
            let input = DeployInput {
                chain_selector: config.chain,
                contract_type: "TokenAdminRegistry".into(),
                version: Version::new(1, 5, 0),
                bytecode: Bytes::from_static(&[0x60, 0x0f]),
            };
            execute_operation(
                env.operations(),
                &DeployContract,
                env.chains().get(config.chain)?,
                input,
            )
            .await?;
        }

        Err(ChangesetError::chain_state(
            config.chain,
            "token admin registry has no administrator",
        ))
    }
}

/// Prepares a call to a catalogued contract for governance instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProposeCall;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeCallConfig {
    pub chain: ChainSelector,
    pub contract_type: ContractType,
    pub data: Bytes,
}

#[async_trait]
impl Changeset for ProposeCall {
    type Config = ProposeCallConfig;

    fn name(&self) -> &str {
        "propose-call"
    }

    fn verify(&self, env: &Environment, config: &ProposeCallConfig) -> Result<(), ChangesetError> {
        if !env.chains().contains(config.chain) {
            return Err(ChangesetError::UnknownChain(config.chain));
        }
        Ok(())
    }

    async fn apply(
        &self,
        env: &Environment,
        config: &ProposeCallConfig,
    ) -> Result<ChangesetOutput, ChangesetError> {
        // The target may have been deployed by an earlier unit of the same run.
        let target = env
            .addresses()
            .find(config.chain, &config.contract_type, None)
            .next()
            .ok_or_else(|| {
                ChangesetError::chain_state(
                    config.chain,
                    format!("{} is not deployed", config.contract_type),
                )
            })?;

        let input = CallInput {
            chain_selector: config.chain,
            to: target.address,
            data: config.data.clone(),
            value: Default::default(),
            contract_type: config.contract_type.clone(),
            no_send: true,
        };
        let call = execute_operation(
            env.operations(),
            &ContractCall,
            env.chains().get(config.chain)?,
            input,
        )
        .await?
        .output;

        Ok(ChangesetOutput::new().with_batch(GovernanceBatch::single(config.chain, call.into())))
    }
}

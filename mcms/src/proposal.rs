use {
    crate::{GovernanceSettings, Inspectors, McmsError, Result, TimelockAction, time},
    async_trait::async_trait,
    deployer_datastore::ContractType,
    deployer_operations::CallOutput,
    deployer_shared::primitives::{Address, Bytes, ChainSelector, ToSaturatedU32, U256},
    serde::{Deserialize, Serialize},
    std::{
        collections::BTreeMap,
        time::{Duration, SystemTime},
    },
    tracing::debug,
};

/// Format version of emitted proposals.
pub const PROPOSAL_VERSION: &str = "v1";

/// A call the timelock makes once the proposal is executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceTransaction {
    pub to: Address,
    pub data: Bytes,
    #[serde(default)]
    pub value: U256,
    pub contract_type: ContractType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl GovernanceTransaction {
    pub fn new(to: Address, data: Bytes, contract_type: impl Into<ContractType>) -> Self {
        Self {
            to,
            data,
            value: U256::ZERO,
            contract_type: contract_type.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

impl From<CallOutput> for GovernanceTransaction {
    fn from(call: CallOutput) -> Self {
        Self::new(call.to, call.data, call.contract_type).with_value(call.value)
    }
}

/// Ordered transactions a changeset wants executed on one chain through governance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceBatch {
    pub chain_selector: ChainSelector,
    pub transactions: Vec<GovernanceTransaction>,
}

impl GovernanceBatch {
    pub fn new(chain_selector: ChainSelector, transactions: Vec<GovernanceTransaction>) -> Self {
        Self {
            chain_selector,
            transactions,
        }
    }

    /// A batch holding one transaction.
    pub fn single(chain_selector: ChainSelector, transaction: GovernanceTransaction) -> Self {
        Self::new(chain_selector, vec![transaction])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetadata {
    pub starting_op_count: u64,
    pub mcm_address: Address,
}

/// One proposal spanning every chain a run touched through governance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelockProposal {
    pub version: String,
    pub action: TimelockAction,
    /// Unix time in seconds after which the proposal can no longer be set as root.
    pub valid_until: u32,
    pub description: String,
    #[serde(with = "time::secs")]
    pub delay: Duration,
    pub override_previous_root: bool,
    pub chain_metadata: BTreeMap<ChainSelector, ChainMetadata>,
    pub timelock_addresses: BTreeMap<ChainSelector, Address>,
    /// One batch per chain in the order the chains first produced a batch.
    pub operations: Vec<GovernanceBatch>,
}

impl TimelockProposal {
    pub fn chains(&self) -> impl Iterator<Item = ChainSelector> + '_ {
        self.operations.iter().map(|batch| batch.chain_selector)
    }
}

/// The inputs from which a [`ProposalBuilder`] assembles a proposal.
#[derive(Debug)]
pub struct ProposalRequest<'a> {
    pub timelocks: BTreeMap<ChainSelector, Address>,
    /// The multisig submitting the proposal on each chain.
    pub mcms: BTreeMap<ChainSelector, Address>,
    pub inspectors: &'a Inspectors,
    /// Batches already grouped to one per chain.
    pub batches: Vec<GovernanceBatch>,
    pub settings: &'a GovernanceSettings,
}

#[async_trait]
pub trait ProposalBuilder: Send + Sync {
    async fn build(&self, request: ProposalRequest<'_>) -> Result<TimelockProposal>;
}

/// Builds proposals that continue from each multisig's current op count.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelockProposalBuilder {
    now: Option<SystemTime>,
}

impl TimelockProposalBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder whose clock is fixed at `now`.
    pub fn at(now: SystemTime) -> Self {
        Self { now: Some(now) }
    }

    fn now(&self) -> SystemTime {
        self.now.unwrap_or_else(SystemTime::now)
    }
}

#[async_trait]
impl ProposalBuilder for TimelockProposalBuilder {
    async fn build(&self, request: ProposalRequest<'_>) -> Result<TimelockProposal> {
        let config = &request.settings.timelock;
        let mut chain_metadata = BTreeMap::new();

        for (&chain, &mcm) in &request.mcms {
            let inspector = request
                .inspectors
                .get(&chain)
                .ok_or(McmsError::MissingInspector(chain))?;
            let starting_op_count = inspector
                .op_count(mcm)
                .await
                .map_err(|source| McmsError::Inspector { chain, source })?;

            debug!(%chain, %mcm, starting_op_count, "Read multisig op count");
            chain_metadata.insert(
                chain,
                ChainMetadata {
                    starting_op_count,
                    mcm_address: mcm,
                },
            );
        }

        let valid_until = time::unix_secs(self.now())
            .saturating_add(config.valid_for.as_secs())
            .to_saturated_u32();

        Ok(TimelockProposal {
            version: PROPOSAL_VERSION.to_owned(),
            action: config.mcms_action,
            valid_until,
            description: request.settings.description.clone(),
            delay: config.min_delay,
            override_previous_root: config.override_root,
            chain_metadata,
            timelock_addresses: request.timelocks,
            operations: request.batches,
        })
    }
}

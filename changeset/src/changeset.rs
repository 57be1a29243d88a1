use {
    crate::{ChangesetError, Environment},
    async_trait::async_trait,
    deployer_datastore::{AddressRecord, StateEntry},
    deployer_mcms::GovernanceBatch,
    deployer_operations::Report,
};

/// One named unit of desired state change against one or more chains.
///
/// `verify` only reads the environment and must never mutate a chain. `apply` performs the change.
/// It is not required to be safe to call twice blindly, so changesets that should be re-runnable
/// check whether their target already exists before mutating.
#[async_trait]
pub trait Changeset: Send + Sync + 'static {
    type Config: Send + Sync + 'static;

    fn name(&self) -> &str;

    fn verify(&self, env: &Environment, config: &Self::Config) -> Result<(), ChangesetError>;

    async fn apply(
        &self,
        env: &Environment,
        config: &Self::Config,
    ) -> Result<ChangesetOutput, ChangesetError>;
}

/// Everything one changeset produced.
///
/// Reports recorded through the operations bundle of the environment are collected by the
/// orchestrator. `reports` only carries reports produced elsewhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangesetOutput {
    pub address_records: Vec<AddressRecord>,
    pub state_entries: Vec<StateEntry>,
    pub reports: Vec<Report>,
    pub governance_batches: Vec<GovernanceBatch>,
}

impl ChangesetOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, record: AddressRecord) -> Self {
        self.address_records.push(record);
        self
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = AddressRecord>) -> Self {
        self.address_records.extend(records);
        self
    }

    pub fn with_entry(mut self, entry: StateEntry) -> Self {
        self.state_entries.push(entry);
        self
    }

    pub fn with_batch(mut self, batch: GovernanceBatch) -> Self {
        self.governance_batches.push(batch);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.address_records.is_empty()
            && self.state_entries.is_empty()
            && self.reports.is_empty()
            && self.governance_batches.is_empty()
    }
}

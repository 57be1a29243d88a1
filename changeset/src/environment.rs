use {
    deployer_chain::Chains,
    deployer_datastore::{AddressCatalog, DataStore, StateStore},
    deployer_mcms::Inspectors,
    deployer_operations::Bundle,
};

/// The read-only view of the world a changeset runs against.
///
/// Cloning is cheap. The orchestrator derives a new environment after every applied unit
/// instead of mutating the one it was given.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    name: String,
    chains: Chains,
    datastore: DataStore,
    operations: Bundle,
    inspectors: Inspectors,
}

impl Environment {
    pub fn new(name: impl Into<String>, chains: Chains, datastore: DataStore) -> Self {
        Self {
            name: name.into(),
            chains,
            datastore,
            operations: Bundle::default(),
            inspectors: Inspectors::new(),
        }
    }

    pub fn with_datastore(&self, datastore: DataStore) -> Self {
        Self {
            datastore,
            ..self.clone()
        }
    }

    pub fn with_operations(&self, operations: Bundle) -> Self {
        Self {
            operations,
            ..self.clone()
        }
    }

    pub fn with_inspectors(&self, inspectors: Inspectors) -> Self {
        Self {
            inspectors,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chains(&self) -> &Chains {
        &self.chains
    }

    pub fn datastore(&self) -> &DataStore {
        &self.datastore
    }

    pub fn addresses(&self) -> &AddressCatalog {
        &self.datastore.addresses
    }

    pub fn state(&self) -> &StateStore {
        &self.datastore.state
    }

    /// The bundle operations run in.
    pub fn operations(&self) -> &Bundle {
        &self.operations
    }

    pub fn inspectors(&self) -> &Inspectors {
        &self.inspectors
    }
}

use {
    crate::{ContractType, MergeConflict},
    deployer_shared::primitives::{Address, ChainSelector},
    semver::Version,
    serde::{Serialize, de::DeserializeOwned},
    std::{collections::BTreeMap, fmt},
};

#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct StateKey {
    pub chain_selector: ChainSelector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    pub contract_type: ContractType,
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on chain {}", self.contract_type, self.chain_selector)?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, " qualifier {qualifier:?}")?;
        }
        Ok(())
    }
}

/// A typed record of the structured state store: an address reference together with arbitrary
/// metadata serialized as JSON.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateEntry {
    pub key: StateKey,
    pub address: Address,
    pub version: Version,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl StateEntry {
    pub fn new(
        chain_selector: ChainSelector,
        contract_type: impl Into<ContractType>,
        address: Address,
        version: Version,
    ) -> Self {
        Self {
            key: StateKey {
                chain_selector,
                qualifier: None,
                contract_type: contract_type.into(),
            },
            address,
            version,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.key.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_metadata<T: Serialize>(mut self, metadata: &T) -> Result<Self, serde_json::Error> {
        self.metadata = serde_json::to_value(metadata)?;
        Ok(self)
    }

    pub fn metadata_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.metadata)
    }
}

/// A structured, queryable store of [`StateEntry`] values keyed by [`StateKey`].
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<StateEntry>", into = "Vec<StateEntry>")]
pub struct StateStore {
    entries: BTreeMap<StateKey, StateEntry>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &StateKey) -> Option<&StateEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateEntry> {
        self.entries.values()
    }

    pub fn chain(&self, chain_selector: ChainSelector) -> impl Iterator<Item = &StateEntry> {
        self.entries
            .values()
            .filter(move |entry| entry.key.chain_selector == chain_selector)
    }

    /// Inserts an entry. An occupied key only accepts an identical entry.
    pub fn insert(&mut self, entry: StateEntry) -> Result<(), MergeConflict> {
        match self.entries.get(&entry.key) {
            Some(existing) if existing == &entry => Ok(()),
            Some(existing) => Err(MergeConflict::StateEntry {
                key: entry.key.clone(),
                existing: Box::new(existing.clone()),
                incoming: Box::new(entry),
            }),
            None => {
                self.entries.insert(entry.key.clone(), entry);
                Ok(())
            }
        }
    }

    pub fn merged(
        &self,
        entries: impl IntoIterator<Item = StateEntry>,
    ) -> Result<Self, MergeConflict> {
        let mut merged = self.clone();

        for entry in entries {
            merged.insert(entry)?;
        }

        Ok(merged)
    }

    pub fn merge(&self, other: &Self) -> Result<Self, MergeConflict> {
        self.merged(other.iter().cloned())
    }
}

impl TryFrom<Vec<StateEntry>> for StateStore {
    type Error = MergeConflict;

    fn try_from(value: Vec<StateEntry>) -> Result<Self, Self::Error> {
        Self::new().merged(value)
    }
}

impl From<StateStore> for Vec<StateEntry> {
    fn from(value: StateStore) -> Self {
        value.entries.into_values().collect()
    }
}

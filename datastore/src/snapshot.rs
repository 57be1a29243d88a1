use {
    crate::{AddressCatalog, AddressRecord, DataStoreError, MergeConflict, StateEntry, StateStore},
    std::{fs, path::Path},
};

/// A versioned snapshot of everything known about deployed contracts.
///
/// Snapshots are never mutated after construction. Every successful merge returns a new
/// snapshot with its version incremented by one.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct DataStore {
    pub version: u64,
    pub addresses: AddressCatalog,
    pub state: StateStore,
}

impl DataStore {
    pub fn new(addresses: AddressCatalog, state: StateStore) -> Self {
        Self {
            version: 0,
            addresses,
            state,
        }
    }

    /// Produces the next snapshot with `records` and `entries` merged in.
    pub fn merged(
        &self,
        records: impl IntoIterator<Item = AddressRecord>,
        entries: impl IntoIterator<Item = StateEntry>,
    ) -> Result<Self, MergeConflict> {
        Ok(Self {
            version: self.version + 1,
            addresses: self.addresses.merged(records)?,
            state: self.state.merged(entries)?,
        })
    }

    pub fn merge(
        &self,
        addresses: &AddressCatalog,
        state: &StateStore,
    ) -> Result<Self, MergeConflict> {
        self.merged(addresses.iter().cloned(), state.iter().cloned())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataStoreError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DataStoreError> {
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        deployer_shared::primitives::{ChainSelector, address},
        semver::Version,
    };

    fn timelock() -> AddressRecord {
        AddressRecord::new(
            ChainSelector(1),
            address!("00000000000000000000000000000000000000a1"),
            "RBACTimelock",
            Version::new(1, 0, 0),
        )
    }

    #[test]
    fn test_merge_increments_version_and_keeps_previous_snapshot() {
        let base = DataStore::default();

        let next = base.merged([timelock()], []).unwrap();

        assert_eq!(base.version, 0);
        assert!(base.addresses.is_empty());
        assert_eq!(next.version, 1);
        assert_eq!(next.addresses.len(), 1);
    }

    #[test]
    fn test_save_and_load_restore_identical_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datastore.json");
        let entry = StateEntry::new(
            ChainSelector(1),
            "RBACTimelock",
            timelock().address,
            Version::new(1, 0, 0),
        )
        .with_qualifier("main");
        let snapshot = DataStore::default()
            .merged([timelock().with_label("TIMELOCK")], [entry])
            .unwrap();

        snapshot.save(&path).unwrap();
        let actual = DataStore::load(&path).unwrap();

        assert_eq!(actual, snapshot);
    }

    #[test]
    fn test_loading_file_with_conflicting_records_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datastore.json");
        let mut conflicting = timelock();
        conflicting.contract_type = "CallProxy".into();
        let json = serde_json::json!({
            "version": 3,
            "addresses": [timelock(), conflicting],
            "state": [],
        });
        fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

        let actual = DataStore::load(&path);

        assert!(matches!(actual, Err(DataStoreError::Json(_))));
    }
}

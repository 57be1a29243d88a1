use {
    crate::{AddressKey, AddressRecord, StateEntry, StateKey},
    thiserror::Error,
};

/// Two snapshots disagree on the value stored under an identical key.
///
/// A conflict is never resolved by precedence. Both sides are kept for the operator to inspect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeConflict {
    #[error("Address record conflict for {key}: existing {existing}, incoming {incoming}")]
    AddressRecord {
        key: AddressKey,
        existing: Box<AddressRecord>,
        incoming: Box<AddressRecord>,
    },
    #[error("State entry conflict for {key}")]
    StateEntry {
        key: StateKey,
        existing: Box<StateEntry>,
        incoming: Box<StateEntry>,
    },
}

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("Failed to access datastore file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode or decode datastore: {0}")]
    Json(#[from] serde_json::Error),
}

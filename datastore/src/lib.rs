//! The datastore crate is responsible for the records that describe what is deployed where:
//!
//! * [`AddressCatalog`] holds one [`AddressRecord`] per deployed contract instance.
//! * [`StateStore`] holds typed metadata entries keyed by chain, qualifier and contract type.
//! * [`DataStore`] is a versioned snapshot of both, merged into a new snapshot rather than
//!   mutated in place.
//!
//! Every merge is strict. Two records under the same key must agree, otherwise the merge fails
//! with a [`MergeConflict`] and nothing is silently overwritten.

pub use {
    address::{AddressCatalog, AddressKey, AddressRecord, ContractType, LabelSet, RecordIdent},
    error::{DataStoreError, MergeConflict},
    snapshot::DataStore,
    state::{StateEntry, StateKey, StateStore},
};

mod address;
mod error;
mod snapshot;
mod state;

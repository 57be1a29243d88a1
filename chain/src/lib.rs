//! The chain module is responsible for the narrow surface through which changesets touch a chain:
//!
//! * Declares the [`ChainAdapter`] implemented by chain clients.
//! * Keeps the [`Chains`] of an environment, serializing submissions per chain.
//! * Provides a [`SimulatedChain`] for tests behind the `test-doubles` feature.

#[cfg(any(feature = "test-doubles", test))]
pub use simulated::{SIMULATED_DEPLOYER, SimulatedChain};
pub use {
    adapter::{ChainAdapter, ChainHandle, Chains},
    error::ChainError,
    transaction::{Receipt, TransactionRequest},
};

mod adapter;
mod error;
#[cfg(any(feature = "test-doubles", test))]
mod simulated;
mod transaction;

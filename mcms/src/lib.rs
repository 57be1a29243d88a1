//! The MCMS module is responsible for everything a change needs to go through governance:
//!
//! * Loads the governance contracts of a chain from the address catalog into [`McmsChainState`].
//! * Applies per-chain role overrides with [`resolve`].
//! * Collapses the governance batches of a whole run into at most one [`TimelockProposal`] with
//!   [`aggregate`].

#[cfg(any(feature = "test-doubles", test))]
pub use testing::{RecordingBinder, StaticInspector};
pub use {
    aggregate::aggregate,
    binder::{ChainBinder, ContractBinder},
    config::{DEFAULT_VALID_FOR, GovernanceSettings, TimelockAction, TimelockConfig},
    error::{McmsError, Result},
    inspector::{Inspector, Inspectors},
    proposal::{
        ChainMetadata, GovernanceBatch, GovernanceTransaction, PROPOSAL_VERSION, ProposalBuilder,
        ProposalRequest, TimelockProposal, TimelockProposalBuilder,
    },
    resolve::resolve,
    roles::{ContractHandle, McmsChainState, McmsRole, PartialRoles},
};

pub mod contract_types;

mod aggregate;
mod binder;
mod config;
mod error;
mod inspector;
mod proposal;
mod resolve;
mod roles;
#[cfg(any(feature = "test-doubles", test))]
mod testing;
mod time;

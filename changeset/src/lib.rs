//! The changeset module is responsible for applying an ordered list of changesets as one run:
//!
//! * Wraps strongly-typed changesets into a uniform [`ChangesetUnit`].
//! * Checks the preconditions of every unit before touching any chain, see [`verify_all`].
//! * Applies units one after another, merging their outputs into an [`AccumulatedOutput`].
//! * Collapses the governance batches of a completed run into a single timelock proposal.
//!
//! A failed run still returns everything that was accumulated before the failure in its
//! [`OrchestrationResult`].

#[cfg(any(feature = "test-doubles", test))]
pub use {
    dependency::{TEST_NOW, TestDependencies},
    test_doubles::*,
};
pub use {
    changeset::{Changeset, ChangesetOutput},
    dependency::{ChainDependencies, Dependencies},
    environment::Environment,
    error::{ChangesetError, OrchestrationError},
    gate::verify_all,
    orchestrator::{OrchestrationResult, Orchestrator},
    output::{AccumulatedOutput, merge},
    unit::ChangesetUnit,
};

mod changeset;
mod dependency;
mod environment;
mod error;
mod gate;
mod orchestrator;
mod output;
#[cfg(any(feature = "test-doubles", test))]
mod test_doubles;
mod unit;

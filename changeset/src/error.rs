//! Errors of a single changeset and of a whole orchestration run.
//!
//! A [`ChangesetError`] describes what went wrong inside one changeset. An
//! [`OrchestrationError`] adds where it went wrong: the index and name of the failing unit, or
//! the proposal stage.

use {
    deployer_chain::ChainError,
    deployer_datastore::MergeConflict,
    deployer_mcms::McmsError,
    deployer_operations::OperationError,
    deployer_shared::primitives::ChainSelector,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum ChangesetError {
    /// A precondition failed. No chain was touched.
    #[error("Invalid config: {0}")]
    ConfigValidation(String),
    #[error("Config is not a {expected}: {reason}")]
    ConfigTypeMismatch {
        expected: &'static str,
        reason: String,
    },
    /// Expected on-chain or off-chain state is missing.
    #[error("Unexpected state on chain {chain}: {message}")]
    ChainState {
        chain: ChainSelector,
        message: String,
    },
    #[error("{0}")]
    ChainRpc(ChainError),
    #[error("{0}")]
    MergeConflict(#[from] MergeConflict),
    #[error("Failed to build proposal: {0}")]
    ProposalBuild(McmsError),
    #[error("Unknown chain {0}")]
    UnknownChain(ChainSelector),
    #[error("{0}")]
    Operation(OperationError),
}

impl ChangesetError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation(message.into())
    }

    pub fn chain_state(chain: ChainSelector, message: impl Into<String>) -> Self {
        Self::ChainState {
            chain,
            message: message.into(),
        }
    }

    /// The chain the error is attributed to, if any.
    pub fn chain(&self) -> Option<ChainSelector> {
        match self {
            Self::ChainState { chain, .. } | Self::UnknownChain(chain) => Some(*chain),
            Self::ChainRpc(e) => Some(e.chain()),
            Self::ProposalBuild(e) => e.chain(),
            Self::Operation(e) => e.chain(),
            Self::ConfigValidation(_)
            | Self::ConfigTypeMismatch { .. }
            | Self::MergeConflict(_) => None,
        }
    }
}

impl From<ChainError> for ChangesetError {
    fn from(value: ChainError) -> Self {
        match value {
            ChainError::UnknownChain(chain) => Self::UnknownChain(chain),
            e => Self::ChainRpc(e),
        }
    }
}

impl From<OperationError> for ChangesetError {
    fn from(value: OperationError) -> Self {
        match value {
            OperationError::Chain(e) => e.into(),
            e => Self::Operation(e),
        }
    }
}

impl From<McmsError> for ChangesetError {
    fn from(value: McmsError) -> Self {
        match value {
            McmsError::UnknownChain(chain) => Self::UnknownChain(chain),
            e => Self::ProposalBuild(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("Precondition of changeset #{index} {name} failed: {source}")]
    Precondition {
        index: usize,
        name: String,
        #[source]
        source: ChangesetError,
    },
    #[error("Changeset #{index} {name} failed: {source}")]
    Apply {
        index: usize,
        name: String,
        #[source]
        source: ChangesetError,
    },
    #[error("Output of changeset #{index} {name} conflicts with earlier state: {source}")]
    Merge {
        index: usize,
        name: String,
        #[source]
        source: MergeConflict,
    },
    #[error("{0}")]
    Proposal(ChangesetError),
}

impl OrchestrationError {
    /// Index of the failing unit, absent for proposal failures.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Precondition { index, .. }
            | Self::Apply { index, .. }
            | Self::Merge { index, .. } => Some(*index),
            Self::Proposal(_) => None,
        }
    }
}

use {
    crate::McmsRole,
    deployer_chain::ChainError,
    deployer_shared::primitives::{Address, ChainSelector},
    thiserror::Error,
};

/// The result type with its error type set to [`McmsError`].
pub type Result<T> = std::result::Result<T, McmsError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum McmsError {
    #[error("Chain {0} has no loaded governance state")]
    UnknownChain(ChainSelector),
    #[error("Chain {chain} has no {role} contract")]
    MissingRole { chain: ChainSelector, role: McmsRole },
    #[error("Chain {chain} records two {role} contracts: {first} and {second}")]
    DuplicateRole {
        chain: ChainSelector,
        role: McmsRole,
        first: Address,
        second: Address,
    },
    #[error("Cannot bind {role} override {address} on chain {chain}: {reason}")]
    Bind {
        chain: ChainSelector,
        role: McmsRole,
        address: Address,
        reason: String,
    },
    #[error("No inspector for chain {0}")]
    MissingInspector(ChainSelector),
    #[error("Inspector of chain {chain} failed: {source}")]
    Inspector {
        chain: ChainSelector,
        #[source]
        source: ChainError,
    },
    #[error("Invalid timelock config: {0}")]
    InvalidConfig(String),
}

impl McmsError {
    /// The chain the error is attributed to, if any.
    pub fn chain(&self) -> Option<ChainSelector> {
        match self {
            Self::UnknownChain(chain) | Self::MissingInspector(chain) => Some(*chain),
            Self::MissingRole { chain, .. }
            | Self::DuplicateRole { chain, .. }
            | Self::Bind { chain, .. }
            | Self::Inspector { chain, .. } => Some(*chain),
            Self::InvalidConfig(_) => None,
        }
    }
}

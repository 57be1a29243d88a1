use {
    deployer_chain::ChainError,
    deployer_shared::primitives::ChainSelector,
    thiserror::Error,
};

/// The result type with its error type set to [`OperationError`].
pub type Result<T> = std::result::Result<T, OperationError>;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("{0}")]
    Chain(#[from] ChainError),
    #[error("Input targets chain {input} but operation runs against chain {dependency}")]
    ChainMismatch {
        input: ChainSelector,
        dependency: ChainSelector,
    },
    #[error("Failed to encode or decode report payload of {name}: {source}")]
    Codec {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Execution was cancelled")]
    Cancelled,
    #[error("Execution deadline exceeded")]
    DeadlineExceeded,
    #[error("Worker for chain {chain} failed: {source}")]
    Worker {
        chain: ChainSelector,
        #[source]
        source: Box<OperationError>,
    },
    #[error("Worker did not finish: {0}")]
    Join(String),
    #[error("{0}")]
    Failed(String),
}

impl OperationError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// The chain the error is attributed to, if any.
    pub fn chain(&self) -> Option<ChainSelector> {
        match self {
            Self::Worker { chain, .. } => Some(*chain),
            Self::Chain(e) => Some(e.chain()),
            _ => None,
        }
    }
}

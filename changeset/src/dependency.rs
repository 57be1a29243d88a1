#[cfg(any(feature = "test-doubles", test))]
pub use test_doubles::{TEST_NOW, TestDependencies};

use {
    crate::Environment,
    deployer_mcms::{ChainBinder, ContractBinder, ProposalBuilder, TimelockProposalBuilder},
    std::sync::Arc,
};

/// The governance collaborators an orchestrator builds proposals with.
pub trait Dependencies: Send + Sync {
    /// Binds override addresses on the chains of `env`.
    fn contract_binder(&self, env: &Environment) -> Arc<dyn ContractBinder>;

    fn proposal_builder(&self) -> &dyn ProposalBuilder;
}

/// Binds overrides against the live chains of the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainDependencies {
    builder: TimelockProposalBuilder,
}

impl Dependencies for ChainDependencies {
    fn contract_binder(&self, env: &Environment) -> Arc<dyn ContractBinder> {
        Arc::new(ChainBinder::new(env.chains().clone()))
    }

    fn proposal_builder(&self) -> &dyn ProposalBuilder {
        &self.builder
    }
}

#[cfg(any(feature = "test-doubles", test))]
mod test_doubles {
    use {
        super::*,
        deployer_mcms::RecordingBinder,
        std::time::{Duration, UNIX_EPOCH},
    };

    /// Unix time the test proposal builder's clock is fixed at.
    pub const TEST_NOW: u64 = 1_700_000_000;

    /// Binds every override without touching a chain and builds proposals at a fixed time.
    #[derive(Debug)]
    pub struct TestDependencies {
        pub binder: Arc<RecordingBinder>,
        builder: TimelockProposalBuilder,
    }

    impl TestDependencies {
        pub fn new(binder: RecordingBinder) -> Self {
            Self {
                binder: Arc::new(binder),
                builder: TimelockProposalBuilder::at(UNIX_EPOCH + Duration::from_secs(TEST_NOW)),
            }
        }
    }

    impl Default for TestDependencies {
        fn default() -> Self {
            Self::new(RecordingBinder::new())
        }
    }

    impl Dependencies for TestDependencies {
        fn contract_binder(&self, _: &Environment) -> Arc<dyn ContractBinder> {
            self.binder.clone()
        }

        fn proposal_builder(&self) -> &dyn ProposalBuilder {
            &self.builder
        }
    }
}

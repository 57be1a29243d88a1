use {
    crate::{
        AccumulatedOutput, ChangesetError, ChangesetUnit, Dependencies, Environment,
        OrchestrationError, verify_all,
    },
    deployer_mcms::{
        GovernanceBatch, GovernanceSettings, McmsChainState, McmsError, TimelockProposal,
        aggregate, resolve,
    },
    deployer_shared::primitives::ChainSelector,
    std::collections::{BTreeMap, BTreeSet},
    tracing::{Instrument, info, info_span, warn},
};

/// The outcome of one run: the output accumulated so far, the proposal of a completed run and
/// the error that stopped it, if any.
#[must_use]
#[derive(Debug)]
pub struct OrchestrationResult {
    pub output: AccumulatedOutput,
    pub proposal: Option<TimelockProposal>,
    pub error: Option<OrchestrationError>,
}

impl OrchestrationResult {
    fn failed(output: AccumulatedOutput, error: OrchestrationError) -> Self {
        Self {
            output,
            proposal: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Splits the result, keeping the partial output next to the error of a failed run.
    #[allow(clippy::type_complexity)]
    pub fn into_result(
        self,
    ) -> Result<
        (AccumulatedOutput, Option<TimelockProposal>),
        (AccumulatedOutput, OrchestrationError),
    > {
        match self.error {
            None => Ok((self.output, self.proposal)),
            Some(error) => Err((self.output, error)),
        }
    }
}

/// Applies changeset units strictly one after another.
#[derive(Debug)]
pub struct Orchestrator<D> {
    governance: Option<GovernanceSettings>,
    dependencies: D,
}

impl<D: Dependencies> Orchestrator<D> {
    pub fn new(dependencies: D) -> Self {
        Self {
            governance: None,
            dependencies,
        }
    }

    /// Enables proposals for the governance batches of a run.
    pub fn with_governance(mut self, settings: GovernanceSettings) -> Self {
        self.governance = Some(settings);
        self
    }

    pub fn dependencies(&self) -> &D {
        &self.dependencies
    }

    /// Verifies every unit and then applies them in order.
    ///
    /// Each unit sees the environment as extended by the outputs of the units before it. The first
    /// failing unit stops the run. Its result keeps the outputs of the units before it and the
    /// reports the failing unit recorded before it failed, but no governance batches.
    pub async fn apply(&self, env: &Environment, units: &[ChangesetUnit]) -> OrchestrationResult {
        let span = info_span!("orchestrate", environment = env.name(), units = units.len());

        self.run(env, units).instrument(span).await
    }

    async fn run(&self, env: &Environment, units: &[ChangesetUnit]) -> OrchestrationResult {
        if let Err(error) = verify_all(env, units) {
            return OrchestrationResult::failed(AccumulatedOutput::new(), error);
        }

        let mut output = AccumulatedOutput::new();
        let mut current = env.clone();

        for (index, unit) in units.iter().enumerate() {
            let name = unit.name().to_owned();
            let unit_env = current.with_operations(current.operations().child());

            let applied = match unit_env.operations().ensure_active() {
                Ok(()) => {
                    unit.apply(&unit_env)
                        .instrument(info_span!("changeset", index, changeset = %name))
                        .await
                }
                Err(e) => Err(ChangesetError::from(e)),
            };
            let mut reports = unit_env.operations().reports();

            let mut next = match applied {
                Ok(next) => next,
                Err(source) => {
                    warn!(index, changeset = %name, error = %source, "Changeset failed");
                    output.reports.append(&mut reports);
                    output.governance_batches.clear();
                    return OrchestrationResult::failed(
                        output,
                        OrchestrationError::Apply {
                            index,
                            name,
                            source,
                        },
                    );
                }
            };

            reports.append(&mut next.reports);

            let merged = current
                .datastore()
                .merged(next.address_records.clone(), next.state_entries.clone())
                .and_then(|datastore| output.merge(next).map(|output| (datastore, output)));

            match merged {
                Ok((datastore, merged)) => {
                    info!(
                        index,
                        changeset = %name,
                        records = merged.addresses.len() - output.addresses.len(),
                        datastore_version = datastore.version,
                        "Applied changeset"
                    );
                    output = merged;
                    output.reports.append(&mut reports);
                    current = current.with_datastore(datastore);
                }
                Err(source) => {
                    warn!(index, changeset = %name, error = %source, "Changeset output conflicts");
                    output.reports.append(&mut reports);
                    output.governance_batches.clear();
                    return OrchestrationResult::failed(
                        output,
                        OrchestrationError::Merge {
                            index,
                            name,
                            source,
                        },
                    );
                }
            }
        }

        match self.propose(&current, &output.governance_batches).await {
            Ok(proposal) => OrchestrationResult {
                output,
                proposal,
                error: None,
            },
            Err(e) => OrchestrationResult::failed(output, OrchestrationError::Proposal(e)),
        }
    }

    async fn propose(
        &self,
        env: &Environment,
        batches: &[GovernanceBatch],
    ) -> Result<Option<TimelockProposal>, ChangesetError> {
        if batches.is_empty() {
            return Ok(None);
        }

        let Some(settings) = &self.governance else {
            return Err(ChangesetError::ProposalBuild(McmsError::InvalidConfig(
                "governance batches were produced but no governance settings were given".to_owned(),
            )));
        };

        let chains: BTreeSet<ChainSelector> = batches
            .iter()
            .map(|batch| batch.chain_selector)
            .chain(
                settings
                    .overrides
                    .keys()
                    .copied()
                    .filter(|chain| env.chains().contains(*chain)),
            )
            .collect();
        let loaded = chains
            .into_iter()
            .map(|chain| {
                McmsChainState::load(chain, env.addresses(), settings.qualifier.as_deref())
                    .map(|state| (chain, state))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let binder = self.dependencies.contract_binder(env);
        let resolved = resolve(loaded, &settings.overrides, binder.as_ref()).await?;

        Ok(aggregate(
            batches.to_vec(),
            &resolved,
            settings,
            env.inspectors(),
            self.dependencies.proposal_builder(),
        )
        .await?)
    }
}

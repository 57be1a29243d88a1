use {
    crate::{
        GovernanceBatch, GovernanceSettings, Inspectors, McmsChainState, McmsError, McmsRole,
        ProposalBuilder, ProposalRequest, Result, TimelockProposal,
    },
    deployer_shared::{iter::GroupIterator, primitives::ChainSelector},
    std::collections::BTreeMap,
    tracing::{Instrument, info, info_span},
};

/// Collapses the governance batches of a run into one proposal spanning every chain.
///
/// Batches are grouped to one per chain in the order chains first appear, keeping the order of
/// transactions within each chain. Returns `None` when there is nothing to propose.
pub async fn aggregate(
    batches: Vec<GovernanceBatch>,
    resolved: &BTreeMap<ChainSelector, McmsChainState>,
    settings: &GovernanceSettings,
    inspectors: &Inspectors,
    builder: &dyn ProposalBuilder,
) -> Result<Option<TimelockProposal>> {
    if batches.is_empty() {
        return Ok(None);
    }

    settings.timelock.validate()?;

    let batches: Vec<_> = batches
        .into_iter()
        .group_by(|batch| batch.chain_selector)
        .into_iter()
        .map(|(chain, batches)| {
            GovernanceBatch::new(
                chain,
                batches
                    .into_iter()
                    .flat_map(|batch| batch.transactions)
                    .collect(),
            )
        })
        .collect();

    let mut timelocks = BTreeMap::new();
    let mut mcms = BTreeMap::new();
    for batch in &batches {
        let chain = batch.chain_selector;
        let state = resolved.get(&chain).ok_or(McmsError::UnknownChain(chain))?;

        timelocks.insert(chain, state.require(McmsRole::Timelock)?.address);
        mcms.insert(chain, settings.timelock.mcm_for_action(state)?.address);
    }

    let span = info_span!("aggregate", chains = batches.len());
    let proposal = builder
        .build(ProposalRequest {
            timelocks,
            mcms,
            inspectors,
            batches,
            settings,
        })
        .instrument(span)
        .await?;

    info!(
        chains = proposal.operations.len(),
        action = ?proposal.action,
        "Aggregated governance batches into one proposal"
    );

    Ok(Some(proposal))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            ContractHandle, GovernanceTransaction, StaticInspector, TimelockAction,
            TimelockConfig, TimelockProposalBuilder,
        },
        deployer_shared::primitives::{Address, Bytes},
        std::{
            sync::Arc,
            time::{Duration, UNIX_EPOCH},
        },
    };

    const CHAINS: [ChainSelector; 3] = [ChainSelector(30), ChainSelector(10), ChainSelector(20)];

    fn mcm(chain: ChainSelector) -> Address {
        Address::with_last_byte(chain.get() as u8)
    }

    fn timelock(chain: ChainSelector) -> Address {
        Address::with_last_byte(chain.get() as u8 + 1)
    }

    fn resolved() -> BTreeMap<ChainSelector, McmsChainState> {
        CHAINS
            .into_iter()
            .map(|chain| {
                let state = McmsChainState::new(chain)
                    .with_role(
                        McmsRole::Timelock,
                        ContractHandle::new(timelock(chain), "RBACTimelock"),
                    )
                    .with_role(
                        McmsRole::Proposer,
                        ContractHandle::new(mcm(chain), "ProposerManyChainMultiSig"),
                    );
                (chain, state)
            })
            .collect()
    }

    fn inspectors() -> Inspectors {
        CHAINS
            .into_iter()
            .map(|chain| {
                let inspector: Arc<dyn crate::Inspector> =
                    Arc::new(StaticInspector::new(chain).with_op_count(mcm(chain), chain.get()));
                (chain, inspector)
            })
            .collect()
    }

    fn tx(tag: &str) -> GovernanceTransaction {
        GovernanceTransaction::new(Address::ZERO, Bytes::new(), "LinkToken").with_tag(tag)
    }

    fn settings() -> GovernanceSettings {
        GovernanceSettings::new(
            "Configure lanes",
            TimelockConfig {
                min_delay: Duration::from_secs(3600),
                ..Default::default()
            },
        )
    }

    fn builder() -> TimelockProposalBuilder {
        TimelockProposalBuilder::at(UNIX_EPOCH + Duration::from_secs(1_000))
    }

    fn tags(batch: &GovernanceBatch) -> Vec<&str> {
        batch
            .transactions
            .iter()
            .flat_map(|tx| tx.tags.iter().map(String::as_str))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_batches_yield_no_proposal() {
        let actual = aggregate(vec![], &resolved(), &settings(), &inspectors(), &builder())
            .await
            .unwrap();

        assert_eq!(actual, None);
    }

    #[tokio::test]
    async fn test_three_chains_collapse_into_one_proposal() {
        let batches = CHAINS
            .into_iter()
            .map(|chain| {
                GovernanceBatch::new(
                    chain,
                    vec![tx(&format!("{chain}-a")), tx(&format!("{chain}-b"))],
                )
            })
            .collect();

        let actual = aggregate(batches, &resolved(), &settings(), &inspectors(), &builder())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(actual.chains().collect::<Vec<_>>(), CHAINS.to_vec());
        assert_eq!(tags(&actual.operations[0]), vec!["30-a", "30-b"]);
        assert_eq!(tags(&actual.operations[1]), vec!["10-a", "10-b"]);
        assert_eq!(tags(&actual.operations[2]), vec!["20-a", "20-b"]);
        assert_eq!(actual.chain_metadata[&ChainSelector(20)].starting_op_count, 20);
        assert_eq!(actual.chain_metadata[&ChainSelector(20)].mcm_address, mcm(ChainSelector(20)));
        assert_eq!(actual.timelock_addresses[&ChainSelector(10)], timelock(ChainSelector(10)));
        assert_eq!(actual.valid_until, 1_000 + 72 * 3600);
        assert_eq!(actual.delay, Duration::from_secs(3600));
        assert_eq!(actual.action, TimelockAction::Schedule);
        assert_eq!(actual.description, "Configure lanes");
    }

    #[tokio::test]
    async fn test_batches_for_one_chain_are_concatenated_in_production_order() {
        let [first, second, _] = CHAINS;
        let batches = vec![
            GovernanceBatch::single(first, tx("1")),
            GovernanceBatch::single(second, tx("2")),
            GovernanceBatch::single(first, tx("3")),
        ];

        let actual = aggregate(batches, &resolved(), &settings(), &inspectors(), &builder())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(actual.operations.len(), 2);
        assert_eq!(tags(&actual.operations[0]), vec!["1", "3"]);
        assert_eq!(tags(&actual.operations[1]), vec!["2"]);
    }

    #[tokio::test]
    async fn test_unreachable_inspector_fails_the_build() {
        let mut inspectors = inspectors();
        inspectors.insert(CHAINS[1], Arc::new(StaticInspector::unreachable(CHAINS[1])));
        let batches = vec![GovernanceBatch::single(CHAINS[1], tx("1"))];

        let actual = aggregate(batches, &resolved(), &settings(), &inspectors, &builder())
            .await
            .unwrap_err();

        assert!(matches!(actual, McmsError::Inspector { chain, .. } if chain == CHAINS[1]));
    }

    #[tokio::test]
    async fn test_batch_for_chain_without_governance_state_is_unknown_chain() {
        let batches = vec![GovernanceBatch::single(ChainSelector(77), tx("1"))];

        let actual = aggregate(batches, &resolved(), &settings(), &inspectors(), &builder())
            .await
            .unwrap_err();

        assert_eq!(actual, McmsError::UnknownChain(ChainSelector(77)));
    }

    #[tokio::test]
    async fn test_bypass_action_requires_bypasser() {
        let mut settings = settings();
        settings.timelock.mcms_action = TimelockAction::Bypass;
        let batches = vec![GovernanceBatch::single(CHAINS[0], tx("1"))];

        let actual = aggregate(batches, &resolved(), &settings, &inspectors(), &builder())
            .await
            .unwrap_err();

        assert_eq!(
            actual,
            McmsError::MissingRole {
                chain: CHAINS[0],
                role: McmsRole::Bypasser
            }
        );
    }

    #[tokio::test]
    async fn test_valid_until_saturates_at_u32_max() {
        let far = UNIX_EPOCH + Duration::from_secs(u64::from(u32::MAX));
        let batches = vec![GovernanceBatch::single(CHAINS[0], tx("1"))];

        let actual = aggregate(
            batches,
            &resolved(),
            &settings(),
            &inspectors(),
            &TimelockProposalBuilder::at(far),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(actual.valid_until, u32::MAX);
    }
}

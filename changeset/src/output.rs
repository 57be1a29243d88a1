use {
    crate::ChangesetOutput,
    deployer_datastore::{AddressCatalog, MergeConflict, StateStore},
    deployer_mcms::GovernanceBatch,
    deployer_operations::Report,
};

/// The cumulative output of every unit applied so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccumulatedOutput {
    pub addresses: AddressCatalog,
    pub state: StateStore,
    /// Reports of every unit in chronological order.
    pub reports: Vec<Report>,
    pub governance_batches: Vec<GovernanceBatch>,
}

impl AccumulatedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
            && self.state.is_empty()
            && self.reports.is_empty()
            && self.governance_batches.is_empty()
    }

    /// See [`merge`].
    pub fn merge(&self, next: ChangesetOutput) -> Result<Self, MergeConflict> {
        merge(self, next)
    }
}

/// Produces a new accumulator holding `acc` followed by `next`.
///
/// Address records and state entries are unioned and any disagreement under an identical key
/// fails the merge. Reports and governance batches are concatenated without deduplication. `acc`
/// is left untouched.
pub fn merge(
    acc: &AccumulatedOutput,
    next: ChangesetOutput,
) -> Result<AccumulatedOutput, MergeConflict> {
    let ChangesetOutput {
        address_records,
        state_entries,
        reports,
        governance_batches,
    } = next;

    Ok(AccumulatedOutput {
        addresses: acc.addresses.merged(address_records)?,
        state: acc.state.merged(state_entries)?,
        reports: acc.reports.iter().cloned().chain(reports).collect(),
        governance_batches: acc
            .governance_batches
            .iter()
            .cloned()
            .chain(governance_batches)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        deployer_datastore::{AddressRecord, StateEntry},
        deployer_mcms::GovernanceTransaction,
        deployer_operations::{OperationDef, ReportOutcome},
        deployer_shared::primitives::{Address, Bytes, ChainSelector},
        semver::Version,
        serde_json::json,
        test_case::test_case,
    };

    const CHAIN: ChainSelector = ChainSelector(1);

    fn record(last_byte: u8, qualifier: &str) -> AddressRecord {
        AddressRecord::new(
            CHAIN,
            Address::with_last_byte(last_byte),
            "BurnMintTokenPool",
            Version::new(1, 5, 0),
        )
        .with_qualifier(qualifier)
    }

    fn report(name: &str) -> Report {
        Report::new(
            OperationDef::new(name, Version::new(1, 0, 0), ""),
            json!(null),
            ReportOutcome::Output(json!(null)),
        )
    }

    fn batch() -> GovernanceBatch {
        GovernanceBatch::single(
            CHAIN,
            GovernanceTransaction::new(Address::ZERO, Bytes::new(), "Router"),
        )
    }

    fn output(records: Vec<AddressRecord>) -> ChangesetOutput {
        ChangesetOutput::new().with_records(records)
    }

    #[test]
    fn test_merge_with_disjoint_keys_is_commutative() {
        let a = output(vec![record(1, "LINK"), record(2, "USDC")]);
        let b = output(vec![record(3, "WETH")]);
        let empty = AccumulatedOutput::new();

        let ab = merge(&merge(&empty, a.clone()).unwrap(), b.clone()).unwrap();
        let ba = merge(&merge(&empty, b).unwrap(), a).unwrap();

        assert_eq!(ab.addresses, ba.addresses);
        assert_eq!(ab.addresses.len(), 3);
    }

    #[test]
    fn test_merging_identical_record_twice_is_idempotent() {
        let acc = merge(&AccumulatedOutput::new(), output(vec![record(1, "LINK")])).unwrap();

        let actual = merge(&acc, output(vec![record(1, "LINK")])).unwrap();

        assert_eq!(actual.addresses, acc.addresses);
    }

    #[test_case(record(2, "LINK"); "different address")]
    #[test_case(AddressRecord::new(CHAIN, Address::with_last_byte(1), "LockReleaseTokenPool", Version::new(1, 5, 0)).with_qualifier("LINK"); "different type")]
    #[test_case(AddressRecord::new(CHAIN, Address::with_last_byte(1), "BurnMintTokenPool", Version::new(1, 6, 0)).with_qualifier("LINK"); "different version")]
    fn test_same_key_with_different_deployment_conflicts(incoming: AddressRecord) {
        let acc = merge(&AccumulatedOutput::new(), output(vec![record(1, "LINK")])).unwrap();

        let actual = merge(&acc, output(vec![incoming]));

        assert!(matches!(actual, Err(MergeConflict::AddressRecord { .. })));
        assert_eq!(acc.addresses.len(), 1);
    }

    #[test]
    fn test_conflicting_state_entries_fail_the_merge() {
        let entry = |address: u8| {
            StateEntry::new(
                CHAIN,
                "FeeQuoter",
                Address::with_last_byte(address),
                Version::new(1, 6, 0),
            )
        };
        let acc = merge(
            &AccumulatedOutput::new(),
            ChangesetOutput::new().with_entry(entry(1)),
        )
        .unwrap();

        let actual = merge(&acc, ChangesetOutput::new().with_entry(entry(2)));

        assert!(matches!(actual, Err(MergeConflict::StateEntry { .. })));
    }

    #[test]
    fn test_reports_and_batches_are_concatenated_in_order() {
        let first = ChangesetOutput {
            reports: vec![report("a")],
            governance_batches: vec![batch()],
            ..Default::default()
        };
        let second = ChangesetOutput {
            reports: vec![report("b"), report("c")],
            governance_batches: vec![batch()],
            ..Default::default()
        };

        let actual = merge(&merge(&AccumulatedOutput::new(), first).unwrap(), second).unwrap();

        let names: Vec<_> = actual.reports.iter().map(|r| r.def.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(actual.governance_batches, vec![batch(), batch()]);
    }
}

use {
    crate::{ContractHandle, McmsChainState, McmsError, McmsRole, PartialRoles, Result, time},
    deployer_shared::primitives::ChainSelector,
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, time::Duration},
};

/// How long a proposal stays signable unless configured otherwise.
pub const DEFAULT_VALID_FOR: Duration = time::hours(72);

/// What the timelock is asked to do with the proposed batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelockAction {
    #[default]
    Schedule,
    Cancel,
    Bypass,
}

impl TimelockAction {
    /// The multisig role entitled to submit this action.
    pub fn role(self) -> McmsRole {
        match self {
            Self::Schedule => McmsRole::Proposer,
            Self::Cancel => McmsRole::Canceller,
            Self::Bypass => McmsRole::Bypasser,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelockConfig {
    /// Delay the timelock enforces before a scheduled batch becomes executable.
    #[serde(with = "time::secs")]
    pub min_delay: Duration,
    #[serde(default)]
    pub mcms_action: TimelockAction,
    /// Replaces a pending root on the multisig instead of failing.
    #[serde(default)]
    pub override_root: bool,
    #[serde(default = "default_valid_for", with = "time::secs")]
    pub valid_for: Duration,
}

fn default_valid_for() -> Duration {
    DEFAULT_VALID_FOR
}

impl Default for TimelockConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::ZERO,
            mcms_action: TimelockAction::default(),
            override_root: false,
            valid_for: DEFAULT_VALID_FOR,
        }
    }
}

impl TimelockConfig {
    pub fn validate(&self) -> Result<()> {
        if self.valid_for.is_zero() {
            return Err(McmsError::InvalidConfig(
                "proposal validity window must not be zero".to_owned(),
            ));
        }
        Ok(())
    }

    /// The multisig that submits proposals for the configured action on `state`'s chain.
    pub fn mcm_for_action<'a>(&self, state: &'a McmsChainState) -> Result<&'a ContractHandle> {
        state.require(self.mcms_action.role())
    }
}

/// Everything a run needs to turn governance batches into a proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceSettings {
    pub description: String,
    #[serde(default)]
    pub timelock: TimelockConfig,
    /// Per-chain replacements of the roles loaded from the catalog.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<ChainSelector, PartialRoles>,
    /// Selects among several governance bundles recorded on one chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl GovernanceSettings {
    pub fn new(description: impl Into<String>, timelock: TimelockConfig) -> Self {
        Self {
            description: description.into(),
            timelock,
            overrides: BTreeMap::new(),
            qualifier: None,
        }
    }

    pub fn with_override(mut self, chain: ChainSelector, roles: PartialRoles) -> Self {
        self.overrides.insert(chain, roles);
        self
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        deployer_shared::primitives::{Address, address},
        serde_json::json,
        test_case::test_case,
    };

    const CHAIN: ChainSelector = ChainSelector(1);

    #[test]
    fn test_config_defaults_to_schedule_for_three_days() {
        let actual: TimelockConfig = serde_json::from_value(json!({"minDelay": 3600})).unwrap();

        assert_eq!(
            actual,
            TimelockConfig {
                min_delay: Duration::from_secs(3600),
                mcms_action: TimelockAction::Schedule,
                override_root: false,
                valid_for: Duration::from_secs(72 * 3600),
            }
        );
    }

    #[test]
    fn test_zero_validity_window_is_rejected() {
        let config = TimelockConfig {
            valid_for: Duration::ZERO,
            ..Default::default()
        };

        assert!(matches!(config.validate(), Err(McmsError::InvalidConfig(_))));
    }

    #[test_case(TimelockAction::Schedule, address!("00000000000000000000000000000000000000a2"); "schedule uses proposer")]
    #[test_case(TimelockAction::Cancel, address!("00000000000000000000000000000000000000a3"); "cancel uses canceller")]
    #[test_case(TimelockAction::Bypass, address!("00000000000000000000000000000000000000a4"); "bypass uses bypasser")]
    fn test_mcm_for_action(action: TimelockAction, expected: Address) {
        let state = McmsChainState::new(CHAIN)
            .with_role(
                McmsRole::Proposer,
                ContractHandle::new(address!("00000000000000000000000000000000000000a2"), "p"),
            )
            .with_role(
                McmsRole::Canceller,
                ContractHandle::new(address!("00000000000000000000000000000000000000a3"), "c"),
            )
            .with_role(
                McmsRole::Bypasser,
                ContractHandle::new(address!("00000000000000000000000000000000000000a4"), "b"),
            );
        let config = TimelockConfig {
            mcms_action: action,
            ..Default::default()
        };

        let actual = config.mcm_for_action(&state).unwrap().address;

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_settings_read_overrides_keyed_by_chain() {
        let actual: GovernanceSettings = serde_json::from_value(json!({
            "description": "Upgrade pools",
            "timelock": {"minDelay": 0, "mcmsAction": "bypass"},
            "overrides": {
                "1": {"bypasser": "0x00000000000000000000000000000000000000b4"}
            }
        }))
        .unwrap();

        assert_eq!(actual.timelock.mcms_action, TimelockAction::Bypass);
        assert_eq!(
            actual.overrides[&CHAIN].get(McmsRole::Bypasser),
            Some(address!("00000000000000000000000000000000000000b4"))
        );
    }
}

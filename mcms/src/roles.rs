use {
    crate::{McmsError, Result, contract_types::*},
    deployer_datastore::{AddressCatalog, AddressRecord, ContractType},
    deployer_shared::primitives::{Address, ChainSelector},
    serde::{Deserialize, Serialize},
    std::fmt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum McmsRole {
    Timelock,
    Proposer,
    Canceller,
    Bypasser,
    CallProxy,
}

impl McmsRole {
    pub const ALL: [Self; 5] = [
        Self::Timelock,
        Self::Proposer,
        Self::Canceller,
        Self::Bypasser,
        Self::CallProxy,
    ];

    /// The contract type recorded for a contract dedicated to this role.
    pub fn contract_type(self) -> &'static str {
        match self {
            Self::Timelock => RBAC_TIMELOCK,
            Self::Proposer => PROPOSER_MANY_CHAIN_MULTISIG,
            Self::Canceller => CANCELLER_MANY_CHAIN_MULTISIG,
            Self::Bypasser => BYPASSER_MANY_CHAIN_MULTISIG,
            Self::CallProxy => CALL_PROXY,
        }
    }

    /// The label that assigns a generic multisig to this role.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Proposer => Some(PROPOSER_LABEL),
            Self::Canceller => Some(CANCELLER_LABEL),
            Self::Bypasser => Some(BYPASSER_LABEL),
            Self::Timelock | Self::CallProxy => None,
        }
    }

    fn from_contract_type(contract_type: &ContractType) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.contract_type() == contract_type.as_str())
    }
}

impl fmt::Display for McmsRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timelock => "timelock",
            Self::Proposer => "proposer",
            Self::Canceller => "canceller",
            Self::Bypasser => "bypasser",
            Self::CallProxy => "call proxy",
        })
    }
}

/// A governance contract bound at a known address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractHandle {
    pub address: Address,
    pub contract_type: ContractType,
}

impl ContractHandle {
    pub fn new(address: Address, contract_type: impl Into<ContractType>) -> Self {
        Self {
            address,
            contract_type: contract_type.into(),
        }
    }
}

impl From<&AddressRecord> for ContractHandle {
    fn from(record: &AddressRecord) -> Self {
        Self::new(record.address, record.contract_type.clone())
    }
}

/// The governance contracts of one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McmsChainState {
    pub chain_selector: ChainSelector,
    pub timelock: Option<ContractHandle>,
    pub proposer: Option<ContractHandle>,
    pub canceller: Option<ContractHandle>,
    pub bypasser: Option<ContractHandle>,
    pub call_proxy: Option<ContractHandle>,
}

impl McmsChainState {
    pub fn new(chain_selector: ChainSelector) -> Self {
        Self {
            chain_selector,
            timelock: None,
            proposer: None,
            canceller: None,
            bypasser: None,
            call_proxy: None,
        }
    }

    pub fn with_role(mut self, role: McmsRole, handle: ContractHandle) -> Self {
        self.set_role(role, handle);
        self
    }

    pub fn role(&self, role: McmsRole) -> Option<&ContractHandle> {
        match role {
            McmsRole::Timelock => self.timelock.as_ref(),
            McmsRole::Proposer => self.proposer.as_ref(),
            McmsRole::Canceller => self.canceller.as_ref(),
            McmsRole::Bypasser => self.bypasser.as_ref(),
            McmsRole::CallProxy => self.call_proxy.as_ref(),
        }
    }

    pub fn set_role(&mut self, role: McmsRole, handle: ContractHandle) {
        let slot = match role {
            McmsRole::Timelock => &mut self.timelock,
            McmsRole::Proposer => &mut self.proposer,
            McmsRole::Canceller => &mut self.canceller,
            McmsRole::Bypasser => &mut self.bypasser,
            McmsRole::CallProxy => &mut self.call_proxy,
        };
        *slot = Some(handle);
    }

    /// Returns the contract of `role` or fails naming the chain and the missing role.
    pub fn require(&self, role: McmsRole) -> Result<&ContractHandle> {
        self.role(role).ok_or(McmsError::MissingRole {
            chain: self.chain_selector,
            role,
        })
    }

    /// Fails on the first role without a contract.
    pub fn validate(&self) -> Result<()> {
        McmsRole::ALL
            .into_iter()
            .try_for_each(|role| self.require(role).map(|_| ()))
    }

    /// Loads the governance contracts of a chain from the address catalog.
    ///
    /// Records of a role-specific contract type take precedence over generic multisig records
    /// labeled with the role. When `qualifier` is given, only records carrying it are considered.
    /// Roles without any record stay empty, see [`Self::validate`].
    pub fn load(
        chain_selector: ChainSelector,
        catalog: &AddressCatalog,
        qualifier: Option<&str>,
    ) -> Result<Self> {
        let mut state = Self::new(chain_selector);
        let mut generic = Self::new(chain_selector);
        let generic_type = ContractType::from(MANY_CHAIN_MULTISIG);

        let records = catalog.chain(chain_selector).filter(|record| {
            qualifier.is_none_or(|q| record.qualifier.as_deref() == Some(q))
        });

        for record in records {
            if let Some(role) = McmsRole::from_contract_type(&record.contract_type) {
                state.assign(role, record)?;
            } else if record.contract_type == generic_type {
                for role in McmsRole::ALL {
                    if role.label().is_some_and(|label| record.labels.contains(label)) {
                        generic.assign(role, record)?;
                    }
                }
            }
        }

        for role in McmsRole::ALL {
            if let (None, Some(handle)) = (state.role(role), generic.role(role)) {
                state.set_role(role, handle.clone());
            }
        }

        Ok(state)
    }

    fn assign(&mut self, role: McmsRole, record: &AddressRecord) -> Result<()> {
        match self.role(role) {
            Some(existing) if existing.address != record.address => Err(McmsError::DuplicateRole {
                chain: self.chain_selector,
                role,
                first: existing.address,
                second: record.address,
            }),
            Some(_) => Ok(()),
            None => {
                self.set_role(role, record.into());
                Ok(())
            }
        }
    }
}

/// Per-chain replacement addresses for governance roles.
///
/// A role counts as specified when it is present and not the zero address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRoles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timelock: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposer: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canceller: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypasser: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_proxy: Option<Address>,
}

impl PartialRoles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, role: McmsRole, address: Address) -> Self {
        let slot = match role {
            McmsRole::Timelock => &mut self.timelock,
            McmsRole::Proposer => &mut self.proposer,
            McmsRole::Canceller => &mut self.canceller,
            McmsRole::Bypasser => &mut self.bypasser,
            McmsRole::CallProxy => &mut self.call_proxy,
        };
        *slot = Some(address);
        self
    }

    pub fn get(&self, role: McmsRole) -> Option<Address> {
        let address = match role {
            McmsRole::Timelock => self.timelock,
            McmsRole::Proposer => self.proposer,
            McmsRole::Canceller => self.canceller,
            McmsRole::Bypasser => self.bypasser,
            McmsRole::CallProxy => self.call_proxy,
        };
        address.filter(|address| !address.is_zero())
    }

    /// Roles that replace the loaded contract, in declaration order.
    pub fn specified(&self) -> impl Iterator<Item = (McmsRole, Address)> + '_ {
        McmsRole::ALL
            .into_iter()
            .filter_map(|role| self.get(role).map(|address| (role, address)))
    }

    pub fn is_empty(&self) -> bool {
        self.specified().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        deployer_shared::primitives::address,
        semver::Version,
        test_case::test_case,
    };

    const CHAIN: ChainSelector = ChainSelector(3478487238524512106);
    const TIMELOCK: Address = address!("00000000000000000000000000000000000000a1");
    const PROPOSER: Address = address!("00000000000000000000000000000000000000a2");
    const CANCELLER: Address = address!("00000000000000000000000000000000000000a3");
    const BYPASSER: Address = address!("00000000000000000000000000000000000000a4");
    const CALL_PROXY_ADDR: Address = address!("00000000000000000000000000000000000000a5");
    const GENERIC: Address = address!("00000000000000000000000000000000000000b1");

    fn record(address: Address, contract_type: &str) -> AddressRecord {
        AddressRecord::new(CHAIN, address, contract_type, Version::new(1, 0, 0))
    }

    fn full_catalog() -> AddressCatalog {
        AddressCatalog::new()
            .merged([
                record(TIMELOCK, RBAC_TIMELOCK),
                record(PROPOSER, PROPOSER_MANY_CHAIN_MULTISIG),
                record(CANCELLER, CANCELLER_MANY_CHAIN_MULTISIG),
                record(BYPASSER, BYPASSER_MANY_CHAIN_MULTISIG),
                record(CALL_PROXY_ADDR, CALL_PROXY),
            ])
            .unwrap()
    }

    #[test]
    fn test_load_finds_every_role_by_contract_type() {
        let actual = McmsChainState::load(CHAIN, &full_catalog(), None).unwrap();

        assert!(actual.validate().is_ok());
        assert_eq!(actual.require(McmsRole::Canceller).unwrap().address, CANCELLER);
        assert_eq!(actual.require(McmsRole::CallProxy).unwrap().address, CALL_PROXY_ADDR);
    }

    #[test_case(McmsRole::Proposer, PROPOSER_LABEL; "proposer")]
    #[test_case(McmsRole::Canceller, CANCELLER_LABEL; "canceller")]
    #[test_case(McmsRole::Bypasser, BYPASSER_LABEL; "bypasser")]
    fn test_load_accepts_labeled_generic_multisig(role: McmsRole, label: &str) {
        let catalog = AddressCatalog::new()
            .merged([record(GENERIC, MANY_CHAIN_MULTISIG).with_label(label)])
            .unwrap();

        let actual = McmsChainState::load(CHAIN, &catalog, None).unwrap();

        assert_eq!(actual.role(role).map(|handle| handle.address), Some(GENERIC));
    }

    #[test]
    fn test_role_specific_record_wins_over_labeled_generic_one() {
        let catalog = full_catalog()
            .merged([record(GENERIC, MANY_CHAIN_MULTISIG).with_label(PROPOSER_LABEL)])
            .unwrap();

        let actual = McmsChainState::load(CHAIN, &catalog, None).unwrap();

        assert_eq!(actual.require(McmsRole::Proposer).unwrap().address, PROPOSER);
    }

    #[test]
    fn test_two_records_for_one_role_are_rejected() {
        let other = address!("00000000000000000000000000000000000000c1");
        let catalog = full_catalog()
            .merged([record(other, RBAC_TIMELOCK)])
            .unwrap();

        let actual = McmsChainState::load(CHAIN, &catalog, None).unwrap_err();

        assert_eq!(
            actual,
            McmsError::DuplicateRole {
                chain: CHAIN,
                role: McmsRole::Timelock,
                first: TIMELOCK,
                second: other,
            }
        );
    }

    #[test]
    fn test_qualifier_selects_one_governance_bundle() {
        let other = address!("00000000000000000000000000000000000000c1");
        let catalog = AddressCatalog::new()
            .merged([
                record(TIMELOCK, RBAC_TIMELOCK).with_qualifier("ops"),
                record(other, RBAC_TIMELOCK).with_qualifier("treasury"),
            ])
            .unwrap();

        let actual = McmsChainState::load(CHAIN, &catalog, Some("treasury")).unwrap();

        assert_eq!(actual.require(McmsRole::Timelock).unwrap().address, other);
    }

    #[test]
    fn test_validate_names_first_missing_role() {
        let state = McmsChainState::new(CHAIN)
            .with_role(McmsRole::Timelock, ContractHandle::new(TIMELOCK, RBAC_TIMELOCK));

        let actual = state.validate().unwrap_err();

        assert_eq!(
            actual,
            McmsError::MissingRole {
                chain: CHAIN,
                role: McmsRole::Proposer
            }
        );
    }

    #[test]
    fn test_zero_address_override_is_unspecified() {
        let roles = PartialRoles::new()
            .with(McmsRole::Bypasser, Address::ZERO)
            .with(McmsRole::Proposer, PROPOSER);

        let actual: Vec<_> = roles.specified().collect();

        assert_eq!(actual, vec![(McmsRole::Proposer, PROPOSER)]);
    }
}

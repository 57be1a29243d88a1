use {
    crate::MergeConflict,
    deployer_shared::primitives::{Address, ChainSelector},
    semver::Version,
    std::{
        collections::{BTreeMap, BTreeSet},
        fmt,
    },
};

/// The kind of a deployed contract, e.g. `RBACTimelock` or `LinkToken`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ContractType(pub String);

impl ContractType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContractType {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A set of free-form labels attached to a record, e.g. the governance role of a multisig.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: impl Into<String>) {
        self.0.insert(label.into());
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A record of a deployed contract instance on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    pub chain_selector: ChainSelector,
    pub address: Address,
    pub contract_type: ContractType,
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(default, skip_serializing_if = "LabelSet::is_empty")]
    pub labels: LabelSet,
}

impl AddressRecord {
    pub fn new(
        chain_selector: ChainSelector,
        address: Address,
        contract_type: impl Into<ContractType>,
        version: Version,
    ) -> Self {
        Self {
            chain_selector,
            address,
            contract_type: contract_type.into(),
            version,
            qualifier: None,
            labels: LabelSet::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.add(label);
        self
    }

    /// The uniqueness key of the record.
    ///
    /// A qualified record is unique per `(chain, qualifier)`, an unqualified one per
    /// `(chain, address)`.
    pub fn key(&self) -> AddressKey {
        AddressKey {
            chain_selector: self.chain_selector,
            ident: match &self.qualifier {
                Some(qualifier) => RecordIdent::Qualifier(qualifier.clone()),
                None => RecordIdent::Address(self.address),
            },
        }
    }

    /// Two records describe the same deployment when address, type and version agree.
    pub fn same_deployment(&self, other: &Self) -> bool {
        self.address == other.address
            && self.contract_type == other.contract_type
            && self.version == other.version
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {} on chain {}",
            self.contract_type, self.version, self.address, self.chain_selector
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordIdent {
    Qualifier(String),
    Address(Address),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressKey {
    pub chain_selector: ChainSelector,
    pub ident: RecordIdent,
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ident {
            RecordIdent::Qualifier(qualifier) => {
                write!(f, "chain {} qualifier {qualifier:?}", self.chain_selector)
            }
            RecordIdent::Address(address) => {
                write!(f, "chain {} address {address}", self.chain_selector)
            }
        }
    }
}

/// The collection of every known [`AddressRecord`].
///
/// The catalog is a value: merging produces a new catalog and leaves both inputs untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<AddressRecord>", into = "Vec<AddressRecord>")]
pub struct AddressCatalog {
    records: BTreeMap<AddressKey, AddressRecord>,
}

impl AddressCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &AddressKey) -> Option<&AddressRecord> {
        self.records.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddressRecord> {
        self.records.values()
    }

    pub fn chain(&self, chain_selector: ChainSelector) -> impl Iterator<Item = &AddressRecord> {
        self.records
            .values()
            .filter(move |record| record.chain_selector == chain_selector)
    }

    /// Finds every record of `contract_type` on a chain. When `qualifier` is given only records
    /// carrying exactly that qualifier match.
    pub fn find<'a>(
        &'a self,
        chain_selector: ChainSelector,
        contract_type: &'a ContractType,
        qualifier: Option<&'a str>,
    ) -> impl Iterator<Item = &'a AddressRecord> + 'a {
        self.chain(chain_selector).filter(move |record| {
            &record.contract_type == contract_type
                && qualifier.is_none_or(|q| record.qualifier.as_deref() == Some(q))
        })
    }

    /// Inserts a record, failing if a different deployment already occupies its key.
    ///
    /// Inserting a record that describes the same deployment as the occupant is a no-op apart
    /// from the labels, which are unioned.
    pub fn insert(&mut self, record: AddressRecord) -> Result<(), MergeConflict> {
        let key = record.key();

        match self.records.get_mut(&key) {
            Some(existing) if existing.same_deployment(&record) => {
                existing.labels = existing.labels.union(&record.labels);
                Ok(())
            }
            Some(existing) => Err(MergeConflict::AddressRecord {
                key,
                existing: Box::new(existing.clone()),
                incoming: Box::new(record),
            }),
            None => {
                self.records.insert(key, record);
                Ok(())
            }
        }
    }

    /// Produces a new catalog holding the union of `self` and `records`.
    pub fn merged(
        &self,
        records: impl IntoIterator<Item = AddressRecord>,
    ) -> Result<Self, MergeConflict> {
        let mut merged = self.clone();

        for record in records {
            merged.insert(record)?;
        }

        Ok(merged)
    }

    /// Produces a new catalog holding the union of both catalogs.
    pub fn merge(&self, other: &Self) -> Result<Self, MergeConflict> {
        self.merged(other.iter().cloned())
    }
}

impl TryFrom<Vec<AddressRecord>> for AddressCatalog {
    type Error = MergeConflict;

    fn try_from(value: Vec<AddressRecord>) -> Result<Self, Self::Error> {
        Self::new().merged(value)
    }
}

impl From<AddressCatalog> for Vec<AddressRecord> {
    fn from(value: AddressCatalog) -> Self {
        value.records.into_values().collect()
    }
}

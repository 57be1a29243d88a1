pub use alloy::primitives::{Address, B256, Bytes, TxHash, U256, address, keccak256};

use std::fmt;

/// A globally unique identifier of a chain.
///
/// Selectors are assigned independently of EVM chain IDs so that chains of different families
/// can be addressed uniformly.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct ChainSelector(pub u64);

impl ChainSelector {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ChainSelector {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ChainSelector> for u64 {
    fn from(value: ChainSelector) -> Self {
        value.0
    }
}

impl fmt::Display for ChainSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait ToSaturatedU32 {
    fn to_saturated_u32(self) -> u32;
}

impl ToSaturatedU32 for u64 {
    fn to_saturated_u32(self) -> u32 {
        u32::try_from(self).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    #[test_case(0, 0; "Zero")]
    #[test_case(4, 4; "Small")]
    #[test_case(u32::MAX as u64, u32::MAX; "Bound")]
    #[test_case(u32::MAX as u64 + 1, u32::MAX; "Above bound")]
    #[test_case(u64::MAX, u32::MAX; "Max")]
    fn test_converting_to_saturated_u32_saturates_at_numerical_bound(n: u64, expected: u32) {
        let actual = n.to_saturated_u32();

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_chain_selector_orders_by_value() {
        let mut selectors = vec![ChainSelector(3), ChainSelector(1), ChainSelector(2)];
        selectors.sort();

        assert_eq!(
            selectors,
            vec![ChainSelector(1), ChainSelector(2), ChainSelector(3)]
        );
        assert_eq!(ChainSelector::from(16015286601757825753).to_string(), "16015286601757825753");
    }
}

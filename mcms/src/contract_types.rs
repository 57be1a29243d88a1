//! Contract types and labels under which governance contracts are recorded in the catalog.

pub const RBAC_TIMELOCK: &str = "RBACTimelock";
pub const CALL_PROXY: &str = "CallProxy";
pub const PROPOSER_MANY_CHAIN_MULTISIG: &str = "ProposerManyChainMultiSig";
pub const CANCELLER_MANY_CHAIN_MULTISIG: &str = "CancellerManyChainMultiSig";
pub const BYPASSER_MANY_CHAIN_MULTISIG: &str = "BypasserManyChainMultiSig";

/// A multisig recorded without its role in the type. Its role is one of its labels.
pub const MANY_CHAIN_MULTISIG: &str = "ManyChainMultiSig";

pub const PROPOSER_LABEL: &str = "PROPOSER";
pub const CANCELLER_LABEL: &str = "CANCELLER";
pub const BYPASSER_LABEL: &str = "BYPASSER";

//! The operations module is responsible for executing chain work in auditable units:
//!
//! * An [`Operation`] is a single named, versioned unit of chain work.
//! * A [`Sequence`] composes operations, possibly across several chains.
//! * Every execution leaves an immutable [`Report`] in the [`Bundle`] it ran in.
//!
//! Reports double as a replay cache. A bundle seeded with the reports of a previous run returns
//! the recorded output of a successful operation instead of executing it again.

pub use {
    bundle::{Bundle, OperationsConfig},
    cancellation::Cancellation,
    error::{OperationError, Result},
    evm::{CallInput, CallOutput, ContractCall, DeployContract, DeployInput, DeployOutput},
    fan_out::fan_out,
    operation::{Operation, OperationReport, execute_operation},
    report::{OperationDef, Report, ReportId, ReportOutcome, Reporter},
    sequence::{Sequence, SequenceReport, execute_sequence},
};

mod bundle;
mod cancellation;
mod error;
mod evm;
mod fan_out;
mod operation;
mod report;
mod sequence;

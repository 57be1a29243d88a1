use {
    crate::{
        Bundle, OperationDef, Report, ReportOutcome, Result,
        operation::{encode, replay},
    },
    async_trait::async_trait,
    serde::{Serialize, de::DeserializeOwned},
    tracing::{Instrument, info_span, warn},
};

/// A named, versioned composition of operations.
///
/// The operations a sequence runs report into a child bundle. Once the sequence finishes, their
/// reports followed by the report of the sequence itself are appended to the parent bundle.
#[async_trait]
pub trait Sequence: Send + Sync {
    type Input: Serialize + Send + Sync;
    type Output: Serialize + DeserializeOwned + Send;
    type Deps: ?Sized + Send + Sync;

    fn def(&self) -> OperationDef;

    async fn run(
        &self,
        bundle: &Bundle,
        deps: &Self::Deps,
        input: Self::Input,
    ) -> Result<Self::Output>;
}

#[derive(Debug, Clone)]
pub struct SequenceReport<T> {
    pub report: Report,
    pub output: T,
    /// Reports of the operations the sequence ran, in execution order.
    pub execution_reports: Vec<Report>,
}

pub async fn execute_sequence<S: Sequence>(
    bundle: &Bundle,
    sequence: &S,
    deps: &S::Deps,
    input: S::Input,
) -> Result<SequenceReport<S::Output>> {
    let def = sequence.def();
    let input_json = encode(&def, &input)?;

    if let Some(replayed) = replay(bundle, &def, &input_json)? {
        return Ok(SequenceReport {
            report: replayed.report,
            output: replayed.output,
            execution_reports: Vec::new(),
        });
    }

    let child = bundle.child();
    let span = info_span!("sequence", name = %def.name, version = %def.version);
    let result = child
        .guard(sequence.run(&child, deps, input))
        .instrument(span)
        .await
        .and_then(std::convert::identity);

    let execution_reports = child.reports();
    for report in &execution_reports {
        bundle.reporter().record(report.clone());
    }

    let outcome = match &result {
        Ok(output) => ReportOutcome::Output(encode(&def, output)?),
        Err(e) => {
            warn!(name = %def.name, error = %e, "Sequence failed");
            ReportOutcome::Error(e.to_string())
        }
    };
    let report = Report::new(def, input_json, outcome)
        .with_children(execution_reports.iter().map(|report| report.id).collect());
    bundle.reporter().record(report.clone());

    result.map(|output| SequenceReport {
        report,
        output,
        execution_reports,
    })
}

use {
    crate::{Bundle, OperationDef, OperationError, Report, ReportOutcome, Result},
    async_trait::async_trait,
    serde::{Serialize, de::DeserializeOwned},
    tracing::{Instrument, debug, info_span, warn},
};

/// A single named, versioned unit of chain work.
///
/// The output must survive a trip through JSON so that a recorded report can stand in for a
/// repeated execution.
#[async_trait]
pub trait Operation: Send + Sync {
    type Input: Serialize + Send + Sync;
    type Output: Serialize + DeserializeOwned + Send;
    type Deps: ?Sized + Send + Sync;

    fn def(&self) -> OperationDef;

    async fn execute(
        &self,
        bundle: &Bundle,
        deps: &Self::Deps,
        input: Self::Input,
    ) -> Result<Self::Output>;
}

/// The typed output of an execution together with the report it left behind.
#[derive(Debug, Clone)]
pub struct OperationReport<T> {
    pub report: Report,
    pub output: T,
}

/// Runs `operation` under the constraints of `bundle` and records its report there.
///
/// A successful report of the same execution found among the previous reports of the bundle is
/// replayed without touching any chain.
pub async fn execute_operation<O: Operation>(
    bundle: &Bundle,
    operation: &O,
    deps: &O::Deps,
    input: O::Input,
) -> Result<OperationReport<O::Output>> {
    let def = operation.def();
    let input_json = encode(&def, &input)?;

    if let Some(replayed) = replay(bundle, &def, &input_json)? {
        return Ok(replayed);
    }

    let span = info_span!("operation", name = %def.name, version = %def.version);
    let result = bundle
        .guard(operation.execute(bundle, deps, input))
        .instrument(span)
        .await
        .and_then(std::convert::identity);

    let outcome = match &result {
        Ok(output) => ReportOutcome::Output(encode(&def, output)?),
        Err(e) => {
            warn!(name = %def.name, error = %e, "Operation failed");
            ReportOutcome::Error(e.to_string())
        }
    };
    let report = Report::new(def, input_json, outcome);
    bundle.reporter().record(report.clone());

    result.map(|output| OperationReport { report, output })
}

pub(crate) fn encode<T: Serialize + ?Sized>(
    def: &OperationDef,
    value: &T,
) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|source| OperationError::Codec {
        name: def.name.clone(),
        source,
    })
}

/// Looks up a successful previous execution and records it again in the current run.
pub(crate) fn replay<T: DeserializeOwned>(
    bundle: &Bundle,
    def: &OperationDef,
    input: &serde_json::Value,
) -> Result<Option<OperationReport<T>>> {
    let id = Report::id_for(def, input);
    let Some(report) = bundle.previous(&id) else {
        return Ok(None);
    };
    let Some(output) = report.output() else {
        return Ok(None);
    };

    let output = T::deserialize(output).map_err(|source| OperationError::Codec {
        name: def.name.clone(),
        source,
    })?;
    debug!(name = %def.name, %id, "Reusing previous report");
    bundle.reporter().record(report.clone());

    Ok(Some(OperationReport {
        report: report.clone(),
        output,
    }))
}

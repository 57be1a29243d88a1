use {
    deployer_shared::primitives::{B256, keccak256},
    semver::Version,
    serde::{Deserialize, Serialize},
    std::{
        collections::HashMap,
        sync::{Arc, Mutex, MutexGuard, PoisonError},
    },
};

/// Deterministic identity of one execution: the hash of the definition and input.
pub type ReportId = B256;

/// Names a unit of work. Two executions with equal definitions and inputs are the same execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDef {
    pub name: String,
    pub version: Version,
    pub description: String,
}

impl OperationDef {
    pub fn new(name: impl Into<String>, version: Version, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportOutcome {
    Output(serde_json::Value),
    Error(String),
}

/// The immutable record of one operation or sequence execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub def: OperationDef,
    pub input: serde_json::Value,
    pub outcome: ReportOutcome,
    /// Reports of the operations a sequence ran, empty for a plain operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ReportId>,
}

impl Report {
    pub fn id_for(def: &OperationDef, input: &serde_json::Value) -> ReportId {
        #[derive(Serialize)]
        struct Identity<'a> {
            name: &'a str,
            version: &'a Version,
            input: &'a serde_json::Value,
        }

        // Serializing borrowed strings and JSON values cannot fail.
        let encoded = serde_json::to_vec(&Identity {
            name: &def.name,
            version: &def.version,
            input,
        })
        .unwrap_or_default();

        keccak256(encoded)
    }

    pub fn new(def: OperationDef, input: serde_json::Value, outcome: ReportOutcome) -> Self {
        Self {
            id: Self::id_for(&def, &input),
            def,
            input,
            outcome,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ReportId>) -> Self {
        self.children = children;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ReportOutcome::Output(_))
    }

    pub fn output(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            ReportOutcome::Output(output) => Some(output),
            ReportOutcome::Error(_) => None,
        }
    }
}

/// An append-only log of reports shared by every clone.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, report: Report) {
        self.lock().push(report);
    }

    pub fn reports(&self) -> Vec<Report> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Report>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Successful reports of a previous run, looked up by id.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReportCache {
    reports: Arc<HashMap<ReportId, Report>>,
}

impl ReportCache {
    pub fn new(reports: impl IntoIterator<Item = Report>) -> Self {
        let reports = reports
            .into_iter()
            .filter(Report::is_success)
            .map(|report| (report.id, report))
            .collect();

        Self {
            reports: Arc::new(reports),
        }
    }

    pub fn get(&self, id: &ReportId) -> Option<&Report> {
        self.reports.get(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.reports.len()
    }
}

use {
    crate::{
        Cancellation, OperationError, Report, ReportId, Reporter, Result, report::ReportCache,
    },
    serde::{Deserialize, Serialize},
    std::time::Duration,
    tokio::time::Instant,
};

/// Settings for executing operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsConfig {
    /// Upper bound on the wall-clock time of a whole run, unbounded when absent.
    #[serde(default, with = "optional_secs", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

/// The execution context of operations: where reports go, which previous reports may be reused
/// and when work must stop.
///
/// Clones share the reporter. [`Bundle::child`] shares everything except the reporter.
#[derive(Debug, Clone)]
pub struct Bundle {
    reporter: Reporter,
    previous: ReportCache,
    cancellation: Cancellation,
    deadline: Option<Instant>,
}

impl Default for Bundle {
    fn default() -> Self {
        Self::new(&OperationsConfig::default())
    }
}

impl Bundle {
    pub fn new(config: &OperationsConfig) -> Self {
        Self {
            reporter: Reporter::new(),
            previous: ReportCache::default(),
            cancellation: Cancellation::new(),
            deadline: config.timeout.map(|timeout| Instant::now() + timeout),
        }
    }

    /// Seeds the bundle with the reports of a previous run. Their successful entries are replayed
    /// instead of executed again.
    pub fn with_previous_reports(mut self, reports: impl IntoIterator<Item = Report>) -> Self {
        self.previous = ReportCache::new(reports);
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// A bundle with a fresh reporter that otherwise runs under the same constraints.
    pub fn child(&self) -> Self {
        Self {
            reporter: Reporter::new(),
            ..self.clone()
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reporter.reports()
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) fn previous(&self, id: &ReportId) -> Option<&Report> {
        self.previous.get(id)
    }

    /// Fails when the bundle may no longer start work.
    pub fn ensure_active(&self) -> Result<()> {
        if self.cancellation.is_cancelled() {
            return Err(OperationError::Cancelled);
        }

        if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
            return Err(OperationError::DeadlineExceeded);
        }

        Ok(())
    }

    /// Drives `work` to completion unless cancellation or the deadline comes first.
    pub async fn guard<F: Future>(&self, work: F) -> Result<F::Output> {
        self.ensure_active()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.listener() => Err(OperationError::Cancelled),
            _ = deadline => Err(OperationError::DeadlineExceeded),
            output = work => Ok(output),
        }
    }
}

mod optional_secs {
    use {
        serde::{Deserialize, Deserializer, Serializer},
        std::time::Duration,
    };

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => s.serialize_some(&duration.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[tokio::test]
    async fn test_guard_returns_output_of_finished_work() {
        let bundle = Bundle::default();

        let actual = bundle.guard(async { 7 }).await.unwrap();

        assert_eq!(actual, 7);
    }

    #[tokio::test]
    async fn test_guard_fails_fast_when_cancelled() {
        let bundle = Bundle::default();
        bundle.cancellation().cancel();

        let actual = bundle.guard(std::future::pending::<()>()).await;

        assert!(matches!(actual, Err(OperationError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_stops_pending_work_at_deadline() {
        let bundle = Bundle::new(&OperationsConfig {
            timeout: Some(Duration::from_secs(30)),
        });

        let actual = bundle.guard(std::future::pending::<()>()).await;

        assert!(matches!(actual, Err(OperationError::DeadlineExceeded)));
    }

    #[test]
    fn test_child_shares_cancellation_but_not_reports() {
        let bundle = Bundle::default();
        let child = bundle.child();

        bundle.cancellation().cancel();
        child.reporter().record(Report::new(
            crate::OperationDef::new("noop", semver::Version::new(1, 0, 0), ""),
            json!(null),
            crate::ReportOutcome::Output(json!(null)),
        ));

        assert!(child.ensure_active().is_err());
        assert!(bundle.reports().is_empty());
    }

    #[test]
    fn test_config_reads_timeout_in_seconds() {
        let actual: OperationsConfig = serde_json::from_value(json!({"timeout": 90})).unwrap();

        assert_eq!(actual.timeout, Some(Duration::from_secs(90)));
    }
}

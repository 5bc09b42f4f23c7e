//! Suite orchestration.
//!
//! Drives every case of a suite through the execute-case use case and the
//! check runner, then aggregates a report. Cases are independent, so the
//! runner may execute them serially in declared order or concurrently on
//! the tokio runtime; results always come back in declared order.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;
use tokio::task::JoinSet;
use url::Url;

use apiprobe_application::{ExecuteCase, HttpClient};
use apiprobe_domain::{CaseResult, Suite, SuiteReport, TestCase};

use crate::checks::CheckRunner;

/// Execution mode for a suite run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Run cases one at a time, in declared order.
    #[default]
    Serial,
    /// Run every case concurrently.
    Parallel,
}

/// Errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum RunError {
    /// The suite (or override) base URL is not a valid URL.
    #[error("invalid base URL '{url}': {message}")]
    InvalidBaseUrl {
        /// The offending URL text.
        url: String,
        /// Parser message.
        message: String,
    },
}

/// Runs whole suites and aggregates reports.
pub struct SuiteRunner<C: HttpClient> {
    execute: ExecuteCase<C>,
    checks: CheckRunner,
    mode: RunMode,
    stop_on_failure: bool,
}

impl<C: HttpClient + 'static> SuiteRunner<C> {
    /// Creates a serial runner over the given HTTP client.
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self {
            execute: ExecuteCase::new(client),
            checks: CheckRunner::new(),
            mode: RunMode::Serial,
            stop_on_failure: false,
        }
    }

    /// Sets the execution mode (builder pattern).
    #[must_use]
    pub const fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Stops a serial run after the first failing case (builder pattern).
    ///
    /// Ignored in parallel mode, where no case is "first".
    #[must_use]
    pub const fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Runs the suite and aggregates a report.
    ///
    /// `base_override` replaces the suite's own base URL when given.
    ///
    /// # Errors
    ///
    /// Returns `RunError` when the effective base URL does not parse.
    /// Transport failures never surface here; they are recorded on the
    /// failing case's result.
    pub async fn run(
        &self,
        suite: &Suite,
        base_override: Option<Url>,
    ) -> Result<SuiteReport, RunError> {
        let base = match base_override {
            Some(url) => url,
            None => Url::parse(&suite.base_url).map_err(|e| RunError::InvalidBaseUrl {
                url: suite.base_url.clone(),
                message: e.to_string(),
            })?,
        };

        tracing::info!(suite = %suite.name, cases = suite.len(), mode = ?self.mode, "starting run");
        let started_at = Utc::now();
        let start = Instant::now();

        let results = match self.mode {
            RunMode::Serial => self.run_serial(suite, &base).await,
            RunMode::Parallel => self.run_parallel(suite, &base).await,
        };

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        let report = SuiteReport::new(&suite.name, started_at, results, duration_ms);
        tracing::info!(
            passed = report.passed,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "run finished"
        );
        Ok(report)
    }

    async fn run_serial(&self, suite: &Suite, base: &Url) -> Vec<CaseResult> {
        let stop = self.stop_on_failure || suite.stop_on_failure;
        let mut results = Vec::with_capacity(suite.len());

        for case in &suite.cases {
            let result =
                run_case(self.execute.clone(), self.checks, case.clone(), base.clone()).await;
            let failed = !result.passed();
            results.push(result);
            if failed && stop {
                tracing::warn!("stopping after first failing case");
                break;
            }
        }

        results
    }

    async fn run_parallel(&self, suite: &Suite, base: &Url) -> Vec<CaseResult> {
        let mut set = JoinSet::new();
        for (index, case) in suite.cases.iter().enumerate() {
            let execute = self.execute.clone();
            let checks = self.checks;
            let case = case.clone();
            let base = base.clone();
            set.spawn(async move { (index, run_case(execute, checks, case, base).await) });
        }

        let mut slots: Vec<Option<CaseResult>> = vec![None; suite.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => tracing::error!("case task failed: {e}"),
            }
        }

        // Reassemble in declared order; a crashed task leaves a hole we
        // report as a failed case rather than dropping it.
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    CaseResult::transport_error(&suite.cases[index].name, "case task aborted", 0)
                })
            })
            .collect()
    }
}

/// Executes one case and evaluates its assertions.
///
/// Transport failures become the case's recorded error; they never abort
/// the surrounding run.
async fn run_case<C: HttpClient>(
    execute: ExecuteCase<C>,
    checks: CheckRunner,
    case: TestCase,
    base: Url,
) -> CaseResult {
    tracing::debug!(case = %case.name, method = %case.method, url = %case.url, "dispatching");
    let start = Instant::now();

    let outcome = execute.execute(&case, &base).await;

    #[allow(clippy::cast_possible_truncation)]
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(snapshot) => {
            let outcomes = checks.run(&case, &snapshot);
            CaseResult::completed(&case.name, outcomes, duration_ms)
        }
        Err(e) => {
            tracing::debug!(case = %case.name, error = %e, "transport failure");
            CaseResult::transport_error(&case.name, e.to_string(), duration_ms)
        }
    }
}

//! Run results and aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assertion::Assertion;

/// Result of evaluating a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionOutcome {
    /// The assertion that was evaluated.
    pub assertion: Assertion,
    /// Whether the assertion held.
    pub passed: bool,
    /// Actual value observed, when one was available.
    pub actual: Option<String>,
    /// Failure message with actual vs. expected.
    pub error: Option<String>,
}

impl AssertionOutcome {
    /// A passing outcome.
    #[must_use]
    pub const fn pass(assertion: Assertion) -> Self {
        Self {
            assertion,
            passed: true,
            actual: None,
            error: None,
        }
    }

    /// A passing outcome recording the observed value.
    #[must_use]
    pub fn pass_with_value(assertion: Assertion, actual: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: true,
            actual: Some(actual.into()),
            error: None,
        }
    }

    /// A failing outcome.
    #[must_use]
    pub fn fail(assertion: Assertion, error: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: false,
            actual: None,
            error: Some(error.into()),
        }
    }

    /// A failing outcome recording the observed value.
    #[must_use]
    pub fn fail_with_value(
        assertion: Assertion,
        actual: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            assertion,
            passed: false,
            actual: Some(actual.into()),
            error: Some(error.into()),
        }
    }
}

/// Result of running one test case.
///
/// A case either completed (the request returned and its assertions were
/// evaluated) or failed in transport (network error, timeout) before any
/// snapshot existed. Both count as failures for the suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    /// Name of the case.
    pub case_name: String,
    /// Assertion outcomes, in declared order. Empty on transport failure.
    pub outcomes: Vec<AssertionOutcome>,
    /// Transport error that prevented a snapshot, if any.
    pub error: Option<String>,
    /// Wall time for the case in milliseconds.
    pub duration_ms: u64,
}

impl CaseResult {
    /// A case whose request completed and whose assertions were evaluated.
    #[must_use]
    pub fn completed(
        case_name: impl Into<String>,
        outcomes: Vec<AssertionOutcome>,
        duration_ms: u64,
    ) -> Self {
        Self {
            case_name: case_name.into(),
            outcomes,
            error: None,
            duration_ms,
        }
    }

    /// A case whose request never completed.
    #[must_use]
    pub fn transport_error(
        case_name: impl Into<String>,
        error: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            case_name: case_name.into(),
            outcomes: Vec::new(),
            error: Some(error.into()),
            duration_ms,
        }
    }

    /// Whether the case passed overall.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.outcomes.iter().all(|o| o.passed)
    }

    /// The failing outcomes, in declared order.
    pub fn failures(&self) -> impl Iterator<Item = &AssertionOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }
}

/// Aggregated results from running a whole suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Name of the suite that ran.
    pub suite_name: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Per-case results, in declared order.
    pub results: Vec<CaseResult>,
    /// Total number of cases.
    pub total: usize,
    /// Number of passing cases.
    pub passed: usize,
    /// Number of failing cases.
    pub failed: usize,
    /// Wall time for the run in milliseconds.
    pub duration_ms: u64,
}

impl SuiteReport {
    /// Aggregates case results into a report.
    #[must_use]
    pub fn new(
        suite_name: impl Into<String>,
        started_at: DateTime<Utc>,
        results: Vec<CaseResult>,
        duration_ms: u64,
    ) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed()).count();
        let failed = total - passed;

        Self {
            suite_name: suite_name.into(),
            started_at,
            results,
            total,
            passed,
            failed,
            duration_ms,
        }
    }

    /// Whether every case passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn status_assertion() -> Assertion {
        Assertion::JsonPath {
            path: "$.id".to_string(),
            expected: Some(serde_json::json!(1)),
        }
    }

    #[test]
    fn case_passes_when_all_outcomes_pass() {
        let result = CaseResult::completed(
            "fetch user",
            vec![
                AssertionOutcome::pass(status_assertion()),
                AssertionOutcome::pass_with_value(status_assertion(), "1"),
            ],
            12,
        );
        assert!(result.passed());
        assert_eq!(result.failures().count(), 0);
    }

    #[test]
    fn case_fails_on_failed_outcome() {
        let result = CaseResult::completed(
            "fetch user",
            vec![AssertionOutcome::fail_with_value(
                status_assertion(),
                "2",
                "expected 1, got 2",
            )],
            12,
        );
        assert!(!result.passed());
        assert_eq!(result.failures().count(), 1);
    }

    #[test]
    fn transport_error_fails_the_case() {
        let result = CaseResult::transport_error("delete post", "connection refused", 5);
        assert!(!result.passed());
        assert!(result.outcomes.is_empty());
    }

    #[test]
    fn report_counts_cases() {
        let results = vec![
            CaseResult::completed("a", vec![AssertionOutcome::pass(status_assertion())], 3),
            CaseResult::transport_error("b", "timeout", 30_000),
        ];
        let report = SuiteReport::new("smoke", Utc::now(), results, 30_010);

        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.all_passed());
    }
}

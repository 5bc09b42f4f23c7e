//! Test case and suite definitions.
//!
//! A test case is fully self-contained: it carries its own request data
//! (method, URL, optional JSON body) and declares its own expected outcome
//! (status expectation plus an ordered list of assertions). Cases never
//! share fixtures or feed results into each other, so a suite may run them
//! in any order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assertion::{Assertion, StatusExpectation};
use crate::method::HttpMethod;

/// Default per-case timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// One declarative request/assert unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    /// Display name of the case.
    pub name: String,
    /// HTTP method to issue.
    #[serde(default)]
    pub method: HttpMethod,
    /// Absolute URL, or a path resolved against the suite base URL.
    pub url: String,
    /// Optional JSON request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Expected response status.
    #[serde(default)]
    pub expect_status: StatusExpectation,
    /// Assertions evaluated in declared order against the snapshot.
    #[serde(default)]
    pub assertions: Vec<Assertion>,
    /// Per-case timeout; a case exceeding it fails alone.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl TestCase {
    /// Creates a case with the given name, method, and URL.
    #[must_use]
    pub fn new(name: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            url: url.into(),
            body: None,
            expect_status: StatusExpectation::default(),
            assertions: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Convenience constructor for a GET case.
    #[must_use]
    pub fn get(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Get, url)
    }

    /// Sets the JSON request body (builder pattern).
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the expected status (builder pattern).
    #[must_use]
    pub fn with_status(mut self, expected: StatusExpectation) -> Self {
        self.expect_status = expected;
        self
    }

    /// Appends an assertion (builder pattern).
    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Sets the per-case timeout (builder pattern).
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// A named list of independent test cases sharing a base URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    /// Unique identifier.
    #[serde(default = "generate_id")]
    pub id: Uuid,
    /// Suite name.
    pub name: String,
    /// Base URL relative case paths are resolved against.
    pub base_url: String,
    /// Whether a serial run stops after the first failing case.
    #[serde(default)]
    pub stop_on_failure: bool,
    /// The cases to run.
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

fn generate_id() -> Uuid {
    Uuid::now_v7()
}

impl Suite {
    /// Creates an empty suite with the given name and base URL.
    #[must_use]
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            base_url: base_url.into(),
            stop_on_failure: false,
            cases: Vec::new(),
        }
    }

    /// Appends a case (builder pattern).
    #[must_use]
    pub fn with_case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    /// Returns whether the suite has no cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Returns the number of cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::assertion::ComparisonOperator;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_accumulates_assertions() {
        let case = TestCase::get("fetch user", "/users/1")
            .with_status(StatusExpectation::exact(200))
            .with_assertion(Assertion::JsonPath {
                path: "$.id".to_string(),
                expected: Some(serde_json::json!(1)),
            })
            .with_assertion(Assertion::IsJson);

        assert_eq!(case.method, HttpMethod::Get);
        assert_eq!(case.assertions.len(), 2);
        assert_eq!(case.timeout_ms, 30_000);
    }

    #[test]
    fn builder_sets_body_and_timeout() {
        let case = TestCase::new("create post", HttpMethod::Post, "/posts")
            .with_body(serde_json::json!({"title": "Test Post", "userId": 1}))
            .with_status(StatusExpectation::exact(201))
            .with_timeout_ms(5_000);

        assert_eq!(case.body.unwrap()["title"], serde_json::json!("Test Post"));
        assert_eq!(case.timeout_ms, 5_000);
    }

    #[test]
    fn suite_builder() {
        let suite = Suite::new("smoke", "https://example.com")
            .with_case(TestCase::get("a", "/a"))
            .with_case(TestCase::get("b", "/b"));

        assert_eq!(suite.len(), 2);
        assert!(!suite.is_empty());
        assert!(!suite.stop_on_failure);
    }

    #[test]
    fn case_deserializes_with_defaults() {
        let case: TestCase = serde_json::from_str(
            r#"{
                "name": "delete post",
                "method": "DELETE",
                "url": "/posts/1",
                "expect_status": 200
            }"#,
        )
        .unwrap();

        assert_eq!(case.method, HttpMethod::Delete);
        assert_eq!(case.expect_status, StatusExpectation::Exact(200));
        assert!(case.assertions.is_empty());
        assert!(case.body.is_none());
        assert_eq!(case.timeout_ms, 30_000);
    }

    #[test]
    fn suite_deserializes_from_file_syntax() {
        let suite: Suite = serde_json::from_str(
            r#"{
                "name": "posts",
                "base_url": "https://jsonplaceholder.typicode.com",
                "cases": [
                    {
                        "name": "posts by user",
                        "url": "/posts?userId=1",
                        "expect_status": 200,
                        "assertions": [
                            {"type": "json_length", "path": "$", "operator": "greater_than", "length": 0}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(suite.len(), 1);
        let case = &suite.cases[0];
        assert_eq!(case.method, HttpMethod::Get);
        assert_eq!(
            case.assertions[0],
            Assertion::JsonLength {
                path: "$".to_string(),
                operator: ComparisonOperator::GreaterThan,
                length: 0,
            }
        );
    }
}

//! Declarative assertions over a response snapshot.
//!
//! An assertion pairs a field of the response (status, header, body, or a
//! JSON path into the parsed body) with an expected value or predicate.

use serde::{Deserialize, Serialize};

/// A single declarative check to evaluate against a response snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assertion {
    /// Check the response status code.
    ///
    /// Suites normally use the case-level `expect_status` field; the check
    /// runner synthesizes this variant from it so status failures report
    /// like any other outcome.
    Status {
        /// Expected status code or range.
        expected: StatusExpectation,
    },
    /// Check a header exists and optionally equals a value.
    HeaderExists {
        /// Header name (case-insensitive).
        name: String,
        /// Optional expected value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    /// Check the Content-Type header contains a substring.
    ContentType {
        /// Expected content type fragment (e.g. "application/json").
        expected: String,
    },
    /// Check the body parses as JSON.
    IsJson,
    /// Check the body text contains a substring.
    BodyContains {
        /// Text to search for.
        text: String,
        /// Case-insensitive search.
        #[serde(default)]
        ignore_case: bool,
    },
    /// Check the body text matches a regex pattern.
    BodyMatches {
        /// Regex pattern.
        pattern: String,
    },
    /// Check the response arrived within a time budget.
    ResponseTime {
        /// Maximum allowed time in milliseconds.
        max_ms: u64,
    },
    /// Check a JSON path exists and optionally equals a value.
    JsonPath {
        /// Path into the parsed body (e.g. "$.user.id").
        path: String,
        /// Expected value; `None` asserts existence only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected: Option<serde_json::Value>,
    },
    /// Check a JSON path value against a comparison.
    JsonPathMatches {
        /// Path into the parsed body.
        path: String,
        /// Comparison operator.
        operator: ComparisonOperator,
        /// Value to compare against.
        value: serde_json::Value,
    },
    /// Check every value projected by a `[*]` path against a comparison.
    JsonPathAll {
        /// Path with a projection (e.g. "$[*].userId").
        path: String,
        /// Comparison operator applied to each projected value.
        operator: ComparisonOperator,
        /// Value each projected element is compared against.
        value: serde_json::Value,
    },
    /// Check the length of a JSON array, object, or string at a path.
    JsonLength {
        /// Path into the parsed body ("$" for the whole body).
        path: String,
        /// Comparison operator.
        operator: ComparisonOperator,
        /// Length to compare against.
        length: usize,
    },
}

impl Assertion {
    /// Returns a human-readable description of this assertion.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Status { expected } => format!("status {}", expected.description()),
            Self::HeaderExists {
                name,
                value: Some(v),
            } => format!("header '{name}' equals '{v}'"),
            Self::HeaderExists { name, value: None } => format!("header '{name}' exists"),
            Self::ContentType { expected } => format!("content type contains '{expected}'"),
            Self::IsJson => "body is valid JSON".to_string(),
            Self::BodyContains { text, .. } => format!("body contains '{text}'"),
            Self::BodyMatches { pattern } => format!("body matches /{pattern}/"),
            Self::ResponseTime { max_ms } => format!("response time <= {max_ms}ms"),
            Self::JsonPath {
                path,
                expected: Some(v),
            } => format!("{path} equals {v}"),
            Self::JsonPath {
                path,
                expected: None,
            } => format!("{path} exists"),
            Self::JsonPathMatches {
                path,
                operator,
                value,
            } => format!("{path} {} {value}", operator.symbol()),
            Self::JsonPathAll {
                path,
                operator,
                value,
            } => format!("every {path} {} {value}", operator.symbol()),
            Self::JsonLength {
                path,
                operator,
                length,
            } => format!("length of {path} {} {length}", operator.symbol()),
        }
    }
}

/// Expected status code value or range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// Inclusive range of status codes.
    Range {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
    /// One of multiple status codes.
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    /// Checks whether a status code satisfies this expectation.
    #[must_use]
    pub fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::Range { min, max } => status >= *min && status <= *max,
            Self::OneOf(codes) => codes.contains(&status),
        }
    }

    /// Returns a description of the expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Exact(code) => format!("= {code}"),
            Self::Range { min, max } => format!("in {min}-{max}"),
            Self::OneOf(codes) => {
                let codes_str: Vec<_> = codes.iter().map(ToString::to_string).collect();
                format!("in [{}]", codes_str.join(", "))
            }
        }
    }

    /// Any 2xx status.
    #[must_use]
    pub const fn success() -> Self {
        Self::Range { min: 200, max: 299 }
    }

    /// Exactly the given status.
    #[must_use]
    pub const fn exact(code: u16) -> Self {
        Self::Exact(code)
    }
}

impl Default for StatusExpectation {
    fn default() -> Self {
        Self::success()
    }
}

/// Comparison operators for value assertions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// Equal to.
    Equals,
    /// Not equal to.
    NotEquals,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal to.
    GreaterThanOrEqual,
    /// Less than.
    LessThan,
    /// Less than or equal to.
    LessThanOrEqual,
    /// Contains (for strings and arrays).
    Contains,
    /// Matches regex pattern (for strings).
    Matches,
}

impl ComparisonOperator {
    /// Returns the symbol for this operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Contains => "contains",
            Self::Matches => "matches",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exact_status() {
        let exp = StatusExpectation::exact(201);
        assert!(exp.matches(201));
        assert!(!exp.matches(200));
    }

    #[test]
    fn status_range() {
        let exp = StatusExpectation::success();
        assert!(exp.matches(200));
        assert!(exp.matches(299));
        assert!(!exp.matches(199));
        assert!(!exp.matches(300));
    }

    #[test]
    fn status_one_of() {
        let exp = StatusExpectation::OneOf(vec![200, 204]);
        assert!(exp.matches(204));
        assert!(!exp.matches(201));
    }

    #[test]
    fn exact_status_deserializes_from_bare_integer() {
        let exp: StatusExpectation = serde_json::from_str("201").unwrap();
        assert_eq!(exp, StatusExpectation::Exact(201));
    }

    #[test]
    fn descriptions() {
        let assertion = Assertion::JsonPath {
            path: "$.id".to_string(),
            expected: Some(serde_json::json!(1)),
        };
        assert_eq!(assertion.description(), "$.id equals 1");

        let assertion = Assertion::ContentType {
            expected: "application/json".to_string(),
        };
        assert_eq!(
            assertion.description(),
            "content type contains 'application/json'"
        );

        let assertion = Assertion::JsonPathAll {
            path: "$[*].userId".to_string(),
            operator: ComparisonOperator::Equals,
            value: serde_json::json!(1),
        };
        assert_eq!(assertion.description(), "every $[*].userId == 1");
    }

    #[test]
    fn assertion_serde_round_trip() {
        let assertion = Assertion::JsonLength {
            path: "$".to_string(),
            operator: ComparisonOperator::GreaterThan,
            length: 0,
        };
        let json = serde_json::to_string(&assertion).unwrap();
        assert!(json.contains("\"type\":\"json_length\""));
        let back: Assertion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, assertion);
    }

    #[test]
    fn assertion_deserializes_from_suite_syntax() {
        let assertion: Assertion = serde_json::from_str(
            r#"{"type": "json_path", "path": "$.email"}"#,
        )
        .unwrap();
        assert_eq!(
            assertion,
            Assertion::JsonPath {
                path: "$.email".to_string(),
                expected: None,
            }
        );
    }
}

//! Check runner implementation.
//!
//! Evaluates the status expectation and every assertion of a test case
//! against a response snapshot, in declared order. A body that fails to
//! parse as JSON when a JSON assertion needs it produces a failed outcome,
//! never a panic.

use regex::Regex;

use apiprobe_domain::{
    Assertion, AssertionOutcome, ComparisonOperator, ResponseSnapshot, StatusExpectation, TestCase,
};

/// Evaluates case assertions against response snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct CheckRunner {
    /// Whether to stop after the first failing outcome.
    stop_on_failure: bool,
}

impl CheckRunner {
    /// Creates a check runner.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stop_on_failure: false,
        }
    }

    /// Sets whether evaluation stops at the first failure.
    #[must_use]
    pub const fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Evaluates the case's status expectation and assertions in order.
    ///
    /// The status expectation is synthesized into a `Status` assertion and
    /// always evaluated first.
    #[must_use]
    pub fn run(&self, case: &TestCase, snapshot: &ResponseSnapshot) -> Vec<AssertionOutcome> {
        let mut outcomes = Vec::with_capacity(case.assertions.len() + 1);

        let status = Assertion::Status {
            expected: case.expect_status.clone(),
        };
        let outcome = self.check(&status, snapshot);
        let failed = !outcome.passed;
        outcomes.push(outcome);
        if failed && self.stop_on_failure {
            return outcomes;
        }

        for assertion in &case.assertions {
            let outcome = self.check(assertion, snapshot);
            let failed = !outcome.passed;
            outcomes.push(outcome);
            if failed && self.stop_on_failure {
                break;
            }
        }

        outcomes
    }

    /// Evaluates a single assertion against a snapshot.
    #[must_use]
    pub fn check(&self, assertion: &Assertion, snapshot: &ResponseSnapshot) -> AssertionOutcome {
        match assertion {
            Assertion::Status { expected } => check_status(assertion, snapshot, expected),
            Assertion::HeaderExists { name, value } => {
                check_header(assertion, snapshot, name, value.as_deref())
            }
            Assertion::ContentType { expected } => check_content_type(assertion, snapshot, expected),
            Assertion::IsJson => check_is_json(assertion, snapshot),
            Assertion::BodyContains { text, ignore_case } => {
                check_body_contains(assertion, snapshot, text, *ignore_case)
            }
            Assertion::BodyMatches { pattern } => check_body_matches(assertion, snapshot, pattern),
            Assertion::ResponseTime { max_ms } => check_response_time(assertion, snapshot, *max_ms),
            Assertion::JsonPath { path, expected } => {
                check_json_path(assertion, snapshot, path, expected.as_ref())
            }
            Assertion::JsonPathMatches {
                path,
                operator,
                value,
            } => check_json_compare(assertion, snapshot, path, *operator, value, Quantifier::Single),
            Assertion::JsonPathAll {
                path,
                operator,
                value,
            } => check_json_compare(assertion, snapshot, path, *operator, value, Quantifier::Every),
            Assertion::JsonLength {
                path,
                operator,
                length,
            } => check_json_length(assertion, snapshot, path, *operator, *length),
        }
    }
}

/// How a comparison applies to the queried value.
#[derive(Clone, Copy)]
enum Quantifier {
    /// Compare the value itself.
    Single,
    /// Compare every element of the (projected) array.
    Every,
}

fn check_status(
    assertion: &Assertion,
    snapshot: &ResponseSnapshot,
    expected: &StatusExpectation,
) -> AssertionOutcome {
    let actual = snapshot.status;
    if expected.matches(actual) {
        AssertionOutcome::pass_with_value(assertion.clone(), actual.to_string())
    } else {
        AssertionOutcome::fail_with_value(
            assertion.clone(),
            actual.to_string(),
            format!("expected status {}, got {actual}", expected.description()),
        )
    }
}

fn check_header(
    assertion: &Assertion,
    snapshot: &ResponseSnapshot,
    name: &str,
    expected_value: Option<&str>,
) -> AssertionOutcome {
    let Some(actual) = snapshot.get_header(name) else {
        return AssertionOutcome::fail(assertion.clone(), format!("header '{name}' not present"));
    };

    match expected_value {
        Some(expected) if actual != expected => AssertionOutcome::fail_with_value(
            assertion.clone(),
            actual.clone(),
            format!("header '{name}': expected '{expected}', got '{actual}'"),
        ),
        _ => AssertionOutcome::pass_with_value(assertion.clone(), actual.clone()),
    }
}

fn check_content_type(
    assertion: &Assertion,
    snapshot: &ResponseSnapshot,
    expected: &str,
) -> AssertionOutcome {
    match &snapshot.content_type {
        Some(actual) if actual.contains(expected) => {
            AssertionOutcome::pass_with_value(assertion.clone(), actual.clone())
        }
        Some(actual) => AssertionOutcome::fail_with_value(
            assertion.clone(),
            actual.clone(),
            format!("content type '{actual}' does not contain '{expected}'"),
        ),
        None => AssertionOutcome::fail(assertion.clone(), "no Content-Type header present"),
    }
}

fn check_is_json(assertion: &Assertion, snapshot: &ResponseSnapshot) -> AssertionOutcome {
    match serde_json::from_str::<serde_json::Value>(&snapshot.body) {
        Ok(_) => AssertionOutcome::pass(assertion.clone()),
        Err(e) => AssertionOutcome::fail(assertion.clone(), format!("body is not valid JSON: {e}")),
    }
}

fn check_body_contains(
    assertion: &Assertion,
    snapshot: &ResponseSnapshot,
    text: &str,
    ignore_case: bool,
) -> AssertionOutcome {
    let contains = if ignore_case {
        snapshot.body.to_lowercase().contains(&text.to_lowercase())
    } else {
        snapshot.body.contains(text)
    };

    if contains {
        AssertionOutcome::pass(assertion.clone())
    } else {
        AssertionOutcome::fail_with_value(
            assertion.clone(),
            body_preview(&snapshot.body),
            format!("body does not contain '{text}'"),
        )
    }
}

fn check_body_matches(
    assertion: &Assertion,
    snapshot: &ResponseSnapshot,
    pattern: &str,
) -> AssertionOutcome {
    match Regex::new(pattern) {
        Ok(regex) if regex.is_match(&snapshot.body) => AssertionOutcome::pass(assertion.clone()),
        Ok(_) => AssertionOutcome::fail_with_value(
            assertion.clone(),
            body_preview(&snapshot.body),
            format!("body does not match /{pattern}/"),
        ),
        Err(e) => {
            AssertionOutcome::fail(assertion.clone(), format!("invalid pattern /{pattern}/: {e}"))
        }
    }
}

fn check_response_time(
    assertion: &Assertion,
    snapshot: &ResponseSnapshot,
    max_ms: u64,
) -> AssertionOutcome {
    #[allow(clippy::cast_possible_truncation)]
    let actual_ms = snapshot.duration.as_millis() as u64;
    if actual_ms <= max_ms {
        AssertionOutcome::pass_with_value(assertion.clone(), format!("{actual_ms}ms"))
    } else {
        AssertionOutcome::fail_with_value(
            assertion.clone(),
            format!("{actual_ms}ms"),
            format!("response took {actual_ms}ms, expected <= {max_ms}ms"),
        )
    }
}

fn check_json_path(
    assertion: &Assertion,
    snapshot: &ResponseSnapshot,
    path: &str,
    expected: Option<&serde_json::Value>,
) -> AssertionOutcome {
    let json = match parse_body(snapshot) {
        Ok(json) => json,
        Err(message) => return AssertionOutcome::fail(assertion.clone(), message),
    };

    match query_path(&json, path) {
        Ok(Some(value)) => match expected {
            Some(expected) if &value != expected => AssertionOutcome::fail_with_value(
                assertion.clone(),
                value.to_string(),
                format!("{path}: expected {expected}, got {value}"),
            ),
            _ => AssertionOutcome::pass_with_value(assertion.clone(), value.to_string()),
        },
        Ok(None) => AssertionOutcome::fail(assertion.clone(), format!("{path} not found")),
        Err(e) => AssertionOutcome::fail(assertion.clone(), format!("invalid path '{path}': {e}")),
    }
}

fn check_json_compare(
    assertion: &Assertion,
    snapshot: &ResponseSnapshot,
    path: &str,
    operator: ComparisonOperator,
    expected: &serde_json::Value,
    quantifier: Quantifier,
) -> AssertionOutcome {
    let json = match parse_body(snapshot) {
        Ok(json) => json,
        Err(message) => return AssertionOutcome::fail(assertion.clone(), message),
    };

    let value = match query_path(&json, path) {
        Ok(Some(value)) => value,
        Ok(None) => {
            return AssertionOutcome::fail(assertion.clone(), format!("{path} not found"));
        }
        Err(e) => {
            return AssertionOutcome::fail(
                assertion.clone(),
                format!("invalid path '{path}': {e}"),
            );
        }
    };

    match quantifier {
        Quantifier::Single => {
            if compare_values(&value, operator, expected) {
                AssertionOutcome::pass_with_value(assertion.clone(), value.to_string())
            } else {
                AssertionOutcome::fail_with_value(
                    assertion.clone(),
                    value.to_string(),
                    format!("{path}: {value} {} {expected} does not hold", operator.symbol()),
                )
            }
        }
        Quantifier::Every => {
            // A projection always yields an array; a scalar is treated as a
            // one-element projection.
            let elements = match &value {
                serde_json::Value::Array(items) => items.as_slice(),
                other => std::slice::from_ref(other),
            };
            let violation = elements
                .iter()
                .find(|element| !compare_values(element, operator, expected));
            violation.map_or_else(
                || AssertionOutcome::pass_with_value(assertion.clone(), value.to_string()),
                |bad| {
                    AssertionOutcome::fail_with_value(
                        assertion.clone(),
                        bad.to_string(),
                        format!(
                            "{path}: element {bad} violates {} {expected}",
                            operator.symbol()
                        ),
                    )
                },
            )
        }
    }
}

fn check_json_length(
    assertion: &Assertion,
    snapshot: &ResponseSnapshot,
    path: &str,
    operator: ComparisonOperator,
    expected: usize,
) -> AssertionOutcome {
    let json = match parse_body(snapshot) {
        Ok(json) => json,
        Err(message) => return AssertionOutcome::fail(assertion.clone(), message),
    };

    let value = match query_path(&json, path) {
        Ok(Some(value)) => value,
        Ok(None) => {
            return AssertionOutcome::fail(assertion.clone(), format!("{path} not found"));
        }
        Err(e) => {
            return AssertionOutcome::fail(
                assertion.clone(),
                format!("invalid path '{path}': {e}"),
            );
        }
    };

    let Some(actual) = value_length(&value) else {
        return AssertionOutcome::fail(
            assertion.clone(),
            format!("{path} is not an array, object, or string"),
        );
    };

    let holds = match operator {
        ComparisonOperator::Equals => actual == expected,
        ComparisonOperator::NotEquals => actual != expected,
        ComparisonOperator::GreaterThan => actual > expected,
        ComparisonOperator::GreaterThanOrEqual => actual >= expected,
        ComparisonOperator::LessThan => actual < expected,
        ComparisonOperator::LessThanOrEqual => actual <= expected,
        ComparisonOperator::Contains | ComparisonOperator::Matches => false,
    };

    if holds {
        AssertionOutcome::pass_with_value(assertion.clone(), actual.to_string())
    } else {
        AssertionOutcome::fail_with_value(
            assertion.clone(),
            actual.to_string(),
            format!(
                "length of {path} is {actual}, expected {} {expected}",
                operator.symbol()
            ),
        )
    }
}

/// Parses the snapshot body as JSON, with the parse error as the message.
fn parse_body(snapshot: &ResponseSnapshot) -> Result<serde_json::Value, String> {
    serde_json::from_str(&snapshot.body).map_err(|e| format!("body is not valid JSON: {e}"))
}

/// Length of a JSON value, where one is defined.
fn value_length(value: &serde_json::Value) -> Option<usize> {
    match value {
        serde_json::Value::Array(items) => Some(items.len()),
        serde_json::Value::Object(map) => Some(map.len()),
        serde_json::Value::String(s) => Some(s.chars().count()),
        _ => None,
    }
}

/// Queries a JSON value with a dotted path.
///
/// Supports `$`, `$.field.nested`, `$.array[0]`, and `[*]` projection: the
/// remaining path is mapped across the array's elements and the matches are
/// collected into an array (elements missing the path are dropped).
fn query_path(json: &serde_json::Value, path: &str) -> Result<Option<serde_json::Value>, String> {
    let path = path.trim();
    let Some(rest) = path.strip_prefix('$') else {
        return Err("path must start with '$'".to_string());
    };

    let rest = rest.strip_prefix('.').unwrap_or(rest);
    if rest.is_empty() {
        return Ok(Some(json.clone()));
    }

    let segments = split_segments(rest);
    walk(json, &segments)
}

fn walk(
    current: &serde_json::Value,
    segments: &[String],
) -> Result<Option<serde_json::Value>, String> {
    let Some(segment) = segments.first() else {
        return Ok(Some(current.clone()));
    };
    let rest = &segments[1..];

    if let Some((name, index)) = parse_array_access(segment) {
        let target = if name.is_empty() {
            current
        } else {
            match current.get(name) {
                Some(v) => v,
                None => return Ok(None),
            }
        };

        if index == "*" {
            let Some(items) = target.as_array() else {
                return Ok(None);
            };
            let mut projected = Vec::new();
            for item in items {
                if let Some(value) = walk(item, rest)? {
                    projected.push(value);
                }
            }
            return Ok(Some(serde_json::Value::Array(projected)));
        }

        let idx: usize = index
            .parse()
            .map_err(|_| format!("invalid array index: {index}"))?;
        match target.get(idx) {
            Some(v) => walk(v, rest),
            None => Ok(None),
        }
    } else {
        match current.get(segment) {
            Some(v) => walk(v, rest),
            None => Ok(None),
        }
    }
}

/// Splits a dotted path into segments, keeping bracket expressions intact.
fn split_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_bracket = false;

    for ch in path.chars() {
        match ch {
            '.' if !in_bracket => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                in_bracket = true;
                current.push(ch);
            }
            ']' => {
                in_bracket = false;
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Parses `field[0]` into `("field", "0")`; bare `[*]` yields an empty name.
fn parse_array_access(segment: &str) -> Option<(&str, &str)> {
    let bracket = segment.find('[')?;
    if !segment.ends_with(']') {
        return None;
    }
    Some((&segment[..bracket], &segment[bracket + 1..segment.len() - 1]))
}

/// Compares two JSON values under an operator.
fn compare_values(
    actual: &serde_json::Value,
    operator: ComparisonOperator,
    expected: &serde_json::Value,
) -> bool {
    use serde_json::Value;

    match operator {
        ComparisonOperator::Equals => actual == expected,
        ComparisonOperator::NotEquals => actual != expected,
        ComparisonOperator::GreaterThan => compare_numeric(actual, expected, |a, b| a > b),
        ComparisonOperator::GreaterThanOrEqual => compare_numeric(actual, expected, |a, b| a >= b),
        ComparisonOperator::LessThan => compare_numeric(actual, expected, |a, b| a < b),
        ComparisonOperator::LessThanOrEqual => compare_numeric(actual, expected, |a, b| a <= b),
        ComparisonOperator::Contains => match (actual, expected) {
            (Value::String(s), Value::String(needle)) => s.contains(needle.as_str()),
            (Value::Array(items), _) => items.contains(expected),
            _ => false,
        },
        ComparisonOperator::Matches => {
            if let (Value::String(s), Value::String(pattern)) = (actual, expected) {
                Regex::new(pattern).is_ok_and(|re| re.is_match(s))
            } else {
                false
            }
        }
    }
}

fn compare_numeric<F>(actual: &serde_json::Value, expected: &serde_json::Value, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn body_preview(body: &str) -> String {
    if body.len() > 100 {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i <= 100)
            .last()
            .map_or(0, |(i, _)| i);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

//! Console rendering of a suite report.

use std::fmt::Write as _;

use apiprobe_domain::{CaseResult, SuiteReport};

/// Renders a report as plain text: one line per case, failing assertion
/// detail indented beneath it, and a closing summary line.
#[must_use]
pub fn render_report(report: &SuiteReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "suite {} ({} cases, started {})",
        report.suite_name,
        report.total,
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for result in &report.results {
        render_case(&mut out, result);
    }

    let _ = writeln!(
        out,
        "{} cases: {} passed, {} failed in {}",
        report.total,
        report.passed,
        report.failed,
        format_millis(report.duration_ms)
    );

    out
}

fn render_case(out: &mut String, result: &CaseResult) {
    let verdict = if result.passed() { "PASS" } else { "FAIL" };
    let _ = writeln!(
        out,
        "  {verdict} {} ({})",
        result.case_name,
        format_millis(result.duration_ms)
    );

    if let Some(error) = &result.error {
        let _ = writeln!(out, "       {error}");
        return;
    }

    for failure in result.failures() {
        let detail = failure
            .error
            .as_deref()
            .unwrap_or("assertion failed");
        let _ = writeln!(out, "       {}: {detail}", failure.assertion.description());
    }
}

fn format_millis(millis: u64) -> String {
    if millis < 1000 {
        format!("{millis} ms")
    } else {
        #[allow(clippy::cast_precision_loss)]
        let secs = millis as f64 / 1000.0;
        format!("{secs:.2} s")
    }
}

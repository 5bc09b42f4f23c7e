//! Apiprobe command-line entry point.
//!
//! `apiprobe run <suite>` loads a suite file, executes every case against
//! the live service, prints the report, and exits 0 only when every case
//! passed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use apiprobe_infrastructure::{
    ReqwestHttpClient, RunMode, SuiteRunner, load_suite, render_report,
};

/// Environment variable overriding the suite base URL.
const BASE_URL_ENV: &str = "APIPROBE_BASE_URL";

#[derive(Debug, Parser)]
#[command(name = "apiprobe", version, about = "Declarative HTTP API check runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute a suite file.
    Run {
        /// Path to a `.json`, `.yaml`, or `.yml` suite file.
        suite: PathBuf,

        /// Override the suite's base URL (also: APIPROBE_BASE_URL).
        #[arg(long)]
        base_url: Option<Url>,

        /// Run cases concurrently instead of in declared order.
        #[arg(long)]
        parallel: bool,

        /// Stop a serial run after the first failing case.
        #[arg(long)]
        stop_on_failure: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Runs the selected command; `Ok(true)` means every case passed.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let Command::Run {
        suite,
        base_url,
        parallel,
        stop_on_failure,
    } = cli.command;

    let suite = load_suite(&suite)?;
    tracing::debug!(suite = %suite.name, cases = suite.len(), "suite loaded");
    let base_override = resolve_base_override(base_url)?;

    let client = Arc::new(ReqwestHttpClient::new().context("failed to build HTTP client")?);
    let mode = if parallel {
        RunMode::Parallel
    } else {
        RunMode::Serial
    };
    let runner = SuiteRunner::new(client)
        .with_mode(mode)
        .with_stop_on_failure(stop_on_failure);

    let report = runner.run(&suite, base_override).await?;
    print!("{}", render_report(&report));

    Ok(report.all_passed())
}

/// The `--base-url` flag wins over the environment variable.
fn resolve_base_override(flag: Option<Url>) -> anyhow::Result<Option<Url>> {
    if flag.is_some() {
        return Ok(flag);
    }
    match std::env::var(BASE_URL_ENV) {
        Ok(raw) => Url::parse(&raw)
            .map(Some)
            .with_context(|| format!("invalid {BASE_URL_ENV}: {raw}")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_run_command() {
        let cli = Cli::parse_from([
            "apiprobe",
            "run",
            "suites/jsonplaceholder.json",
            "--parallel",
        ]);
        let Command::Run {
            suite,
            base_url,
            parallel,
            stop_on_failure,
        } = cli.command;

        assert_eq!(suite, PathBuf::from("suites/jsonplaceholder.json"));
        assert!(base_url.is_none());
        assert!(parallel);
        assert!(!stop_on_failure);
    }

    #[test]
    fn parses_base_url_flag() {
        let cli = Cli::parse_from([
            "apiprobe",
            "run",
            "suite.json",
            "--base-url",
            "https://staging.example.com",
        ]);
        let Command::Run { base_url, .. } = cli.command;
        assert_eq!(
            base_url.unwrap().as_str(),
            "https://staging.example.com/"
        );
    }

    #[test]
    fn flag_wins_over_environment() {
        let flag = Some(Url::parse("https://flag.example.com").unwrap());
        let resolved = resolve_base_override(flag.clone()).unwrap();
        assert_eq!(resolved, flag);
    }
}

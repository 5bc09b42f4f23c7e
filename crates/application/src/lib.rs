//! Apiprobe Application - Use cases and ports
//!
//! This crate orchestrates case execution. The `HttpClient` port keeps it
//! independent of any concrete HTTP library; adapters live in the
//! infrastructure crate.

pub mod ports;
pub mod use_cases;

pub use ports::{HttpClient, HttpClientError, ProbeRequest};
pub use use_cases::{ExecuteCase, ExecuteCaseError, ExecuteOutcome};

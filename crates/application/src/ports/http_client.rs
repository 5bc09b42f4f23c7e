//! HTTP client port.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use apiprobe_domain::{HttpMethod, ResponseSnapshot};

/// A fully resolved request, ready for dispatch.
///
/// Produced by [`crate::ExecuteCase`] from a test case and the suite base
/// URL; the adapter needs no knowledge of suites or relative paths.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: Url,
    /// Optional JSON body.
    pub body: Option<serde_json::Value>,
    /// Timeout for the whole request.
    pub timeout: Duration,
}

/// Errors from the HTTP transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpClientError {
    /// The request did not complete within the timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The host could not be resolved.
    #[error("could not resolve host '{host}': {message}")]
    DnsError {
        /// Hostname that failed to resolve.
        host: String,
        /// Underlying resolver message.
        message: String,
    },

    /// The host actively refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request body could not be serialized.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The redirect limit was exceeded.
    #[error("exceeded {max} redirects")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// The future is boxed so the trait stays dyn-compatible; adapters clone
/// what they need out of the borrowed request before suspending.
pub trait HttpClient: Send + Sync {
    /// Executes one request and captures the response.
    ///
    /// Exactly one attempt is made; retries are never performed.
    fn execute(
        &self,
        request: &ProbeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ResponseSnapshot, HttpClientError>> + Send + '_>>;
}

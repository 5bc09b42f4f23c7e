//! Execute-case use case.
//!
//! Resolves a test case's URL against the suite base, validates it, and
//! dispatches the request through the `HttpClient` port. The snapshot it
//! returns is what assertions are evaluated against.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use apiprobe_domain::{ResponseSnapshot, TestCase};

use crate::ports::{HttpClient, HttpClientError, ProbeRequest};

/// Result type for case execution.
pub type ExecuteOutcome = Result<ResponseSnapshot, ExecuteCaseError>;

/// Errors from resolving or dispatching a case.
#[derive(Debug, Clone, Error)]
pub enum ExecuteCaseError {
    /// The case URL is empty.
    #[error("case URL is required")]
    EmptyUrl,

    /// The case URL could not be resolved to a valid http(s) URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The transport failed.
    #[error("{0}")]
    Http(#[from] HttpClientError),
}

/// Use case for executing a single test case.
///
/// The client is shared behind an `Arc` so concurrent case runs reuse one
/// connection pool.
pub struct ExecuteCase<C: HttpClient> {
    client: Arc<C>,
}

impl<C: HttpClient> Clone for ExecuteCase<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: HttpClient> ExecuteCase<C> {
    /// Creates the use case with the given HTTP client.
    pub const fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Executes the case and captures a response snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ExecuteCaseError` when the URL is invalid or the transport
    /// fails. Assertion evaluation is not part of this use case.
    pub async fn execute(&self, case: &TestCase, base_url: &Url) -> ExecuteOutcome {
        let request = resolve(case, base_url)?;
        Ok(self.client.execute(&request).await?)
    }
}

/// Resolves a case into a dispatchable request.
///
/// An absolute `http(s)://` case URL is used as-is; anything else is joined
/// onto the suite base URL (query strings survive the join).
fn resolve(case: &TestCase, base_url: &Url) -> Result<ProbeRequest, ExecuteCaseError> {
    let raw = case.url.trim();
    if raw.is_empty() {
        return Err(ExecuteCaseError::EmptyUrl);
    }

    let url = if raw.starts_with("http://") || raw.starts_with("https://") {
        Url::parse(raw).map_err(|e| ExecuteCaseError::InvalidUrl(format!("{e}: {raw}")))?
    } else {
        base_url
            .join(raw)
            .map_err(|e| ExecuteCaseError::InvalidUrl(format!("{e}: {raw}")))?
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ExecuteCaseError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }

    Ok(ProbeRequest {
        method: case.method,
        url,
        body: case.body.clone(),
        timeout: Duration::from_millis(case.timeout_ms),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use apiprobe_domain::HttpMethod;
    use pretty_assertions::assert_eq;

    /// Mock client recording the resolved URL it was handed.
    struct MockHttpClient {
        response: Result<ResponseSnapshot, HttpClientError>,
        seen_url: Mutex<Option<String>>,
    }

    impl MockHttpClient {
        fn ok() -> Self {
            Self {
                response: Ok(ResponseSnapshot::new(
                    200,
                    HashMap::new(),
                    b"{}".to_vec(),
                    Duration::from_millis(5),
                )),
                seen_url: Mutex::new(None),
            }
        }

        fn err(error: HttpClientError) -> Self {
            Self {
                response: Err(error),
                seen_url: Mutex::new(None),
            }
        }
    }

    impl HttpClient for MockHttpClient {
        fn execute(
            &self,
            request: &ProbeRequest,
        ) -> Pin<Box<dyn Future<Output = Result<ResponseSnapshot, HttpClientError>> + Send + '_>>
        {
            *self.seen_url.lock().unwrap() = Some(request.url.to_string());
            let result = self.response.clone();
            Box::pin(async move { result })
        }
    }

    fn base() -> Url {
        Url::parse("https://jsonplaceholder.typicode.com").unwrap()
    }

    #[tokio::test]
    async fn relative_path_joins_base() {
        let client = Arc::new(MockHttpClient::ok());
        let use_case = ExecuteCase::new(Arc::clone(&client));

        let case = TestCase::get("posts by user", "/posts?userId=1");
        use_case.execute(&case, &base()).await.unwrap();

        assert_eq!(
            client.seen_url.lock().unwrap().as_deref(),
            Some("https://jsonplaceholder.typicode.com/posts?userId=1")
        );
    }

    #[tokio::test]
    async fn absolute_url_bypasses_base() {
        let client = Arc::new(MockHttpClient::ok());
        let use_case = ExecuteCase::new(Arc::clone(&client));

        let case = TestCase::get("elsewhere", "https://example.com/health");
        use_case.execute(&case, &base()).await.unwrap();

        assert_eq!(
            client.seen_url.lock().unwrap().as_deref(),
            Some("https://example.com/health")
        );
    }

    #[tokio::test]
    async fn empty_url_is_rejected() {
        let use_case = ExecuteCase::new(Arc::new(MockHttpClient::ok()));
        let case = TestCase::get("broken", "  ");
        let result = use_case.execute(&case, &base()).await;
        assert!(matches!(result, Err(ExecuteCaseError::EmptyUrl)));
    }

    #[tokio::test]
    async fn non_http_scheme_is_rejected() {
        let use_case = ExecuteCase::new(Arc::new(MockHttpClient::ok()));
        let case = TestCase::new(
            "broken",
            HttpMethod::Get,
            "ftp://example.com/file",
        );
        let result = use_case.execute(&case, &base()).await;
        assert!(matches!(result, Err(ExecuteCaseError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let use_case = ExecuteCase::new(Arc::new(MockHttpClient::err(
            HttpClientError::Timeout { timeout_ms: 30_000 },
        )));
        let case = TestCase::get("slow", "/users/1");
        let result = use_case.execute(&case, &base()).await;
        assert!(matches!(
            result,
            Err(ExecuteCaseError::Http(HttpClientError::Timeout { .. }))
        ));
    }
}

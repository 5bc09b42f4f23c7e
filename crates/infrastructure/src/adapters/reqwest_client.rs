//! HTTP client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port. It owns the only network
//! I/O in the codebase; everything downstream works on captured snapshots.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use reqwest::{Client, Method};

use apiprobe_application::ports::{HttpClient, HttpClientError, ProbeRequest};
use apiprobe_domain::{HttpMethod, ResponseSnapshot};

/// Redirect limit applied to every request.
const MAX_REDIRECTS: usize = 10;

/// HTTP client adapter backed by `reqwest::Client`.
///
/// The inner client holds the connection pool; clone-per-case sharing goes
/// through an `Arc` at the call site.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a client with the tool's default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(concat!("apiprobe/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wraps a preconfigured reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Attaches the JSON body, rejecting bodies on methods that carry none.
    fn attach_body(
        builder: reqwest::RequestBuilder,
        method: HttpMethod,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::RequestBuilder, HttpClientError> {
        match body {
            None => Ok(builder),
            Some(_) if !method.has_body() => Err(HttpClientError::InvalidBody(format!(
                "{method} requests do not carry a body"
            ))),
            Some(value) => Ok(builder.json(value)),
        }
    }

    /// Maps reqwest errors onto the port's error taxonomy.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error.to_string();
            let host = error
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("unknown")
                .to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError { host, message };
            }
            if lower.contains("refused") {
                let port = error
                    .url()
                    .and_then(reqwest::Url::port_or_known_default)
                    .unwrap_or(80);
                return HttpClientError::ConnectionRefused { host, port };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        HttpClientError::Other(error.to_string())
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: &ProbeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ResponseSnapshot, HttpClientError>> + Send + '_>> {
        // Clone out of the borrow before suspending.
        let method = request.method;
        let url = request.url.clone();
        let body = request.body.clone();
        let timeout = request.timeout;
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = timeout.as_millis() as u64;

        Box::pin(async move {
            let start = Instant::now();

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(method), url)
                .timeout(timeout);
            builder = Self::attach_body(builder, method, body.as_ref())?;

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();
            let headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body_bytes = response
                .bytes()
                .await
                .map_err(|e| HttpClientError::Other(format!("failed to read body: {e}")))?
                .to_vec();

            let duration = start.elapsed();

            Ok(ResponseSnapshot::new(status, headers, body_bytes, duration))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn method_mapping() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn client_builds() {
        assert!(ReqwestHttpClient::new().is_ok());
    }

    #[test]
    fn body_on_get_is_rejected() {
        let builder = Client::new().get("https://example.com");
        let body = serde_json::json!({"title": "x"});
        let result = ReqwestHttpClient::attach_body(builder, HttpMethod::Get, Some(&body));
        assert!(matches!(result, Err(HttpClientError::InvalidBody(_))));
    }

    #[test]
    fn body_on_post_is_attached() {
        let builder = Client::new().post("https://example.com");
        let body = serde_json::json!({"title": "x"});
        let result = ReqwestHttpClient::attach_body(builder, HttpMethod::Post, Some(&body));
        assert!(result.is_ok());
    }

    #[test]
    fn no_body_passes_through() {
        let builder = Client::new().delete("https://example.com");
        let result = ReqwestHttpClient::attach_body(builder, HttpMethod::Delete, None);
        assert!(result.is_ok());
    }
}

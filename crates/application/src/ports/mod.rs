//! Port definitions (interfaces)
//!
//! Ports define the boundary between the application core and external
//! systems. Each port is a trait implemented by an adapter in the
//! infrastructure layer.

mod http_client;

pub use http_client::{HttpClient, HttpClientError, ProbeRequest};

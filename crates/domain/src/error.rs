//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A case URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A test case is structurally invalid.
    #[error("invalid test case: {0}")]
    InvalidCase(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

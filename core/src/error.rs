//! Error types for the GDP API client.
//!
//! # Design
//! Errors fall into two groups. `Timeout`, `Network` and `Status` are
//! transport failures: the transport raises the generic error notification
//! before handing them back. Everything else is a construction-time error
//! (the request never left the process) and reaches the caller untouched,
//! with no notification.
//!
//! Soft failures are not errors at all. They arrive as `Ok(HttpResponse)`.

use thiserror::Error;

/// Errors returned by `Transport::send` and everything built on top of it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client configuration is unusable.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// A request interceptor refused the outgoing request.
    #[error("request interceptor failed: {0}")]
    Interceptor(String),

    /// Base URL and request path did not form a valid URL.
    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A header or body part could not be encoded.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No complete response arrived within the configured timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Connection-level failure (refused, reset, DNS, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// True for the failures that trigger the generic error notification.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Timeout { .. } | ApiError::Network(_) | ApiError::Status { .. }
        )
    }

    /// HTTP status of a `Status` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

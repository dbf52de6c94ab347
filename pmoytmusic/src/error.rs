//! Error types for the YouTube Music client

use std::sync::Arc;

/// Result type alias for YouTube Music operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to YouTube Music or its collaborators
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (connection reset, DNS, TLS...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An attempt did not complete before the per-attempt timeout
    #[error("Request timeout")]
    Timeout,

    /// Upstream asked us to slow down (429) or is temporarily unavailable (503)
    #[error("Rate limited or unavailable (HTTP {status})")]
    RateLimited { status: u16 },

    /// Non-retryable HTTP status
    #[error("API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Retry budget exhausted, callers must not retry further
    #[error("Giving up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    /// The response parsed as JSON but has no usable shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Error observed through a deduplicated in-flight request
    #[error(transparent)]
    Shared(Arc<Error>),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Build the error matching a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            429 | 503 => Self::RateLimited { status },
            _ => Self::Status {
                status,
                message: message.into(),
            },
        }
    }

    /// Whether another attempt may succeed (timeouts, transport failures, 429/503)
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout | Error::RateLimited { .. } => true,
            Error::Http(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() || e.is_decode()
            }
            Error::Shared(inner) => inner.is_retryable(),
            _ => false,
        }
    }

    /// Whether the failure is final for the resilience layer
    pub fn is_terminal(&self) -> bool {
        match self {
            Error::Status { .. } | Error::RetriesExhausted { .. } => true,
            Error::Shared(inner) => inner.is_terminal(),
            _ => false,
        }
    }
}

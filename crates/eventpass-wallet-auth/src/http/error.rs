/*
[INPUT]:  Error sources (HTTP transport, status codes, envelopes, serialization)
[OUTPUT]: Structured backend error type with retry and rejection hints
[POS]:    Error handling layer - HTTP-side errors, normalized by the orchestrator
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the auth backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// HTTP request failed (transport, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Envelope carried `success: false`
    #[error("Request unsuccessful: {message}")]
    Unsuccessful { message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Transport-level failures that never reached a backend decision
    pub fn is_transport(&self) -> bool {
        match self {
            BackendError::Http(_) | BackendError::UrlParse(_) => true,
            BackendError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Http(err) if err.is_timeout())
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        self.is_transport()
    }

    /// Backend refused the credentials or the token
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, BackendError::Api { status: 401 | 403, .. })
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        BackendError::Api {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

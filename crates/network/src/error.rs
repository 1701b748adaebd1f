// crates/network/src/error.rs
//! Error types for network operations

use nestegg_resilience::{mentions_timeout, Classify};
use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur during network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Transport-level failure: connect, timeout, TLS, body decoding
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The server rejected the bearer token
    #[error("HTTP 401: session expired or not signed in")]
    Unauthorized,

    /// Timeout enforced on the client side
    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Local session or settings storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] nestegg_config::ConfigError),

    /// Resilience error
    #[error("Resilience error: {0}")]
    Resilience(nestegg_resilience::ResilienceError),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl From<nestegg_resilience::ResilienceError> for NetworkError {
    fn from(error: nestegg_resilience::ResilienceError) -> Self {
        match error {
            nestegg_resilience::ResilienceError::Timeout(after) => NetworkError::Timeout(after),
            other => NetworkError::Resilience(other),
        }
    }
}

impl NetworkError {
    /// Returns the HTTP status carried by the error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            NetworkError::Unauthorized => Some(401),
            NetworkError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if the error is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns true if the error is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }
}

impl Classify for NetworkError {
    /// Timeouts and requests that never got a response are transient.
    /// Anything the server actually answered is terminal.
    fn is_transient(&self) -> bool {
        match self {
            NetworkError::Http(e) => {
                if e.status().is_some() {
                    return false;
                }
                e.is_timeout() || e.is_connect() || e.is_request() || source_mentions_timeout(e)
            }
            NetworkError::Timeout(_) => true,
            NetworkError::Status { .. }
            | NetworkError::Unauthorized
            | NetworkError::InvalidUrl(_)
            | NetworkError::Storage(_) => false,
            NetworkError::Resilience(e) => e.is_transient(),
            NetworkError::Custom(message) => mentions_timeout(message),
        }
    }
}

/// Looks for "timeout" in the causes of `error`, skipping its own message
///
/// reqwest's own message carries the request URL, so it is not inspected.
fn source_mentions_timeout(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        if mentions_timeout(&cause.to_string()) {
            return true;
        }
        source = cause.source();
    }
    false
}

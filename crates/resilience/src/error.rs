// crates/resilience/src/error.rs
//! Error types for resilience operations

use thiserror::Error;

/// Result type for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Errors that can occur in resilience operations
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// Operation timed out
    #[error("Operation timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// All retry attempts exhausted
    #[error("All {attempts} attempts exhausted: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// Operation was cancelled
    #[error("Operation was cancelled")]
    Cancelled,

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl crate::Classify for ResilienceError {
    fn is_transient(&self) -> bool {
        match self {
            ResilienceError::Timeout(_) => true,
            ResilienceError::RetriesExhausted { .. } | ResilienceError::Cancelled => false,
            ResilienceError::Custom(message) => crate::classify::mentions_timeout(message),
        }
    }
}

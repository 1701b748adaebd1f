// crates/network/src/fetch_state.rs
//! Observable outcome of a request executor

use nestegg_resilience::Classify;

/// Failure surfaced to whoever renders a [`FetchState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Human-readable description
    pub message: String,
    /// The failure was a timeout or dropped connection
    pub is_transient: bool,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>, is_transient: bool) -> Self {
        Self {
            message: message.into(),
            is_transient,
        }
    }

    /// Derives the info from a raw failure
    pub fn from_error<E: Classify + std::fmt::Display + ?Sized>(error: &E) -> Self {
        Self::new(error.to_string(), error.is_transient())
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Data, loading flag and error of one executor
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<ErrorInfo>,
    /// A transient failure occurred and a retry is pending or running
    pub retrying: bool,
    /// Retries performed in the current sequence
    pub attempt: u32,
}

impl<T> FetchState<T> {
    /// Returns true once the current sequence has finished
    pub fn is_settled(&self) -> bool {
        !self.loading
    }

    /// Returns true if the last sequence ended in an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            retrying: false,
            attempt: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state: FetchState<u32> = FetchState::default();
        assert!(state.is_settled());
        assert!(!state.is_error());
        assert!(state.data.is_none());
    }

    #[test]
    fn test_error_info_from_error() {
        let info = ErrorInfo::from_error("request timeout");
        assert!(info.is_transient);
        assert_eq!(info.to_string(), "request timeout");

        let info = ErrorInfo::from_error(&crate::NetworkError::Unauthorized);
        assert!(!info.is_transient);
    }
}

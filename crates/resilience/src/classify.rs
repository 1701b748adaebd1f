// crates/resilience/src/classify.rs
//! Failure classification
//!
//! A failure is either transient (timeouts, dropped connections, no response
//! at all) and worth retrying, or terminal (the server answered and the
//! answer will not change on retry).

/// Whether a failure may succeed if the same call is made again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network or timing condition, eligible for retry
    Transient,
    /// Application-level outcome, surfaced immediately
    Terminal,
}

/// Classifies a failure as transient or terminal
pub trait Classify {
    /// Returns true if retrying the same call could succeed
    fn is_transient(&self) -> bool;

    /// Returns the failure kind
    fn kind(&self) -> FailureKind {
        if self.is_transient() {
            FailureKind::Transient
        } else {
            FailureKind::Terminal
        }
    }
}

/// Returns true if a failure message mentions a timeout
///
/// Matches the lowercase substring only, so status lines such as
/// "Gateway Timeout" do not count.
pub fn mentions_timeout(message: &str) -> bool {
    message.contains("timeout")
}

impl Classify for String {
    fn is_transient(&self) -> bool {
        mentions_timeout(self)
    }
}

impl Classify for str {
    fn is_transient(&self) -> bool {
        mentions_timeout(self)
    }
}

impl Classify for std::io::Error {
    fn is_transient(&self) -> bool {
        use std::io::ErrorKind;

        matches!(
            self.kind(),
            ErrorKind::TimedOut
                | ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::NotConnected
                | ErrorKind::BrokenPipe
                | ErrorKind::UnexpectedEof
        ) || mentions_timeout(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_classification() {
        assert!("request timeout of 3000ms exceeded".is_transient());
        assert!(!"Request failed with status code 404".is_transient());
        assert!(!"Gateway Timeout".is_transient());
    }

    #[test]
    fn test_io_error_classification() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(Classify::kind(&refused), FailureKind::Transient);

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Classify::kind(&denied), FailureKind::Terminal);
    }
}

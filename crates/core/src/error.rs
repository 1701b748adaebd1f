//! Error types for the client core

use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by domain types and state containers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A settings key that does not exist
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    /// A settings value that cannot be parsed for its key
    #[error("Invalid value '{value}' for setting {key}: {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    /// A serialized user object that cannot be decoded
    #[error("Invalid user record: {0}")]
    InvalidUser(String),
}

impl CoreError {
    /// Creates an invalid-setting error
    pub fn invalid_setting(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_setting_display() {
        let err = CoreError::UnknownSetting("volume".to_string());
        assert_eq!(err.to_string(), "Unknown setting: volume");
    }

    #[test]
    fn test_invalid_setting_display() {
        let err = CoreError::invalid_setting("theme", "purple", "expected light, dark or system");
        assert!(err.to_string().contains("purple"));
        assert!(err.to_string().contains("theme"));
    }
}

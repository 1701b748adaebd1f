//! Data-fetch retry defaults

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry defaults applied to every request executor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchConfig {
    /// Retries after the first call for transient failures
    pub max_attempts: u32,

    /// Fixed delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            retry_delay_ms: 3000,
        }
    }
}

impl ConfigSection for FetchConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(self.max_attempts, 0, 10, "fetch.max_attempts"),
            Validator::in_range(self.retry_delay_ms, 0, 60_000, "fetch.retry_delay_ms"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.max_attempts = other.max_attempts;
        self.retry_delay_ms = other.retry_delay_ms;
    }

    fn section_name(&self) -> &'static str {
        "fetch"
    }
}

//! Liveness ping configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Keeps a cold-starting backend awake while a user is signed in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeepAliveConfig {
    /// Ping the health endpoint while signed in
    pub enabled: bool,

    /// Seconds between periodic pings
    pub interval_secs: u64,

    /// Retries of a failed ping before giving up until the next period
    pub max_retries: u32,

    /// Milliseconds between ping retries
    pub retry_delay_ms: u64,

    /// Seconds before a health request is abandoned
    pub timeout_secs: u64,
}

impl KeepAliveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 600,
            max_retries: 3,
            retry_delay_ms: 5000,
            timeout_secs: 5,
        }
    }
}

impl ConfigSection for KeepAliveConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(self.interval_secs, 10, 86_400, "keepalive.interval_secs"),
            Validator::in_range(self.max_retries, 0, 10, "keepalive.max_retries"),
            Validator::in_range(self.retry_delay_ms, 0, 300_000, "keepalive.retry_delay_ms"),
            Validator::in_range(self.timeout_secs, 1, 60, "keepalive.timeout_secs"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.enabled = other.enabled;
        self.interval_secs = other.interval_secs;
        self.max_retries = other.max_retries;
        self.retry_delay_ms = other.retry_delay_ms;
        self.timeout_secs = other.timeout_secs;
    }

    fn section_name(&self) -> &'static str {
        "keepalive"
    }
}

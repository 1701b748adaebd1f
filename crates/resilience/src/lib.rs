// crates/resilience/src/lib.rs
//! Resilience patterns for talking to a slow-starting backend
//!
//! This module provides:
//! - Transient/terminal failure classification
//! - Fixed-delay retry of transient failures
//! - Timeout handling
//!
//! # Example
//!
//! ```rust
//! use nestegg_resilience::{Classify, RetryPolicy};
//! use std::time::Duration;
//!
//! // Two retries, three seconds apart
//! let policy = RetryPolicy::new(2).with_delay(Duration::from_secs(3));
//!
//! assert!(policy.should_retry(0, "request timeout"));
//! assert!(!policy.should_retry(0, "HTTP 404: Not Found"));
//! assert!("socket timeout".is_transient());
//! ```

mod classify;
mod error;
mod retry;
mod timeout;

pub use classify::{mentions_timeout, Classify, FailureKind};
pub use error::{ResilienceError, ResilienceResult};
pub use retry::{
    retry_async, retry_or_exhaust, RetryPolicy, RetryState, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_RETRY_DELAY,
};
pub use timeout::{with_timeout, Timeout};

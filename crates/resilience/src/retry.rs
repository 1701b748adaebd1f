// crates/resilience/src/retry.rs
//! Fixed-delay retry for transient failures

use crate::classify::Classify;
use crate::error::ResilienceError;
use std::future::Future;
use std::time::Duration;

/// Default number of retries after the first call
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Default pause between a transient failure and the next call
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3000);

/// Retry policy configuration
///
/// `max_attempts` counts retries, not calls: a policy of 2 allows up to
/// three calls in total. The delay is fixed between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first call
    max_attempts: u32,
    /// Delay before each retry
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a new retry policy
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Creates a policy that never retries
    pub fn none() -> Self {
        Self::new(0)
    }

    /// Sets the delay between retries
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the maximum number of retries
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay between retries
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Decides whether a failure seen after `attempt` retries gets another call
    pub fn should_retry<E: Classify + ?Sized>(&self, attempt: u32, error: &E) -> bool {
        error.is_transient() && attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Attempt counter for one retry sequence
///
/// Starts at zero for every externally triggered invocation and only grows
/// through [`RetryState::advance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
}

impl RetryState {
    /// Creates a fresh counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Retries performed so far in this sequence
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Records that a retry is being scheduled
    pub fn advance(&mut self) {
        self.attempt += 1;
    }

    /// Starts a new sequence
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// Runs an async operation, retrying transient failures per `policy`
///
/// Terminal failures are returned on the first occurrence. When the retry
/// budget runs out the last error is returned as-is so callers can still
/// inspect it.
pub async fn retry_async<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + std::fmt::Display,
{
    let mut state = RetryState::new();

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if policy.should_retry(state.attempt(), &error) => {
                state.advance();
                log::info!(
                    "Transient failure ({}), retry {}/{} in {:?}",
                    error,
                    state.attempt(),
                    policy.max_attempts(),
                    policy.delay()
                );
                tokio::time::sleep(policy.delay()).await;
            }
            Err(error) => return Err(error),
        }
    }
}

/// Like [`retry_async`] but folds the final failure into a [`ResilienceError`]
pub async fn retry_or_exhaust<F, Fut, T, E>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, ResilienceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + std::fmt::Display,
{
    let mut calls = 0u32;
    let result = retry_async(policy, || {
        calls += 1;
        operation()
    })
    .await;

    result.map_err(|e| ResilienceError::RetriesExhausted {
        attempts: calls,
        last_error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 2);
        assert_eq!(policy.delay(), Duration::from_millis(3000));
    }

    #[test]
    fn test_retry_policy_builder() {
        let policy = RetryPolicy::new(5).with_delay(Duration::from_millis(200));

        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.delay(), Duration::from_millis(200));
    }

    #[test]
    fn test_should_retry_respects_budget_and_kind() {
        let policy = RetryPolicy::new(2);

        assert!(policy.should_retry(0, "timeout"));
        assert!(policy.should_retry(1, "timeout"));
        assert!(!policy.should_retry(2, "timeout"));
        assert!(!policy.should_retry(0, "HTTP 404"));
    }

    #[test]
    fn test_retry_state() {
        let mut state = RetryState::new();
        state.advance();
        state.advance();
        assert_eq!(state.attempt(), 2);

        state.reset();
        assert_eq!(state.attempt(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_async_success_after_transient_failures() {
        let policy = RetryPolicy::new(2).with_delay(Duration::from_secs(3));
        let calls = Arc::new(AtomicU32::new(0));
        let started = tokio::time::Instant::now();

        let result = retry_async(&policy, || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err("timeout".to_string())
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_async_terminal_failure_not_retried() {
        let policy = RetryPolicy::new(2);
        let calls = Arc::new(AtomicU32::new(0));
        let started = tokio::time::Instant::now();

        let result: Result<(), String> = retry_async(&policy, || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("HTTP 404: Not Found".to_string())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_or_exhaust_reports_call_count() {
        let policy = RetryPolicy::new(2).with_delay(Duration::from_millis(10));

        let result: Result<(), ResilienceError> =
            retry_or_exhaust(&policy, || async { Err("connect timeout".to_string()) }).await;

        match result {
            Err(ResilienceError::RetriesExhausted {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last_error, "connect timeout");
            }
            other => panic!("Expected RetriesExhausted, got {:?}", other),
        }
    }
}

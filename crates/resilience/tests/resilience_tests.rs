// crates/resilience/tests/resilience_tests.rs
//! Integration tests for resilience patterns

use nestegg_resilience::{
    retry_async, with_timeout, Classify, FailureKind, ResilienceError, RetryPolicy,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_retry_through_timeouts() {
    let policy = RetryPolicy::new(2).with_delay(Duration::from_millis(100));
    let calls = Arc::new(AtomicU32::new(0));

    // First call hangs past the timeout, second one answers
    let result = retry_async(&policy, || {
        let calls = Arc::clone(&calls);
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            with_timeout(Duration::from_secs(5), async move {
                if n == 0 {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
                "ok"
            })
            .await
        }
    })
    .await;

    assert_eq!(result.ok(), Some("ok"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_budget_returns_last_error() {
    let policy = RetryPolicy::new(3).with_delay(Duration::from_millis(1));
    let calls = Arc::new(AtomicU32::new(0));

    let result: Result<(), ResilienceError> = retry_async(&policy, || {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ResilienceError::Timeout(Duration::from_secs(5)))
        }
    })
    .await;

    assert!(matches!(result, Err(ResilienceError::Timeout(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_zero_budget_calls_once() {
    let policy = RetryPolicy::none();
    let calls = Arc::new(AtomicU32::new(0));

    let result: Result<(), String> = retry_async(&policy, || {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("read timeout".to_string())
        }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failure_kinds() {
    assert_eq!(
        Classify::kind(&ResilienceError::Timeout(Duration::from_secs(1))),
        FailureKind::Transient
    );
    assert_eq!(
        Classify::kind(&ResilienceError::Cancelled),
        FailureKind::Terminal
    );
}

// crates/network/src/liveness.rs
//! Periodic health pings that keep a cold-starting backend awake
//!
//! The pinger hits the health endpoint once on [`LivenessPinger::start`] and
//! then on every interval. A failed ping is retried a bounded number of times
//! after a fixed delay; when the retries run out the failure is logged and
//! dropped. Nothing is ever surfaced to the caller.

use crate::client::ApiClient;
use crate::error::NetworkResult;
use futures::future::BoxFuture;
use futures::FutureExt;
use nestegg_config::KeepAliveConfig;
use nestegg_resilience::with_timeout;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

static GLOBAL: OnceLock<LivenessPinger> = OnceLock::new();

/// Something that can tell whether the backend is up
pub trait HealthProbe: Send + Sync + 'static {
    fn check(&self) -> BoxFuture<'_, NetworkResult<()>>;
}

impl HealthProbe for ApiClient {
    fn check(&self) -> BoxFuture<'_, NetworkResult<()>> {
        self.health().boxed()
    }
}

/// Timing of the liveness pinger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingerConfig {
    /// Time between periodic pings
    pub interval: Duration,
    /// Retries of a failed ping
    pub max_retries: u32,
    /// Delay before each retry
    pub retry_delay: Duration,
    /// Bound on a single health check
    pub timeout: Duration,
}

impl Default for PingerConfig {
    fn default() -> Self {
        Self::from(&KeepAliveConfig::default())
    }
}

impl From<&KeepAliveConfig> for PingerConfig {
    fn from(config: &KeepAliveConfig) -> Self {
        Self {
            interval: config.interval(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            timeout: config.timeout(),
        }
    }
}

/// Keeps the backend warm while someone is signed in
///
/// Clones control the same timer. `start` while running and `stop` while
/// stopped are no-ops.
#[derive(Clone)]
pub struct LivenessPinger {
    inner: Arc<PingerInner>,
}

impl LivenessPinger {
    pub fn new<P: HealthProbe>(probe: P, config: PingerConfig) -> Self {
        Self {
            inner: Arc::new(PingerInner {
                probe: Box::new(probe),
                config,
                timer: Mutex::new(TimerState::default()),
                pings: AtomicU64::new(0),
            }),
        }
    }

    /// Makes this pinger the process-wide instance
    ///
    /// The first installed pinger wins; later calls return it unchanged.
    pub fn install(self) -> &'static LivenessPinger {
        GLOBAL.get_or_init(|| self)
    }

    /// Returns the process-wide instance, if one was installed
    pub fn global() -> Option<&'static LivenessPinger> {
        GLOBAL.get()
    }

    pub fn config(&self) -> &PingerConfig {
        &self.inner.config
    }

    /// Pings now and then on every interval
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start(&self) {
        let mut timer = self.inner.lock();
        if timer.periodic.is_some() {
            log::debug!("Liveness pinger already running");
            return;
        }

        let inner = Arc::clone(&self.inner);
        timer.periodic = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(inner.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                Arc::clone(&inner).ping(0).await;
            }
        }));

        log::info!(
            "Liveness pinger started, interval {:?}",
            self.inner.config.interval
        );
    }

    /// Cancels the periodic timer and any pending retry
    pub fn stop(&self) {
        let mut timer = self.inner.lock();
        let Some(periodic) = timer.periodic.take() else {
            return;
        };

        periodic.abort();
        for retry in timer.retries.drain(..) {
            retry.abort();
        }
        log::info!("Liveness pinger stopped");
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_active()
    }

    /// Runs one ping outside the schedule
    ///
    /// Failures are retried only while the pinger is running.
    pub async fn ping(&self) {
        Arc::clone(&self.inner).ping(0).await;
    }

    /// Number of health checks attempted so far
    pub fn ping_count(&self) -> u64 {
        self.inner.pings.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for LivenessPinger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivenessPinger")
            .field("config", &self.inner.config)
            .field("running", &self.is_running())
            .field("pings", &self.ping_count())
            .finish()
    }
}

struct PingerInner {
    probe: Box<dyn HealthProbe>,
    config: PingerConfig,
    timer: Mutex<TimerState>,
    pings: AtomicU64,
}

/// Active iff `periodic` holds a handle
#[derive(Default)]
struct TimerState {
    periodic: Option<JoinHandle<()>>,
    retries: Vec<JoinHandle<()>>,
}

impl PingerInner {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_active(&self) -> bool {
        self.lock().periodic.is_some()
    }

    fn ping(self: Arc<Self>, attempt: u32) -> BoxFuture<'static, ()> {
        async move {
            self.pings.fetch_add(1, Ordering::SeqCst);

            let failure = match with_timeout(self.config.timeout, self.probe.check()).await {
                Ok(Ok(())) => {
                    log::debug!("Health ping succeeded");
                    return;
                }
                Ok(Err(e)) => e.to_string(),
                Err(e) => e.to_string(),
            };

            if attempt >= self.config.max_retries {
                log::warn!(
                    "Health ping failed after {} retries, giving up until next interval: {}",
                    attempt,
                    failure
                );
                return;
            }

            let mut timer = self.lock();
            if timer.periodic.is_none() {
                log::debug!("Health ping failed while stopped, not retrying: {}", failure);
                return;
            }

            log::warn!(
                "Health ping failed ({}), retry {}/{} in {:?}",
                failure,
                attempt + 1,
                self.config.max_retries,
                self.config.retry_delay
            );

            let inner = Arc::clone(&self);
            let retry = tokio::spawn(async move {
                tokio::time::sleep(inner.config.retry_delay).await;
                if !inner.is_active() {
                    return;
                }
                inner.ping(attempt + 1).await;
            });
            timer.retries.retain(|handle| !handle.is_finished());
            timer.retries.push(retry);
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetworkError;
    use std::sync::atomic::AtomicU32;

    /// Fails the first `failures` checks, then succeeds
    struct ScriptedProbe {
        failures: AtomicU32,
    }

    impl ScriptedProbe {
        fn failing(failures: u32) -> Self {
            Self {
                failures: AtomicU32::new(failures),
            }
        }
    }

    impl HealthProbe for ScriptedProbe {
        fn check(&self) -> BoxFuture<'_, NetworkResult<()>> {
            let failed = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            async move {
                if failed {
                    Err(NetworkError::Custom("connection refused".to_string()))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }
    }

    struct HangingProbe;

    impl HealthProbe for HangingProbe {
        fn check(&self) -> BoxFuture<'_, NetworkResult<()>> {
            futures::future::pending().boxed()
        }
    }

    fn config() -> PingerConfig {
        PingerConfig {
            interval: Duration::from_secs(600),
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_pings_immediately_then_periodically() {
        let pinger = LivenessPinger::new(ScriptedProbe::failing(0), config());

        pinger.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(pinger.ping_count(), 1);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(pinger.ping_count(), 2);
        assert!(pinger.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_creates_one_timer() {
        let pinger = LivenessPinger::new(ScriptedProbe::failing(0), config());

        pinger.start();
        pinger.clone().start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(pinger.ping_count(), 1);

        tokio::time::sleep(Duration::from_secs(1200)).await;
        assert_eq!(pinger.ping_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_stopped_is_noop() {
        let pinger = LivenessPinger::new(ScriptedProbe::failing(0), config());

        pinger.stop();
        assert!(!pinger.is_running());

        pinger.start();
        pinger.stop();
        pinger.stop();
        assert!(!pinger.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_retried_then_dropped() {
        let pinger = LivenessPinger::new(ScriptedProbe::failing(u32::MAX), config());

        pinger.start();
        tokio::time::sleep(Duration::from_secs(60)).await;

        // Initial ping plus three retries
        assert_eq!(pinger.ping_count(), 4);
        assert!(pinger.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_retry() {
        let pinger = LivenessPinger::new(ScriptedProbe::failing(1), config());

        pinger.start();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(pinger.ping_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_retry() {
        let pinger = LivenessPinger::new(ScriptedProbe::failing(u32::MAX), config());

        pinger.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(pinger.ping_count(), 1);

        pinger.stop();
        tokio::time::sleep(Duration::from_secs(1200)).await;
        assert_eq!(pinger.ping_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_check_times_out() {
        let pinger = LivenessPinger::new(
            HangingProbe,
            PingerConfig {
                max_retries: 1,
                ..config()
            },
        );

        pinger.start();
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(pinger.ping_count(), 1);

        // Times out at 5s, retries at 10s, gives up at 15s
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(pinger.ping_count(), 2);
        assert!(pinger.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_ping_without_start_does_not_retry() {
        let pinger = LivenessPinger::new(ScriptedProbe::failing(u32::MAX), config());

        pinger.ping().await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(pinger.ping_count(), 1);
        assert!(!pinger.is_running());
    }

    #[test]
    fn test_config_from_keepalive() {
        let config = PingerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(600));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(5000));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}

// crates/network/src/executor.rs
//! Request executor with transient-failure retry
//!
//! Wraps a zero-argument async operation and publishes its outcome as a
//! [`FetchState`]. Every externally triggered invocation (creation with
//! `immediate`, or [`RequestExecutor::refetch`]) starts a new sequence with a
//! fresh retry budget. Transient failures are retried after a fixed delay
//! while `loading` stays true; terminal failures and exhausted budgets end
//! the sequence with an error.
//!
//! Dropping the executor (or calling [`RequestExecutor::close`]) tears it
//! down: in-flight calls and pending retries may still complete, but they no
//! longer touch the state or fire callbacks.

use crate::fetch_state::{ErrorInfo, FetchState};
use futures::future::BoxFuture;
use futures::FutureExt;
use nestegg_config::FetchConfig;
use nestegg_core::StableParams;
use nestegg_resilience::{Classify, RetryPolicy, RetryState};
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

type Operation<T, E> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync>;
type SuccessCallback<T> = Box<dyn Fn(&T) + Send + Sync>;
type FailureCallback = Box<dyn Fn(&ErrorInfo) + Send + Sync>;

/// Configures a [`RequestExecutor`] before it is started
pub struct ExecutorBuilder<T, E> {
    operation: Operation<T, E>,
    policy: RetryPolicy,
    immediate: bool,
    latest_wins: bool,
    on_success: Option<SuccessCallback<T>>,
    on_failure: Option<FailureCallback>,
}

impl<T, E> ExecutorBuilder<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Classify + Display + Send + 'static,
{
    /// Replaces the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the number of retries after the first call
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.policy = RetryPolicy::new(max_attempts).with_delay(self.policy.delay());
        self
    }

    /// Sets the fixed delay between retries
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.policy = self.policy.with_delay(delay);
        self
    }

    /// Takes retry defaults from the client configuration
    pub fn with_config(self, config: &FetchConfig) -> Self {
        self.with_policy(RetryPolicy::new(config.max_attempts).with_delay(config.retry_delay()))
    }

    /// Whether the first invocation starts as soon as the executor is built
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Discard completions of sequences superseded by a later invocation
    pub fn latest_wins(mut self, latest_wins: bool) -> Self {
        self.latest_wins = latest_wins;
        self
    }

    /// Called with the result of every successful sequence
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Called with the error of every failed sequence
    pub fn on_failure<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ErrorInfo) + Send + Sync + 'static,
    {
        self.on_failure = Some(Box::new(callback));
        self
    }

    /// Builds the executor, starting the first invocation if `immediate`
    ///
    /// # Panics
    ///
    /// With `immediate` set, panics when called outside a Tokio runtime.
    pub fn build(self) -> RequestExecutor<T, E> {
        let (state, _rx) = watch::channel(FetchState::default());
        let executor = RequestExecutor {
            shared: Arc::new(Shared {
                operation: self.operation,
                policy: self.policy,
                latest_wins: self.latest_wins,
                on_success: self.on_success,
                on_failure: self.on_failure,
                state,
                interested: AtomicBool::new(true),
                generation: AtomicU64::new(0),
                calls: AtomicU32::new(0),
            }),
        };

        if self.immediate {
            executor.refetch();
        }
        executor
    }
}

/// Runs an async operation and tracks its [`FetchState`]
pub struct RequestExecutor<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> RequestExecutor<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Classify + Display + Send + 'static,
{
    /// Starts configuring an executor for `operation`
    pub fn builder<F, Fut>(operation: F) -> ExecutorBuilder<T, E>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        ExecutorBuilder {
            operation: Arc::new(move || operation().boxed()),
            policy: RetryPolicy::default(),
            immediate: true,
            latest_wins: false,
            on_success: None,
            on_failure: None,
        }
    }

    /// Creates an executor with default settings and starts it
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn new<F, Fut>(operation: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::builder(operation).build()
    }

    /// Re-invokes the operation with a fresh retry budget
    ///
    /// Any sequence already in flight keeps running; see
    /// [`ExecutorBuilder::latest_wins`] for discarding its result.
    pub fn refetch(&self) -> JoinHandle<()> {
        let generation = self.shared.begin();
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.run(generation).await })
    }

    /// Returns a snapshot of the current state
    pub fn state(&self) -> FetchState<T> {
        self.shared.state.borrow().clone()
    }

    /// Subscribes to state changes
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.shared.state.subscribe()
    }

    /// Waits until no sequence is loading and returns the state
    ///
    /// Never resolves if the executor is closed while loading.
    pub async fn wait_settled(&self) -> FetchState<T> {
        let mut rx = self.subscribe();
        let settled = rx.wait_for(|state| !state.loading).await.map(|s| s.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// Number of times the wrapped operation has been called
    pub fn calls(&self) -> u32 {
        self.shared.calls.load(Ordering::SeqCst)
    }

    /// Returns the retry policy in use
    pub fn policy(&self) -> &RetryPolicy {
        &self.shared.policy
    }

    /// Tears the executor down; later completions are discarded
    pub fn close(&self) {
        self.shared.close();
    }

    /// Returns true once [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        !self.shared.is_interested()
    }
}

impl<T, E> Drop for RequestExecutor<T, E> {
    fn drop(&mut self) {
        self.shared.close();
    }
}

/// A [`RequestExecutor`] whose operation takes parameters
///
/// [`set_params`](Self::set_params) refetches only when the new parameters
/// differ from the ones the last request was issued with.
pub struct ParamExecutor<P, T, E> {
    executor: RequestExecutor<T, E>,
    params: Arc<RwLock<P>>,
    stable: Mutex<StableParams<P>>,
}

impl<P, T, E> ParamExecutor<P, T, E>
where
    P: PartialEq + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Classify + Display + Send + 'static,
{
    /// Builds the executor with `initial` parameters
    ///
    /// `configure` receives the builder, so retry settings, callbacks and
    /// `immediate` work as they do for [`RequestExecutor::builder`].
    pub fn new<F, Fut, C>(initial: P, operation: F, configure: C) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        C: FnOnce(ExecutorBuilder<T, E>) -> ExecutorBuilder<T, E>,
    {
        let mut stable = StableParams::new();
        stable.update(&initial);
        let params = Arc::new(RwLock::new(initial));

        let current = Arc::clone(&params);
        let builder = RequestExecutor::builder(move || {
            let params = current
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            operation(params)
        });

        Self {
            executor: configure(builder).build(),
            params,
            stable: Mutex::new(stable),
        }
    }

    /// Replaces the parameters, refetching if they changed
    ///
    /// Returns the handle of the new sequence, or `None` when `params` equal
    /// the current ones.
    pub fn set_params(&self, params: P) -> Option<JoinHandle<()>> {
        let mut stable = self.stable.lock().unwrap_or_else(PoisonError::into_inner);
        if !stable.update(&params) {
            log::debug!("Parameters unchanged, keeping current request");
            return None;
        }
        *self.params.write().unwrap_or_else(PoisonError::into_inner) = params;
        drop(stable);

        Some(self.executor.refetch())
    }

    /// Returns the parameters the next request will use
    pub fn params(&self) -> P {
        self.params
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn executor(&self) -> &RequestExecutor<T, E> {
        &self.executor
    }
}

struct Shared<T, E> {
    operation: Operation<T, E>,
    policy: RetryPolicy,
    latest_wins: bool,
    on_success: Option<SuccessCallback<T>>,
    on_failure: Option<FailureCallback>,
    state: watch::Sender<FetchState<T>>,
    /// Cleared on teardown
    interested: AtomicBool,
    generation: AtomicU64,
    calls: AtomicU32,
}

impl<T, E> Shared<T, E> {
    fn close(&self) {
        // Under the state lock so no mutation straddles teardown
        self.state.send_if_modified(|_| {
            self.interested.store(false, Ordering::SeqCst);
            false
        });
    }

    fn is_interested(&self) -> bool {
        self.interested.load(Ordering::SeqCst)
    }

    fn accepts(&self, generation: u64) -> bool {
        self.is_interested()
            && (!self.latest_wins || self.generation.load(Ordering::SeqCst) == generation)
    }

    /// Applies `update` if the sequence is still wanted
    fn mutate<F>(&self, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut FetchState<T>),
    {
        self.state.send_if_modified(|state| {
            if !self.accepts(generation) {
                return false;
            }
            update(state);
            true
        })
    }
}

impl<T, E> Shared<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Classify + Display + Send + 'static,
{
    /// Starts a new sequence and returns its generation
    fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.mutate(generation, |state| {
            state.loading = true;
            state.error = None;
            state.retrying = false;
            state.attempt = 0;
        });
        generation
    }

    async fn run(self: Arc<Self>, generation: u64) {
        if !self.is_interested() {
            log::debug!("Executor closed, not sending request");
            return;
        }
        let mut retry = RetryState::new();

        loop {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = (self.operation)().await;

            let error = match outcome {
                Ok(value) => {
                    let stored = self.mutate(generation, |state| {
                        state.data = Some(value.clone());
                        state.loading = false;
                        state.error = None;
                        state.retrying = false;
                    });
                    if !stored {
                        log::debug!("Discarding result of an abandoned request");
                    } else if let Some(callback) = self.on_success.as_ref() {
                        // close() may have landed after the state was stored
                        if self.is_interested() {
                            callback(&value);
                        }
                    }
                    return;
                }
                Err(error) => error,
            };

            if self.policy.should_retry(retry.attempt(), &error) {
                retry.advance();
                let attempt = retry.attempt();
                if !self.mutate(generation, |state| {
                    state.retrying = true;
                    state.attempt = attempt;
                }) {
                    log::debug!("Request abandoned before retry");
                    return;
                }

                log::info!(
                    "Transient failure ({}), retry {}/{} in {:?}",
                    error,
                    attempt,
                    self.policy.max_attempts(),
                    self.policy.delay()
                );
                drop(error);

                tokio::time::sleep(self.policy.delay()).await;
                if !self.accepts(generation) {
                    log::debug!("Request abandoned while waiting to retry");
                    return;
                }
                continue;
            }

            let info = ErrorInfo::from_error(&error);
            log::warn!("Request failed: {}", info);
            let stored = self.mutate(generation, |state| {
                state.error = Some(info.clone());
                state.loading = false;
                state.retrying = false;
            });
            if stored && self.is_interested() {
                if let Some(callback) = &self.on_failure {
                    callback(&info);
                }
            }
            return;
        }
    }
}

// crates/network/src/lib.rs
//! Resilient data access for the Nestegg budgeting API
//!
//! - [`ApiClient`]: REST client with bearer auth and a `401` hook
//! - [`RequestExecutor`]: runs a request, retries transient failures after a
//!   fixed delay and publishes a [`FetchState`]
//! - [`ParamExecutor`]: the same, for requests that take parameters; it
//!   refetches only when the parameters change
//! - [`LivenessPinger`]: keeps a cold-starting backend awake while signed in
//! - [`AuthSession`], [`SettingsSession`], [`SessionWatcher`]: session
//!   persistence and the pinger's lifecycle
//!
//! ```no_run
//! use nestegg_network::{ApiClient, RequestExecutor};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new()?;
//! let api = client.clone();
//! let executor = RequestExecutor::new(move || {
//!     let api = api.clone();
//!     async move { api.get_json::<serde_json::Value>("expenses").await }
//! });
//!
//! let state = executor.wait_settled().await;
//! println!("{:?}", state.data);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod executor;
mod fetch_state;
mod liveness;
mod session;

pub use client::{ApiClient, ClientConfig, UnauthorizedHook};
pub use error::{NetworkError, NetworkResult};
pub use executor::{ExecutorBuilder, ParamExecutor, RequestExecutor};
pub use fetch_state::{ErrorInfo, FetchState};
pub use liveness::{HealthProbe, LivenessPinger, PingerConfig};
pub use session::{AuthSession, SessionWatcher, SettingsSession};

//! Nestegg configuration and local storage
//!
//! This crate owns everything the client keeps on disk:
//!
//! - `config.toml`: deployment settings (API base URL, retry and keep-alive tuning)
//! - `settings.json`: the user's preferences blob
//! - `session.json`: the bearer token and the signed-in user
//!
//! # Architecture
//!
//! - **Trait-based**: each config section implements `ConfigSection`
//! - **Graceful degradation**: invalid configs load with warnings
//! - **Atomic writes**: files are never left half-written
//!
//! # Example
//!
//! ```rust,no_run
//! use nestegg_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("API: {}", config.api.base_url);
//! ```

mod error;
mod manager;
mod persistence;
mod session_storage;
mod settings_file;
mod validation;

// Config sections
mod api_config;
pub mod app_config;
mod fetch_config;
mod keepalive_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{apply_env_overrides, ConfigManager, ENV_API_URL, ENV_KEEPALIVE, ENV_LOG_LEVEL};
pub use session_storage::SessionStorage;
pub use settings_file::SettingsFile;
pub use validation::{ConfigSection, Validator};

pub use api_config::ApiConfig;
pub use app_config::{AppConfig, LogLevel};
pub use fetch_config::FetchConfig;
pub use keepalive_config::KeepAliveConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Backend location and transport settings
    pub api: ApiConfig,

    /// Retry defaults for data fetches
    pub fetch: FetchConfig,

    /// Liveness ping settings
    pub keepalive: KeepAliveConfig,

    /// Application-level settings
    pub app: AppConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for result in [
            self.api.validate(),
            self.fetch.validate(),
            self.keepalive.validate(),
            self.app.validate(),
        ] {
            if let Err(mut e) = result {
                errors.append(&mut e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.api.merge(other.api);
        self.fetch.merge(other.fetch);
        self.keepalive.merge(other.keepalive);
        self.app.merge(other.app);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: ApiConfig::default(),
            fetch: FetchConfig::default(),
            keepalive: KeepAliveConfig::default(),
            app: AppConfig::default(),
        }
    }
}

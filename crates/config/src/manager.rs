//! Configuration manager - main API for config and local storage

use crate::persistence::ConfigPersistence;
use crate::session_storage::SessionStorage;
use crate::settings_file::SettingsFile;
use crate::{Config, ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable overriding `api.base_url`
pub const ENV_API_URL: &str = "NESTEGG_API_URL";
/// Environment variable overriding `app.log_level`
pub const ENV_LOG_LEVEL: &str = "NESTEGG_LOG_LEVEL";
/// Environment variable overriding `keepalive.enabled`
pub const ENV_KEEPALIVE: &str = "NESTEGG_KEEPALIVE_ENABLED";

/// Main configuration manager
///
/// Owns the client's storage directory: `config.toml`, `settings.json` and
/// `session.json` all live side by side in it.
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the default config directory
    ///
    /// - Linux: `~/.config/nestegg/`
    /// - macOS: `~/Library/Application Support/nestegg/`
    /// - Windows: `%APPDATA%\nestegg\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Self::with_directory(config_dir)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let persistence = ConfigPersistence::new(config_dir.join("config.toml"));

        Ok(Self {
            persistence,
            config_dir,
        })
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "nestegg")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            })
    }

    /// Returns the config directory path
    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Handle for the persisted settings blob
    pub fn settings_file(&self) -> SettingsFile {
        SettingsFile::new(self.config_dir.join("settings.json"))
    }

    /// Handle for the persisted session
    pub fn session_storage(&self) -> SessionStorage {
        SessionStorage::new(self.config_dir.join("session.json"))
    }

    /// Loads the configuration from file
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Saves the configuration to file
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads the config, applies `update_fn` and saves the result
    ///
    /// ```rust,no_run
    /// # use nestegg_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.keepalive.enabled = false;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.persistence.save(&Config::default())?;
        Ok(true)
    }

    /// Resets the configuration to defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Validates the current configuration file
    ///
    /// Returns all validation errors found, or an empty list if valid.
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the config and applies `NESTEGG_*` environment overrides
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }
}

/// Applies overrides looked up through `lookup`
///
/// Unparseable values are logged and ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL) {
        log::info!("API base URL override: {}", url);
        config.api.base_url = url;
    }

    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        match level.parse() {
            Ok(level) => config.app.log_level = level,
            Err(e) => log::warn!("Ignoring {}: {}", ENV_LOG_LEVEL, e),
        }
    }

    if let Some(enabled) = lookup(ENV_KEEPALIVE) {
        match enabled.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => config.keepalive.enabled = true,
            "0" | "false" | "no" | "off" => config.keepalive.enabled = false,
            other => log::warn!("Ignoring {}: '{}' is not a boolean", ENV_KEEPALIVE, other),
        }
    }

    if let Err(errors) = config.validate() {
        log::warn!(
            "Config validation warnings after env overrides: {:?}",
            errors
        );
    }
}

//! Persisted settings blob

use crate::persistence::{read_optional, write_atomic};
use crate::{ConfigError, ConfigResult};
use nestegg_core::Settings;
use std::path::{Path, PathBuf};

/// Reads and rewrites the user settings blob (`settings.json`)
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    /// Creates a handle for the settings file at `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings, returning defaults when nothing has been saved yet
    pub fn load(&self) -> ConfigResult<Settings> {
        match read_optional(&self.path)? {
            None => Ok(Settings::default()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| ConfigError::StorageError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Loads settings, falling back to defaults on a corrupted file
    pub fn load_or_default(&self) -> Settings {
        self.load().unwrap_or_else(|e| {
            log::warn!("Failed to load settings: {}, using defaults", e);
            Settings::default()
        })
    }

    /// Writes the whole blob
    pub fn save(&self, settings: &Settings) -> ConfigResult<()> {
        let raw = serde_json::to_string_pretty(settings).map_err(|e| ConfigError::StorageError {
            path: self.path.clone(),
            source: e,
        })?;
        write_atomic(&self.path, &raw)?;
        log::debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestegg_core::Theme;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let file = SettingsFile::new(dir.path().join("settings.json"));
        assert_eq!(file.load().expect("load"), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().expect("temp dir");
        let file = SettingsFile::new(dir.path().join("settings.json"));

        let settings = Settings {
            theme: Theme::Dark,
            currency: "BRL".to_string(),
            ..Settings::default()
        };
        file.save(&settings).expect("save");

        assert_eq!(file.load().expect("load"), settings);
    }

    #[test]
    fn test_corrupted_file_falls_back() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").expect("write");

        let file = SettingsFile::new(path);
        assert!(matches!(file.load(), Err(ConfigError::StorageError { .. })));
        assert_eq!(file.load_or_default(), Settings::default());
    }
}

//! Integration tests for configuration and local storage

use nestegg_config::{Config, ConfigManager, ConfigSection, KeepAliveConfig, CONFIG_VERSION};
use nestegg_core::{Reducible, Settings, SettingsAction, Theme, User};
use std::fs;
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_full_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    assert!(manager.initialize()?);

    let config = manager.load()?;
    assert_eq!(config.version, CONFIG_VERSION);

    let mut modified = config.clone();
    modified.api.base_url = "https://budget.example.com/api".to_string();
    modified.keepalive.interval_secs = 300;
    manager.save(&modified)?;

    let reloaded = manager.load()?;
    assert_eq!(reloaded, modified);
    assert!(manager.validate()?.is_empty());
    Ok(())
}

#[test]
fn test_hand_edited_invalid_value_loads_with_warning() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::create_dir_all(manager.config_dir())?;
    fs::write(
        manager.config_path(),
        "[keepalive]\ninterval_secs = 1\n",
    )?;

    let config = manager.load()?;
    assert_eq!(config.keepalive.interval_secs, 1);
    assert_eq!(manager.validate()?.len(), 1);
    assert!(config.keepalive.validate().is_err());
    Ok(())
}

#[test]
fn test_corrupted_config_falls_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::create_dir_all(manager.config_dir())?;
    fs::write(manager.config_path(), "[api\nbase_url = ")?;

    assert!(manager.load().is_err());
    assert_eq!(manager.load_or_default(), Config::default());
    Ok(())
}

#[test]
fn test_settings_rewritten_on_every_change() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    let file = manager.settings_file();

    let mut settings = file.load()?;
    for action in [
        SettingsAction::SetTheme(Theme::Dark),
        SettingsAction::parse("currency", "gbp")?,
    ] {
        settings = settings.reduce(action);
        file.save(&settings)?;
    }

    let reloaded = file.load()?;
    assert_eq!(reloaded.theme, Theme::Dark);
    assert_eq!(reloaded.currency, "GBP");
    assert_ne!(reloaded, Settings::default());
    Ok(())
}

#[test]
fn test_session_survives_new_manager() -> Result<(), Box<dyn std::error::Error>> {
    let (temp_dir, manager) = setup_test_manager()?;
    let user = User::new("u7", "Cai", "cai@example.com");
    manager.session_storage().save(&user, "token-7")?;

    let again = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    assert_eq!(
        again.session_storage().restore(),
        Some((user, "token-7".to_string()))
    );
    Ok(())
}

#[test]
fn test_keepalive_defaults_match_documented_values() {
    let keepalive = KeepAliveConfig::default();
    assert_eq!(keepalive.interval_secs, 600);
    assert_eq!(keepalive.max_retries, 3);
    assert_eq!(keepalive.retry_delay_ms, 5000);
    assert_eq!(keepalive.timeout_secs, 5);
}

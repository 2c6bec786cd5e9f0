use super::data::{Config, ThemePreference};
use super::io::ConfigError;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.theme, ThemePreference::Dark);
    assert_eq!(config.model(), "gemini-2.5-flash");
    assert_eq!(
        config.base_url(),
        "https://generativelanguage.googleapis.com/v1beta"
    );
    assert_eq!(config.idle_timeout(), Duration::from_millis(5000));
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        theme: ThemePreference::Light,
        model: Some("gemini-2.5-pro".to_string()),
        base_url: None,
        idle_timeout_ms: Some(30_000),
    };
    config.save_to_path(&config_path).expect("Failed to save config");

    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);
    assert_eq!(loaded.model(), "gemini-2.5-pro");
    assert_eq!(loaded.idle_timeout(), Duration::from_secs(30));

    let reset = Config {
        theme: loaded.theme.toggled(),
        ..Default::default()
    };
    reset.save_to_path(&config_path).expect("Failed to save config");
    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.theme, ThemePreference::Dark);
    assert_eq!(reloaded.model, None);
}

#[test]
fn theme_is_written_in_lowercase() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");

    Config {
        theme: ThemePreference::Light,
        ..Default::default()
    }
    .save_to_path(&config_path)
    .expect("Failed to save config");

    let contents = std::fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(contents.contains("theme = \"light\""));
}

#[test]
fn invalid_toml_reports_parse_error_with_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "theme = [not toml").expect("Failed to write config");

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config at"));
}

#[test]
fn zero_idle_timeout_falls_back_to_default() {
    let config = Config {
        idle_timeout_ms: Some(0),
        ..Default::default()
    };
    assert_eq!(config.idle_timeout(), Duration::from_millis(5000));
}

#[test]
fn theme_preference_parses_case_insensitively() {
    assert_eq!("LIGHT".parse::<ThemePreference>(), Ok(ThemePreference::Light));
    assert_eq!(" dark ".parse::<ThemePreference>(), Ok(ThemePreference::Dark));
    assert!("solarized".parse::<ThemePreference>().is_err());
}

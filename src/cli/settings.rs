//! `geechat set` handling.

use std::fmt;

use crate::core::config::{Config, ThemePreference};

pub const SETTING_KEYS: [&str; 4] = ["theme", "model", "base-url", "idle-timeout-ms"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    UnknownKey(String),
    MissingValue { key: &'static str, example: &'static str },
    InvalidValue { key: &'static str, reason: String },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {key} (supported: {})",
                SETTING_KEYS.join(", ")
            ),
            SettingError::MissingValue { key, example } => {
                write!(f, "Missing value for {key}. Example: {example}")
            }
            SettingError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for {key}: {reason}")
            }
        }
    }
}

impl std::error::Error for SettingError {}

/// Applies `key = value` to `config` and returns the confirmation line.
/// The caller persists the config.
pub fn apply_setting(
    config: &mut Config,
    key: &str,
    value: Option<&str>,
) -> Result<String, SettingError> {
    let value = value.map(str::trim).filter(|value| !value.is_empty());
    match key {
        "theme" => {
            let value = value.ok_or(SettingError::MissingValue {
                key: "theme",
                example: "geechat set theme light",
            })?;
            let theme = value
                .parse::<ThemePreference>()
                .map_err(|reason| SettingError::InvalidValue { key: "theme", reason })?;
            config.theme = theme;
            Ok(format!("Set theme to: {theme}"))
        }
        "model" => {
            let value = value.ok_or(SettingError::MissingValue {
                key: "model",
                example: "geechat set model gemini-2.5-pro",
            })?;
            config.model = Some(value.to_string());
            Ok(format!("Set model to: {value}"))
        }
        "base-url" => {
            let value = value.ok_or(SettingError::MissingValue {
                key: "base-url",
                example: "geechat set base-url https://generativelanguage.googleapis.com/v1beta",
            })?;
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(SettingError::InvalidValue {
                    key: "base-url",
                    reason: "expected an http:// or https:// URL".to_string(),
                });
            }
            config.base_url = Some(value.to_string());
            Ok(format!("Set base-url to: {value}"))
        }
        "idle-timeout-ms" => {
            let value = value.ok_or(SettingError::MissingValue {
                key: "idle-timeout-ms",
                example: "geechat set idle-timeout-ms 60000",
            })?;
            let ms = value
                .parse::<u64>()
                .map_err(|err| SettingError::InvalidValue {
                    key: "idle-timeout-ms",
                    reason: err.to_string(),
                })?;
            config.idle_timeout_ms = Some(ms);
            Ok(format!("Set idle-timeout-ms to: {ms}"))
        }
        other => Err(SettingError::UnknownKey(other.to_string())),
    }
}

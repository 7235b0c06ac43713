//! Application configuration.
//!
//! T010: Implement Config loading from TOML

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Roster generation settings
    pub roster: RosterSettings,
    /// SMART assist service settings
    pub smart: SmartSettings,
    /// Messaging platform settings
    pub messaging: MessagingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            roster: RosterSettings::default(),
            smart: SmartSettings::default(),
            messaging: MessagingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("rollcall.db")
    }
}

/// Roster-generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSettings {
    /// Number of future days pre-populated per generator run
    pub forward_window_days: u32,
    /// Minutes between generator runs
    pub interval_minutes: u64,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            forward_window_days: 2,
            interval_minutes: 60,
        }
    }
}

/// SMART assist service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartSettings {
    /// Base URL of the SMART assist API
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SmartSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.rollcall.io/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 5,
        }
    }
}

impl SmartSettings {
    /// Per-request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Messaging platform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingSettings {
    /// Base URL of the messaging platform API
    pub base_url: String,
    /// Bot token for authentication
    pub bot_token: String,
}

impl Default for MessagingSettings {
    fn default() -> Self {
        Self {
            base_url: "https://messaging.example.com/api".to_string(),
            bot_token: String::new(),
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "rollcall", "Rollcall")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from file.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = get_config_path();

    if !path.exists() {
        let config = AppConfig {
            data_dir: get_data_dir(),
            ..Default::default()
        };
        return Ok(config);
    }

    let content =
        std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = get_data_dir();

    Ok(config)
}

/// Save application configuration to file.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = get_config_path();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.roster.forward_window_days, 2);
        assert_eq!(config.roster.interval_minutes, 60);
        assert_eq!(config.smart.timeout_secs, 5);
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = AppConfig::default();
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&content).unwrap();

        assert_eq!(parsed.roster.forward_window_days, config.roster.forward_window_days);
        assert_eq!(parsed.smart.base_url, config.smart.base_url);
        assert_eq!(parsed.messaging.base_url, config.messaging.base_url);
    }

    #[test]
    fn test_database_path_under_data_dir() {
        let config = AppConfig {
            data_dir: PathBuf::from("/tmp/rollcall-test"),
            ..Default::default()
        };
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/rollcall-test/rollcall.db")
        );
    }
}

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_confirm_delay_ms() -> u64 {
    2000
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Overrides the platform data directory for the user/role records.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub theme: Theme,

    /// Delay before a confirmed delete actually runs.
    #[serde(default = "default_confirm_delay_ms")]
    pub confirm_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: None,
            theme: Theme::default(),
            confirm_delay_ms: default_confirm_delay_ms(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config: AppConfig =
                serde_json::from_str(&contents).context("Failed to parse config file")?;
            Ok(config)
        } else {
            warn!("Config file not found, using defaults");
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path()?;
        let config_dir = config_path
            .parent()
            .context("Failed to get config directory")?;

        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("opsdeck").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.confirm_delay_ms, 2000);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.theme, deserialized.theme);
        assert_eq!(config.log_level, deserialized.log_level);
    }

    #[test]
    fn test_theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        assert_eq!(serde_json::to_string(&Theme::Light).unwrap(), "\"light\"");
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.confirm_delay_ms, 2000);
    }
}

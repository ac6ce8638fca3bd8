//! Configuration loading, validation, and management for plancraft.
//!
//! Loads configuration from `~/.plancraft/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use plancraft_core::{ConverterOptions, RepairPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.plancraft/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Defaults for rebuilding grouped constraints from the per-room view
    #[serde(default)]
    pub converter: ConverterOptions,

    /// Reachability repair weights and thresholds
    #[serde(default)]
    pub repair: RepairPolicy,

    /// Session snapshot storage
    #[serde(default)]
    pub session: SessionConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory holding one sub-directory per session.
    /// Defaults to `~/.plancraft/sessions`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Storage backend: "file" or "in_memory"
    #[serde(default = "default_session_backend")]
    pub backend: String,
}

fn default_session_backend() -> String {
    "file".into()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: None,
            backend: default_session_backend(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (e.g. "info", "plancraft=debug")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.plancraft/config.toml).
    ///
    /// Environment overrides:
    /// - `PLANCRAFT_SESSIONS_DIR`: session storage directory
    /// - `PLANCRAFT_LOG`: default log filter
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("PLANCRAFT_SESSIONS_DIR") {
            self.session.dir = Some(PathBuf::from(dir));
        }
        if let Ok(level) = std::env::var("PLANCRAFT_LOG") {
            self.logging.level = level;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".plancraft")
    }

    /// Directory for session snapshots, honoring the configured override.
    pub fn sessions_dir(&self) -> PathBuf {
        self.session
            .dir
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("sessions"))
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("converter.default_category_weight", self.converter.default_category_weight),
            ("converter.default_item_weight", self.converter.default_item_weight),
            ("repair.path_entrance_weight", self.repair.path_entrance_weight),
            ("repair.hub_weight", self.repair.hub_weight),
            ("repair.min_connection_weight", self.repair.min_connection_weight),
            ("repair.raised_connection_weight", self.repair.raised_connection_weight),
        ];
        for (name, value) in weights {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 1.0 (got {value})"
                )));
            }
        }

        if self.converter.default_min_distance < 0.0 {
            return Err(ConfigError::ValidationError(
                "converter.default_min_distance must be >= 0".into(),
            ));
        }

        if self.repair.raised_connection_weight < self.repair.min_connection_weight {
            return Err(ConfigError::ValidationError(
                "repair.raised_connection_weight must not be below repair.min_connection_weight"
                    .into(),
            ));
        }

        if !matches!(self.session.backend.as_str(), "file" | "in_memory") {
            return Err(ConfigError::ValidationError(format!(
                "unknown session backend '{}' (expected \"file\" or \"in_memory\")",
                self.session.backend
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.repair.hub_weight, 0.8);
        assert_eq!(config.converter.default_item_weight, 0.5);
        assert_eq!(config.session.backend, "file");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.repair, config.repair);
        assert_eq!(parsed.converter, config.converter);
    }

    #[test]
    fn out_of_range_weight_rejected() {
        let mut config = AppConfig::default();
        config.repair.hub_weight = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("repair.hub_weight"));
    }

    #[test]
    fn raised_weight_below_threshold_rejected() {
        let mut config = AppConfig::default();
        config.repair.raised_connection_weight = 0.3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_backend_rejected() {
        let mut config = AppConfig::default();
        config.session.backend = "redis".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[repair]
hub_weight = 0.9

[session]
dir = "/var/lib/plancraft"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.repair.hub_weight, 0.9);
        assert_eq!(config.repair.raised_connection_weight, 0.7);
        assert_eq!(config.sessions_dir(), PathBuf::from("/var/lib/plancraft"));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[repair\nhub_weight = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("hub_weight"));
        assert!(toml_str.contains("default_item_weight"));
    }
}

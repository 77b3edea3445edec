//! Application configuration
//!
//! Read from `config.toml` in the platform config directory. Every field is
//! optional; a missing file yields the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the database lives; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    /// `EnvFilter` directives, overridden by `RUST_LOG`
    pub log_filter: String,
    /// Group size offered before any groups have been made
    pub default_group_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            default_group_size: 3,
        }
    }
}

impl AppConfig {
    /// Load `config.toml` from `config_dir`, or defaults if it does not exist
    pub fn load_from_dir(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_group_size, 3);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::from_toml(
            r#"
data_dir = "/tmp/sortpot"
log_filter = "sortpot_core=debug"
"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/sortpot")));
        assert_eq!(config.log_filter, "sortpot_core=debug");
        assert_eq!(config.default_group_size, 3);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = AppConfig::from_toml("default_group_size = \"four\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppConfig::load_from_dir(dir.path()).unwrap(), AppConfig::default());

        std::fs::write(dir.path().join(CONFIG_FILE), "default_group_size = 5\n").unwrap();
        assert_eq!(AppConfig::load_from_dir(dir.path()).unwrap().default_group_size, 5);
    }
}

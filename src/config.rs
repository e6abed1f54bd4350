use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::account::Amount;
use crate::error::ConfigError;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct VaultConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub account: AccountConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "./data/vault".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AccountConfig {
    /// Allowance used by `init` when none is given
    #[serde(default)]
    pub initial_allowance: Amount,
}

impl VaultConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read `path`, or write and return the defaults if it does not exist.
    pub fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if Path::new(path).exists() {
            let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
            let config = Self::from_toml(&s)?;
            info!("Config loaded from {}", path);
            Ok(config)
        } else {
            info!("Config file not found at '{}'. Creating default.", path);
            let config = Self::default();
            match toml::to_string_pretty(&config) {
                Ok(s) => {
                    if let Err(e) = std::fs::write(path, s) {
                        warn!("Could not write default config to '{}': {}", path, e);
                    }
                }
                Err(e) => warn!("Could not render default config: {}", e),
            }
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = VaultConfig::from_toml(
            r#"
            [account]
            initial_allowance = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.account.initial_allowance, 500);
        assert_eq!(config.store.db_path, "./data/vault");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_defaults_round_trip() {
        let rendered = toml::to_string_pretty(&VaultConfig::default()).unwrap();
        assert_eq!(VaultConfig::from_toml(&rendered).unwrap(), VaultConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        assert!(matches!(
            VaultConfig::from_toml("[store]\ndb_path = 7"),
            Err(ConfigError::Parse(_))
        ));
    }
}

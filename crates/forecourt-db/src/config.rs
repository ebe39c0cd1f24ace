//! Station configuration module.
//!
//! Configuration is loaded from `FORECOURT_*` environment variables with
//! fallback to defaults. Values that are present but unparseable are
//! errors, never silently defaulted.
//!
//! | Variable                       | Default           |
//! |--------------------------------|-------------------|
//! | `FORECOURT_DATABASE_PATH`      | `./forecourt.db`  |
//! | `FORECOURT_MAX_CONNECTIONS`    | `5`               |
//! | `FORECOURT_LOG_LEVEL`          | `info`            |
//! | `FORECOURT_VERIFY_FUEL_PRICES` | `true`            |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::pool::DbConfig;

pub const DATABASE_PATH_VAR: &str = "FORECOURT_DATABASE_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "FORECOURT_MAX_CONNECTIONS";
pub const LOG_LEVEL_VAR: &str = "FORECOURT_LOG_LEVEL";
pub const VERIFY_FUEL_PRICES_VAR: &str = "FORECOURT_VERIFY_FUEL_PRICES";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Back-office configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// SQLite database file, or `:memory:`
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Default `tracing` level when `RUST_LOG` is unset
    pub log_level: String,

    /// Refuse to start if a tank's fuel type has no posted price
    pub verify_fuel_prices: bool,
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            database_path: PathBuf::from("./forecourt.db"),
            max_connections: 5,
            log_level: "info".to_string(),
            verify_fuel_prices: true,
        }
    }
}

impl StationConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StationConfig::default();

        let database_path = match lookup(DATABASE_PATH_VAR) {
            Some(path) if path.trim().is_empty() => {
                return Err(ConfigError::MissingRequired(DATABASE_PATH_VAR.to_string()))
            }
            Some(path) => PathBuf::from(path.trim()),
            None => defaults.database_path,
        };

        let max_connections = match lookup(MAX_CONNECTIONS_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue(MAX_CONNECTIONS_VAR.to_string()))?,
            None => defaults.max_connections,
        };

        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(raw) => {
                let level = raw.trim().to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(ConfigError::InvalidValue(LOG_LEVEL_VAR.to_string()));
                }
                level
            }
            None => defaults.log_level,
        };

        let verify_fuel_prices = match lookup(VERIFY_FUEL_PRICES_VAR) {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| ConfigError::InvalidValue(VERIFY_FUEL_PRICES_VAR.to_string()))?,
            None => defaults.verify_fuel_prices,
        };

        Ok(StationConfig {
            database_path,
            max_connections,
            log_level,
            verify_fuel_prices,
        })
    }

    /// Pool settings for this configuration.
    pub fn to_db_config(&self) -> DbConfig {
        let config = DbConfig::new(self.database_path.clone());
        if config.is_in_memory() {
            return DbConfig::in_memory();
        }
        config.max_connections(self.max_connections)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

//! Engine configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                          | Default                         |
//! |-----------------------------------|---------------------------------|
//! | `AUTORENT_DATABASE_PATH`          | `./autorent.db`                 |
//! | `AUTORENT_DB_MAX_CONNECTIONS`     | `5` (must be at least 1)        |
//! | `AUTORENT_DB_BUSY_TIMEOUT_MS`     | `5000`                          |
//! | `AUTORENT_RECORD_FAILED_PAYMENTS` | `true`                          |
//! | `AUTORENT_LOG_FILTER`             | `info,autorent=debug,sqlx=warn` |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use autorent_db::DbConfig;

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,autorent=debug,sqlx=warn";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// How long an atomic unit waits for the write lock
    pub db_busy_timeout_ms: u64,

    /// Append a failed payment entry to the ledger when pay is rejected
    /// for insufficient funds
    pub record_failed_payments: bool,

    /// Fallback `EnvFilter` directives
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            database_path: PathBuf::from("./autorent.db"),
            db_max_connections: 5,
            db_busy_timeout_ms: 5000,
            record_failed_payments: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();

        let config = EngineConfig {
            database_path: lookup("AUTORENT_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            db_max_connections: parse_or(
                &lookup,
                "AUTORENT_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,

            db_busy_timeout_ms: parse_or(
                &lookup,
                "AUTORENT_DB_BUSY_TIMEOUT_MS",
                defaults.db_busy_timeout_ms,
            )?,

            record_failed_payments: match lookup("AUTORENT_RECORD_FAILED_PAYMENTS") {
                Some(raw) => parse_bool(&raw).ok_or_else(|| {
                    ConfigError::InvalidValue("AUTORENT_RECORD_FAILED_PAYMENTS".to_string())
                })?,
                None => defaults.record_failed_payments,
            },

            log_filter: lookup("AUTORENT_LOG_FILTER").unwrap_or(defaults.log_filter),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "AUTORENT_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        if config.database_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired(
                "AUTORENT_DATABASE_PATH".to_string(),
            ));
        }

        Ok(config)
    }

    /// Store settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.db_max_connections)
            .busy_timeout(Duration::from_millis(self.db_busy_timeout_ms))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
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

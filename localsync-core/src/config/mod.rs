//! Configuration for the local store and its logging
//!
//! Values come from defaults, a TOML file, or `LOCALSYNC_*` environment
//! variables, and are validated before use.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

mod error;

pub use error::ConfigError;

use crate::logging::LogLevel;
use crate::store::is_in_memory_path;

const ENV_STORE_PATH: &str = "LOCALSYNC_STORE_PATH";
const ENV_STORE_MAX_READERS: &str = "LOCALSYNC_STORE_MAX_READERS";
const ENV_LOG_LEVEL: &str = "LOCALSYNC_LOG_LEVEL";
const ENV_LOG_JSON: &str = "LOCALSYNC_LOG_JSON";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local store configuration
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Local store configuration.
///
/// The database always runs in WAL mode: readers keep their snapshot while
/// the writer commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file location. Must be a file on disk.
    pub path: PathBuf,

    /// Size of the read-only connection pool
    pub max_readers: u32,

    /// How long SQLite waits on a locked database before failing
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,

    /// How long a caller waits to check a connection out of either pool
    #[serde(with = "humantime_serde")]
    pub checkout_timeout: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/localsync.db"),
            max_readers: 4,
            busy_timeout: Duration::from_secs(5),
            checkout_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json_format: false, with_target: true }
    }
}

fn parse_env<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnv { var, value })
}

impl Config {
    /// Load configuration from environment variables on top of the defaults
    ///
    /// Variables follow the pattern `LOCALSYNC_<SECTION>_<KEY>`, e.g.
    /// `LOCALSYNC_STORE_PATH=/var/lib/app/local.db`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = env::var(ENV_STORE_PATH) {
            config.store.path = PathBuf::from(path);
        }
        if let Ok(max_readers) = env::var(ENV_STORE_MAX_READERS) {
            config.store.max_readers = parse_env(ENV_STORE_MAX_READERS, max_readers)?;
        }
        if let Ok(level) = env::var(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
        if let Ok(json) = env::var(ENV_LOG_JSON) {
            config.logging.json_format = parse_env(ENV_LOG_JSON, json)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::FileRead { path: path.to_path_buf(), source })?;

        let config: Self = toml::from_str(&contents)?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_in_memory_path(&self.store.path) {
            return Err(ConfigError::UnsupportedStorePath(self.store.path.clone()));
        }

        if self.store.max_readers == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_readers must be greater than 0".to_string(),
            ));
        }

        if self.store.checkout_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "checkout_timeout must be greater than 0".to_string(),
            ));
        }

        if LogLevel::from_str(&self.logging.level).is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;

        std::fs::write(path, contents)
            .map_err(|source| ConfigError::FileWrite { path: path.to_path_buf(), source })?;

        Ok(())
    }
}

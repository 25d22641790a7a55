//! Errors raised while loading or checking a [`Config`](super::Config)

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML file could not be read
    #[error("Cannot read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML file could not be written
    #[error("Cannot write config file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot encode config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A `LOCALSYNC_*` variable held an unparsable value
    #[error("Environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    /// The store location cannot back two connection pools
    #[error("Unsupported store path {0}: the database must be a file on disk")]
    UnsupportedStorePath(PathBuf),

    #[error("Invalid config: {0}")]
    ValidationFailed(String),
}

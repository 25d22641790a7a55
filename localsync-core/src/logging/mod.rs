//! Logging setup
//!
//! The library itself only emits `tracing` events; applications call
//! [`init_logging`] once to install a subscriber. Storage and outbox events
//! use the [`DATABASE_TARGET`] target.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod level;

pub use error::LoggingError;
pub use level::LogLevel;

use crate::config::LoggingConfig;

/// Target for database and outbox events
pub const DATABASE_TARGET: &str = "localsync::database";

/// Environment variable that overrides the configured filter
pub const LOG_FILTER_ENV: &str = "LOCALSYNC_LOG";

/// Install the global subscriber described by `config`
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let level: LogLevel = config.level.parse()?;
    let env_filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let fmt_layer = fmt::layer().with_target(config.with_target);

    if config.json_format {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .try_init()
            .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
    }
}

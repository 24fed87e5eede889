use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{AppError, AppResult};

/// Install the global subscriber; logs go to stderr so command output stays clean
pub fn init_tracing(config: &LoggingConfig) -> AppResult<()> {
    let filter = build_filter(config)?;

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .try_init(),
    };

    result.map_err(|e| AppError::Configuration(format!("Failed to initialize logging: {}", e)))
}

/// `RUST_LOG` when set, otherwise the configured level
pub fn build_filter(config: &LoggingConfig) -> AppResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            AppError::Configuration(format!("Invalid log level '{}': {}", config.level, e))
        }),
    }
}

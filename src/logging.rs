//! Tracing subscriber setup.
//!
//! Logs always go to stderr so stdout stays clean for results. With
//! `logging.file = true` a daily-rotated copy is written to the logs
//! directory through a non-blocking appender.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::companion_dirs;
use crate::config::LoggingConfig;
use crate::error::{CompanionError, Result};

const LOG_FILE_PREFIX: &str = "companion-search.log";

/// Builds the level filter: `RUST_LOG` if set, otherwise `level`.
///
/// # Errors
///
/// Returns [`CompanionError::Logging`] if `level` is not a valid filter directive.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|e| CompanionError::Logging(e.to_string())),
    }
}

/// Installs the global subscriber.
///
/// The returned guard flushes the log file when dropped; hold it for the
/// lifetime of the process.
///
/// # Errors
///
/// Returns an error if the filter is invalid, the log directory cannot be
/// created, or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = env_filter(&config.level)?;
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if !config.file {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .map_err(|e| CompanionError::Logging(e.to_string()))?;
        return Ok(None);
    }

    let dir = config
        .log_dir
        .clone()
        .unwrap_or_else(companion_dirs::logs_dir);
    std::fs::create_dir_all(&dir)?;
    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CompanionError::Logging(e.to_string()))?;
    Ok(Some(guard))
}

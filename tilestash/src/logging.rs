//! Logging setup for binaries using this crate.
//!
//! Installs a `tracing` subscriber writing to stderr and to a daily
//! rolling file. The returned guard must be held for the life of the
//! process, or buffered file output is lost.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log file prefix; the appender adds the date.
pub const LOG_FILE_NAME: &str = "tilestash.log";
/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Errors setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("failed to install logger: {0}")]
    Init(String),
}

/// Keeps the background log writer alive.
#[must_use = "logs are lost once the guard is dropped"]
pub struct LoggingGuard {
    _file: WorkerGuard,
}

/// Default log directory, inside the data directory.
pub fn default_log_dir() -> PathBuf {
    crate::config::data_dir().join("logs")
}

/// `RUST_LOG` if set, else `default`.
pub fn env_filter(default: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(default).map_err(|e| LoggingError::Filter {
            filter: default.to_string(),
            reason: e.to_string(),
        })
    })
}

/// Install the global subscriber.
pub fn init_logging(log_dir: &Path, default_filter: &str) -> Result<LoggingGuard, LoggingError> {
    fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDir {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let timer = OffsetTime::local_rfc_3339().unwrap_or_else(|_| OffsetTime::new(UtcOffset::UTC, Rfc3339));

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_timer(timer.clone())
        .with_thread_names(true)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(default_filter)?)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    tracing::debug!(dir = %log_dir.display(), "Logging initialised");
    Ok(LoggingGuard { _file: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert!(EnvFilter::try_new("tilestash=debug,reqwest=warn").is_ok());
    }

    #[test]
    fn test_log_dir_under_data_dir() {
        assert!(default_log_dir().ends_with("tilestash/logs"));
    }
}

//! Tracing subscriber setup.
//!
//! Logs go to stderr. When a log directory is given, a daily-rotated file
//! (`roofscan.log.YYYY-MM-DD`) receives the same events without ANSI
//! colors through a non-blocking writer. Keep the returned guard alive for
//! the lifetime of the program or buffered lines are lost on exit.

use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "roofscan=info";

/// Prefix of rotated log files.
pub const LOG_FILE_PREFIX: &str = "roofscan.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Builds the event filter from `RUST_LOG`, falling back to `default`.
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs the global subscriber.
///
/// Returns the file writer guard when `log_dir` is set.
pub fn init_logging(
    default_filter: &str,
    log_dir: Option<&Path>,
) -> Result<Option<WorkerGuard>, LoggingError> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let registry = tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(stderr_layer);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
                path: dir.display().to_string(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .map_err(|e| LoggingError::Init(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            registry
                .try_init()
                .map_err(|e| LoggingError::Init(e.to_string()))?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let first = init_logging(DEFAULT_LOG_FILTER, Some(dir.path()));
        assert!(first.is_ok());
        assert!(first.unwrap().is_some());

        let second = init_logging(DEFAULT_LOG_FILTER, None);
        assert!(matches!(second, Err(LoggingError::Init(_))));
    }
}

//! Logging setup.
//!
//! Installs a global `tracing` subscriber writing to both stdout and a log
//! file. The file is truncated at startup so each session starts clean.
//! `RUST_LOG` overrides the configured level.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to prepare log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Keeps the background file writer alive.
///
/// Dropping the guard flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    path: PathBuf,
}

impl LoggingGuard {
    /// Path of the active log file.
    pub fn log_path(&self) -> &Path {
        &self.path
    }
}

/// Initialize logging to `log_dir/log_file` and stdout at `info` level.
pub fn init_logging(log_dir: &Path, log_file: &str) -> Result<LoggingGuard, LoggingError> {
    install(log_dir, log_file, "info")
}

/// Initialize logging from the `[logging]` section of the config file.
pub fn init_logging_with(settings: &LoggingSettings) -> Result<LoggingGuard, LoggingError> {
    install(&settings.directory, &settings.file, &settings.level)
}

fn install(log_dir: &Path, log_file: &str, level: &str) -> Result<LoggingGuard, LoggingError> {
    let path = prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        path,
    })
}

/// `RUST_LOG` if set and valid, otherwise `level`, otherwise `info`.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Creates `log_dir` and truncates the log file.
fn prepare_log_file(log_dir: &Path, log_file: &str) -> Result<PathBuf, LoggingError> {
    let path = log_dir.join(log_file);
    fs::create_dir_all(log_dir)
        .and_then(|_| fs::write(&path, ""))
        .map_err(|source| LoggingError::LogFile {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_creates_nested_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("deep").join("logs");

        let path = prepare_log_file(&dir, "eoview.log").unwrap();
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_prepare_truncates_previous_session() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("eoview.log"), "old session").unwrap();

        let path = prepare_log_file(temp.path(), "eoview.log").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "");
    }

    #[test]
    fn test_prepare_fails_when_directory_is_a_file() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = prepare_log_file(&blocker, "eoview.log").unwrap_err();
        assert!(matches!(err, LoggingError::LogFile { .. }));
    }

    #[test]
    fn test_invalid_level_falls_back() {
        // Must not panic for garbage input.
        let _ = env_filter("not a [level");
    }
}

//! Settings structs mirroring the sections of `config.ini`.

use std::path::PathBuf;

use super::defaults::*;
use super::request::RequestConfig;

/// Complete contents of `config.ini`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    /// `[requests]` section
    pub requests: RequestSettings,
    /// `[logging]` section
    pub logging: LoggingSettings,
}

/// `[requests]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSettings {
    pub debounce_ms: u64,
}

impl RequestSettings {
    /// Coordinator configuration built from these settings.
    pub fn to_request_config(&self) -> RequestConfig {
        RequestConfig::new().with_debounce_ms(self.debounce_ms)
    }
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Directory the log file is written to
    pub directory: PathBuf,
    /// Log file name inside `directory`
    pub file: String,
    /// Default filter level, used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            file: DEFAULT_LOG_FILE.to_string(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

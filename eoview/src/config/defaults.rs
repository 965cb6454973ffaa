//! Default values for every configurable setting.

/// Debounce applied to coordinated requests, in milliseconds.
///
/// Zero dispatches every request immediately.
pub const DEFAULT_DEBOUNCE_MS: u64 = 0;

/// Upper bound accepted for `[requests] debounce_ms`.
pub const MAX_DEBOUNCE_MS: u64 = 60_000;

pub const DEFAULT_LOG_DIRECTORY: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "eoview.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Levels accepted for `[logging] level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "eoview";
pub const CONFIG_FILE_NAME: &str = "config.ini";

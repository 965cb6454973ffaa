//! Serialization of `ConfigFile` to the commented INI written to disk.

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[requests]
; Quiet period in milliseconds before a coordinated request is dispatched.
; Calls arriving within this window collapse into one. 0 disables debouncing.
debounce_ms = {}

[logging]
; Directory the log file is written to
directory = {}
; Log file name
file = {}
; Default level when RUST_LOG is not set: trace, debug, info, warn, error
level = {}
"#,
        config.requests.debounce_ms,
        config.logging.directory.display(),
        config.logging.file,
        config.logging.level,
    )
}

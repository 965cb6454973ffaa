//! INI parsing: the one place INI key names map to struct fields.

use std::path::PathBuf;

use ini::Ini;

use super::defaults::{LOG_LEVELS, MAX_DEBOUNCE_MS};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
/// Unknown sections and keys are ignored.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    if let Some(section) = ini.section(Some("requests")) {
        if let Some(v) = section.get("debounce_ms") {
            let debounce_ms: u64 = v.trim().parse().map_err(|_| invalid(
                "requests",
                "debounce_ms",
                v,
                "must be a whole number of milliseconds",
            ))?;
            if debounce_ms > MAX_DEBOUNCE_MS {
                return Err(invalid(
                    "requests",
                    "debounce_ms",
                    v,
                    &format!("must be at most {}", MAX_DEBOUNCE_MS),
                ));
            }
            config.requests.debounce_ms = debounce_ms;
        }
    }

    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = PathBuf::from(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if v.contains(['/', '\\']) {
                return Err(invalid("logging", "file", v, "must be a file name, not a path"));
            }
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
        if let Some(v) = section.get("level") {
            let level = v.trim().to_lowercase();
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(invalid(
                    "logging",
                    "level",
                    v,
                    "must be one of: trace, debug, info, warn, error",
                ));
            }
            config.logging.level = level;
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

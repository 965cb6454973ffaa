//! Request coordination settings.

use std::time::Duration;

use super::defaults::DEFAULT_DEBOUNCE_MS;

/// Configuration for an [`AsyncRequestCoordinator`](crate::request::AsyncRequestCoordinator).
///
/// # Example
///
/// ```
/// use eoview::config::RequestConfig;
/// use std::time::Duration;
///
/// let config = RequestConfig::new().with_debounce_ms(250);
/// assert_eq!(config.debounce(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestConfig {
    /// Quiet period before a request is dispatched (in milliseconds)
    debounce_ms: u64,
}

impl RequestConfig {
    /// Create a new request configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trailing debounce in milliseconds.
    ///
    /// Calls arriving within this window of each other collapse into one
    /// dispatch with the last parameters. Default: 0 (no debounce).
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Get the debounce in milliseconds.
    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    /// Get the debounce as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

//! Configuration.
//!
//! - [`RequestConfig`]: builder-style settings handed to a request
//!   coordinator.
//! - [`ConfigFile`]: the user's `config.ini`, loaded with defaults for every
//!   missing value and validated on load.
//!
//! # Example
//!
//! ```no_run
//! use eoview::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let request_config = config.requests.to_request_config();
//! # Ok::<(), eoview::config::ConfigFileError>(())
//! ```

pub mod defaults;
mod file;
mod parser;
mod request;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use request::RequestConfig;
pub use settings::{ConfigFile, LoggingSettings, RequestSettings};

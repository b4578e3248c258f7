//! Parsing and validation of `weft.toml` IR configuration files.
//!
//! The configuration tunes the context: how many errors to accumulate before
//! giving up, how diagnostics are coloured, whether duplicate connections are
//! reported, and which library namespaces exist from the start.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;

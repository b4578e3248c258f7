//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::WeftConfig;
use std::path::Path;

/// Name of the configuration file looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "weft.toml";

/// Loads and validates `<dir>/weft.toml`.
pub fn load_config(dir: &Path) -> Result<WeftConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&path)
        .map_err(|source| ConfigError::IoError { path, source })?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<WeftConfig, ConfigError> {
    let config: WeftConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &WeftConfig) -> Result<(), ConfigError> {
    if config.errors.max_errors == 0 {
        return Err(ConfigError::ValidationError(
            "errors.max_errors must be at least 1".to_string(),
        ));
    }
    for name in &config.libraries.preload {
        if name.is_empty() {
            return Err(ConfigError::ValidationError(
                "libraries.preload contains an empty namespace name".to_string(),
            ));
        }
        if name.contains('.') {
            return Err(ConfigError::ValidationError(format!(
                "namespace name `{name}` must not contain '.'"
            )));
        }
    }
    Ok(())
}

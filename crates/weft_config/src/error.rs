//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a `weft.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    IoError {
        /// The file that was looked up.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 2".to_string());
        assert_eq!(
            err.to_string(),
            "failed to parse configuration: expected '=' at line 2"
        );
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("errors.max_errors must be at least 1".into());
        assert_eq!(
            err.to_string(),
            "validation error: errors.max_errors must be at least 1"
        );
    }

    #[test]
    fn display_io_error() {
        let err = ConfigError::IoError {
            path: PathBuf::from("lib/weft.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "failed to read lib/weft.toml: missing");
    }
}

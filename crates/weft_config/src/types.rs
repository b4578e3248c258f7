//! Configuration types deserialized from `weft.toml`.

use serde::Deserialize;

/// Default error limit, matching the number of independent diagnostics a
/// user can reasonably read in one report.
pub const DEFAULT_MAX_ERRORS: usize = 8;

/// The top-level configuration. Every table is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeftConfig {
    /// Error accumulation and rendering.
    #[serde(default)]
    pub errors: ErrorConfig,
    /// Connection bookkeeping.
    #[serde(default)]
    pub connections: ConnectionConfig,
    /// Library namespaces.
    #[serde(default)]
    pub libraries: LibraryConfig,
}

/// The `[errors]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorConfig {
    /// Number of accumulated errors that terminates the build.
    #[serde(default = "default_max_errors")]
    pub max_errors: usize,
    /// Use ANSI colour when rendering diagnostics.
    #[serde(default)]
    pub color: bool,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            max_errors: DEFAULT_MAX_ERRORS,
            color: false,
        }
    }
}

fn default_max_errors() -> usize {
    DEFAULT_MAX_ERRORS
}

/// The `[connections]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Emit a warning when the same pair is connected twice.
    #[serde(default)]
    pub warn_on_duplicate: bool,
}

/// The `[libraries]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Namespaces created together with the context, in order.
    #[serde(default)]
    pub preload: Vec<String>,
}

//! The boundary to on-disk formats.
//!
//! The IR does not define a file format. Loaders and writers implement
//! [`ModuleSerializer`] against the public [`Context`] API.

use crate::context::Context;
use crate::ids::ModuleId;
use std::path::Path;
use thiserror::Error;

/// Errors from loading or saving modules.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// Reading or writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file contents could not be understood.
    #[error("format error: {0}")]
    Format(String),
}

/// Reads modules into a context and writes them back out.
pub trait ModuleSerializer {
    /// Loads the module stored at `path` into `ctx`, registering it (and
    /// whatever it needs) in the appropriate namespaces.
    fn load_module(&self, ctx: &mut Context, path: &Path) -> Result<ModuleId, SerializeError>;

    /// Writes `module` and its body to `path`.
    fn save_module(&self, ctx: &Context, module: ModuleId, path: &Path) -> Result<(), SerializeError>;
}

//! Multi-line diagnostic messages.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A structured diagnostic.
///
/// The headline `message` is followed by `notes` in the order they were added;
/// together they form the message lines of the report. A `fatal` diagnostic
/// stops the build as soon as it is reported, regardless of the error limit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level.
    pub severity: Severity,
    /// Stable code identifying the kind of problem.
    pub code: DiagnosticCode,
    /// The headline.
    pub message: String,
    /// Additional message lines.
    pub notes: Vec<String>,
    /// Actionable suggestions.
    pub help: Vec<String>,
    /// Whether reporting this diagnostic terminates the build.
    pub fatal: bool,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, code, message)
    }

    /// Creates a warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, code, message)
    }

    fn with_severity(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            notes: Vec::new(),
            help: Vec::new(),
            fatal: false,
        }
    }

    /// Appends a message line.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Appends a help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    /// Marks this diagnostic as fatal.
    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    /// The headline followed by every note, in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.message.as_str()).chain(self.notes.iter().map(String::as_str))
    }
}

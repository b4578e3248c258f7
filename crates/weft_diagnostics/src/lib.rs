//! Structured diagnostics for the weft IR.
//!
//! A [`Diagnostic`] is a multi-line message with a severity, a stable code and
//! a fatal flag. The [`DiagnosticSink`] accumulates diagnostics and tracks the
//! error limit; [`TerminalRenderer`] turns them into human-readable blocks.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::{DiagnosticSink, Escalation};

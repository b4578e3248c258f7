//! Diagnostic accumulator with an error limit.

use crate::diagnostic::Diagnostic;
use std::cell::{Cell, RefCell};

/// What the caller must do after emitting a diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Escalation {
    /// Keep going.
    Continue,
    /// The diagnostic was fatal.
    Fatal,
    /// The number of errors reached the configured limit.
    LimitReached,
}

impl Escalation {
    /// Returns `true` unless this is [`Continue`](Escalation::Continue).
    pub fn must_stop(self) -> bool {
        self != Escalation::Continue
    }
}

/// Accumulates diagnostics for one compilation.
///
/// Emission goes through `&self` so that any holder of a shared reference to
/// the owning context can report. Not thread-safe.
pub struct DiagnosticSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
    error_count: Cell<usize>,
    max_errors: usize,
}

impl DiagnosticSink {
    /// Creates an empty sink that escalates once `max_errors` errors are held.
    ///
    /// A limit of zero is treated as one.
    pub fn new(max_errors: usize) -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            error_count: Cell::new(0),
            max_errors: max_errors.max(1),
        }
    }

    /// Stores a diagnostic and reports whether the build has to stop.
    ///
    /// Fatality is checked before the limit, and only errors count toward it.
    pub fn emit(&self, diag: Diagnostic) -> Escalation {
        let fatal = diag.fatal;
        if diag.severity.is_error() {
            self.error_count.set(self.error_count.get() + 1);
        }
        self.diagnostics.borrow_mut().push(diag);
        if fatal {
            Escalation::Fatal
        } else if self.error_count.get() >= self.max_errors {
            Escalation::LimitReached
        } else {
            Escalation::Continue
        }
    }

    /// Returns `true` if any error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.get() > 0
    }

    /// Number of errors emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.get()
    }

    /// The configured error limit.
    pub fn max_errors(&self) -> usize {
        self.max_errors
    }

    /// Number of diagnostics of any severity held by the sink.
    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    /// Returns `true` if nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }

    /// Returns a snapshot of all accumulated diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Takes all accumulated diagnostics and resets the error count.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        self.error_count.set(0);
        self.diagnostics.take()
    }
}

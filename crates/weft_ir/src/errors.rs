//! Diagnostic codes, constructor helpers and error types for the IR.
//!
//! Error codes `E300`--`E308` cover recoverable IR construction failures
//! (cross-module connections, name clashes, link mismatches). `W300` is the
//! optional duplicate-connection warning. Lookup and selection failures that
//! the caller can handle directly are plain `Result` errors instead.

use crate::args::ParamMismatch;
use thiserror::Error;
use weft_diagnostics::{Category, Diagnostic, DiagnosticCode};

/// Connection between wireables of different module definitions.
pub const E300: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 300,
};

/// Namespace name already registered.
pub const E301: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 301,
};

/// Declaration and definition disagree on type or parameters while linking.
pub const E302: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 302,
};

/// Both sides of a link provide a module body.
pub const E303: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 303,
};

/// A module is linked against a generator or vice versa.
pub const E304: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 304,
};

/// Circular instantiation detected after linking.
pub const E305: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 305,
};

/// A namespace linked into itself.
pub const E306: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 306,
};

/// Module or generator name already used in its namespace.
pub const E307: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 307,
};

/// Generator arguments do not match the generator's parameters.
pub const E308: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 308,
};

/// The same pair of wireables connected twice.
pub const W300: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 300,
};

/// One side of a rejected connection: its path and the module owning it.
pub struct Endpoint<'a> {
    /// Dotted path of the wireable.
    pub path: &'a str,
    /// Name of the module whose definition holds it.
    pub owner: &'a str,
}

/// Creates a diagnostic for a connection across module definitions.
pub fn error_container_mismatch(this_def: &str, a: Endpoint<'_>, b: Endpoint<'_>) -> Diagnostic {
    Diagnostic::error(E300, "connections can only occur within the same module")
        .with_note(format!("This ModuleDef: {this_def}"))
        .with_note(format!("ModuleDef of {}: {}", a.path, a.owner))
        .with_note(format!("ModuleDef of {}: {}", b.path, b.owner))
}

/// Creates a diagnostic for a namespace registered twice.
pub fn error_duplicate_namespace(name: &str) -> Diagnostic {
    Diagnostic::error(E301, format!("namespace `{name}` already exists"))
        .with_help("use `get_namespace` to reuse the existing namespace")
}

/// Creates a diagnostic for a link between entities of different signatures.
pub fn error_link_signature(qualified: &str, what: &str, decl: &str, def: &str) -> Diagnostic {
    Diagnostic::error(E302, format!("cannot link `{qualified}`: {what} differ"))
        .with_note(format!("declared: {decl}"))
        .with_note(format!("defined:  {def}"))
}

/// Creates a diagnostic for a link where both modules already have a body.
pub fn error_duplicate_definition(qualified: &str) -> Diagnostic {
    Diagnostic::error(E303, format!("module `{qualified}` is defined in both libraries"))
}

/// Creates a diagnostic for a module linked against a generator.
pub fn error_link_kind(qualified: &str, decl_kind: &str, def_kind: &str) -> Diagnostic {
    Diagnostic::error(
        E304,
        format!("cannot link `{qualified}`: declared as {decl_kind}, defined as {def_kind}"),
    )
}

/// Creates a diagnostic for a cycle in the instantiation graph.
pub fn error_cyclic_instantiation(qualified: &str) -> Diagnostic {
    Diagnostic::error(
        E305,
        format!("circular instantiation of module `{qualified}`"),
    )
    .with_note("the module directly or indirectly instantiates itself")
}

/// Creates a diagnostic for a namespace linked into itself.
pub fn error_self_link(name: &str) -> Diagnostic {
    Diagnostic::error(E306, format!("cannot link namespace `{name}` into itself"))
}

/// Creates a diagnostic for a module or generator name clash.
pub fn error_duplicate_name(namespace: &str, name: &str) -> Diagnostic {
    Diagnostic::error(
        E307,
        format!("`{name}` is already defined in namespace `{namespace}`"),
    )
}

/// Creates a diagnostic for generator arguments that do not fit the signature.
pub fn error_generator_args(generator: &str, instance: &str, problems: &[ParamMismatch]) -> Diagnostic {
    let mut diag = Diagnostic::error(
        E308,
        format!("instance `{instance}` has invalid arguments for generator `{generator}`"),
    );
    for problem in problems {
        diag = diag.with_note(problem.to_string());
    }
    diag
}

/// Creates a warning for a repeated connection.
pub fn warn_duplicate_connection(a: &str, b: &str) -> Diagnostic {
    Diagnostic::warning(W300, format!("`{a}` and `{b}` are already connected"))
        .with_help("the second connection has no effect")
}

/// Failure to resolve a `"namespace.name"` reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The reference is not of the form `namespace.name`.
    #[error("malformed reference `{0}`, expected `namespace.name`")]
    MalformedReference(String),
    /// No namespace with that name exists.
    #[error("unknown namespace `{0}`")]
    UnknownNamespace(String),
    /// The namespace exists but holds no such module or generator.
    #[error("`{name}` not found in namespace `{namespace}`")]
    UnknownName {
        /// The namespace searched.
        namespace: String,
        /// The missing name.
        name: String,
    },
}

/// Failure to resolve a selection path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// The path was empty.
    #[error("empty selection path")]
    EmptyPath,
    /// A path segment was empty, as in `u0..out`. Holds the path before it.
    #[error("empty path segment after `{0}`")]
    EmptySegment(String),
    /// The first segment names no instance.
    #[error("cannot find instance `{0}`")]
    UnknownInstance(String),
    /// A segment does not exist in the parent's type.
    #[error("cannot select `{segment}` from `{path}` of type {ty}")]
    NotSelectable {
        /// Dotted path of the parent.
        path: String,
        /// The offending segment.
        segment: String,
        /// Rendered parent type.
        ty: String,
    },
}

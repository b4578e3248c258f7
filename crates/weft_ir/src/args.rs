//! Argument values, argument records, parameter signatures and record layouts.
//!
//! All of these are immutable once built and owned by the context's
//! [`ArgStore`]. [`Args`] records are hash-consed: building the same mapping
//! twice yields the same [`ArgsId`].

use crate::arena::Arena;
use crate::ids::{ArgId, ArgsId, ParamsId, RecordParamsId, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A single argument value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arg {
    /// An integer.
    Int(i64),
    /// A string.
    Str(String),
    /// A type.
    Type(TypeId),
}

impl Arg {
    /// The tag of this argument.
    pub fn kind(&self) -> ArgKind {
        match self {
            Arg::Int(_) => ArgKind::Int,
            Arg::Str(_) => ArgKind::Str,
            Arg::Type(_) => ArgKind::Type,
        }
    }
}

/// The kind of value a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgKind {
    /// Accepts [`Arg::Int`].
    Int,
    /// Accepts [`Arg::Str`].
    Str,
    /// Accepts [`Arg::Type`].
    Type,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKind::Int => write!(f, "int"),
            ArgKind::Str => write!(f, "string"),
            ArgKind::Type => write!(f, "type"),
        }
    }
}

/// A name → argument mapping. Keys are unique; order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Args {
    entries: BTreeMap<String, Arg>,
}

impl Args {
    /// Returns the argument bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.entries.get(name)
    }

    /// Convenience accessor for integer arguments.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.entries.get(name) {
            Some(Arg::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Iterates over `(name, arg)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arg)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders as `(name:value, ...)`, with `render_type` used for type arguments.
    pub fn render(&self, render_type: impl Fn(TypeId) -> String) -> String {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(name, arg)| match arg {
                Arg::Int(i) => format!("{name}:{i}"),
                Arg::Str(s) => format!("{name}:{s:?}"),
                Arg::Type(t) => format!("{name}:{}", render_type(*t)),
            })
            .collect();
        format!("({})", parts.join(", "))
    }
}

/// A parameter signature: name → accepted argument kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    entries: BTreeMap<String, ArgKind>,
}

/// One way an [`Args`] record can fail to match a [`Params`] signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamMismatch {
    /// A parameter has no argument.
    Missing(String),
    /// An argument matches no parameter.
    Unexpected(String),
    /// An argument has the wrong kind.
    WrongKind {
        /// The parameter name.
        name: String,
        /// The declared kind.
        expected: ArgKind,
        /// The supplied kind.
        found: ArgKind,
    },
}

impl fmt::Display for ParamMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamMismatch::Missing(name) => write!(f, "missing argument `{name}`"),
            ParamMismatch::Unexpected(name) => write!(f, "unexpected argument `{name}`"),
            ParamMismatch::WrongKind {
                name,
                expected,
                found,
            } => write!(f, "argument `{name}` should be {expected}, found {found}"),
        }
    }
}

impl Params {
    /// The kind declared for `name`.
    pub fn get(&self, name: &str) -> Option<ArgKind> {
        self.entries.get(name).copied()
    }

    /// Iterates over `(name, kind)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ArgKind)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the signature is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lists every way `args` fails to match this signature, in name order.
    pub fn check(&self, args: &Args) -> Vec<ParamMismatch> {
        let mut out = Vec::new();
        for (name, expected) in &self.entries {
            match args.get(name) {
                None => out.push(ParamMismatch::Missing(name.clone())),
                Some(arg) if arg.kind() != *expected => out.push(ParamMismatch::WrongKind {
                    name: name.clone(),
                    expected: *expected,
                    found: arg.kind(),
                }),
                Some(_) => {}
            }
        }
        for (name, _) in args.iter() {
            if !self.entries.contains_key(name) {
                out.push(ParamMismatch::Unexpected(name.to_string()));
            }
        }
        out
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(name, kind)| format!("{name}:{kind}"))
            .collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// Ordered record fields with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordParams {
    fields: Vec<(String, TypeId)>,
}

impl RecordParams {
    /// Fields in declaration order.
    pub fn fields(&self) -> &[(String, TypeId)] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Owner of every argument object created through a context.
#[derive(Debug, Default)]
pub struct ArgStore {
    args: Arena<ArgId, Arg>,
    records: Arena<ArgsId, Args>,
    record_lookup: HashMap<Args, ArgsId>,
    params: Arena<ParamsId, Params>,
    record_params: Arena<RecordParamsId, RecordParams>,
}

impl ArgStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a single argument value.
    pub fn alloc_arg(&mut self, arg: Arg) -> ArgId {
        self.args.alloc(arg)
    }

    /// Returns an argument value.
    pub fn arg(&self, id: ArgId) -> &Arg {
        &self.args[id]
    }

    /// Builds an [`Args`] record from `(name, value)` pairs and interns it.
    /// A repeated name keeps the last value.
    pub fn alloc_args<S: Into<String>>(&mut self, entries: impl IntoIterator<Item = (S, ArgId)>) -> ArgsId {
        let entries = entries
            .into_iter()
            .map(|(name, id)| (name.into(), self.args[id].clone()))
            .collect();
        self.intern_args(Args { entries })
    }

    /// Interns an already-built record.
    pub fn intern_args(&mut self, args: Args) -> ArgsId {
        if let Some(&id) = self.record_lookup.get(&args) {
            return id;
        }
        let id = self.records.alloc(args.clone());
        self.record_lookup.insert(args, id);
        id
    }

    /// Returns an argument record.
    pub fn args(&self, id: ArgsId) -> &Args {
        &self.records[id]
    }

    /// Allocates a parameter signature. A repeated name keeps the last kind.
    pub fn alloc_params<S: Into<String>>(&mut self, entries: impl IntoIterator<Item = (S, ArgKind)>) -> ParamsId {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.params.alloc(Params { entries })
    }

    /// Returns a parameter signature.
    pub fn params(&self, id: ParamsId) -> &Params {
        &self.params[id]
    }

    /// Allocates an ordered field list.
    ///
    /// # Panics
    ///
    /// Panics if a field name appears twice.
    pub fn alloc_record_params<S: Into<String>>(
        &mut self,
        fields: impl IntoIterator<Item = (S, TypeId)>,
    ) -> RecordParamsId {
        let mut out: Vec<(String, TypeId)> = Vec::new();
        for (name, ty) in fields {
            let name = name.into();
            assert!(
                out.iter().all(|(existing, _)| *existing != name),
                "duplicate record field `{name}`"
            );
            out.push((name, ty));
        }
        self.record_params.alloc(RecordParams { fields: out })
    }

    /// Returns an ordered field list.
    pub fn record_params(&self, id: RecordParamsId) -> &RecordParams {
        &self.record_params[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_interned_by_content() {
        let mut store = ArgStore::new();
        let w1 = store.alloc_arg(Arg::Int(16));
        let w2 = store.alloc_arg(Arg::Int(16));
        assert_ne!(w1, w2);
        let a = store.alloc_args([("width", w1)]);
        let b = store.alloc_args([("width", w2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn args_order_insensitive() {
        let mut store = ArgStore::new();
        let w = store.alloc_arg(Arg::Int(4));
        let n = store.alloc_arg(Arg::Str("acc".into()));
        let a = store.alloc_args([("width", w), ("name", n)]);
        let b = store.alloc_args([("name", n), ("width", w)]);
        assert_eq!(a, b);
        assert_eq!(store.args(a).len(), 2);
        assert_eq!(store.args(a).get_int("width"), Some(4));
    }

    #[test]
    fn empty_args_record() {
        let mut store = ArgStore::new();
        let empty: [(&str, ArgId); 0] = [];
        let a = store.alloc_args(empty);
        assert!(store.args(a).is_empty());
        assert_eq!(store.args(a).render(|_| String::new()), "()");
    }

    #[test]
    fn render_quotes_strings() {
        let mut store = ArgStore::new();
        let w = store.alloc_arg(Arg::Int(8));
        let s = store.alloc_arg(Arg::Str("rst".into()));
        let t = store.alloc_arg(Arg::Type(TypeId::from_raw(0)));
        let a = store.alloc_args([("width", w), ("name", s), ("ty", t)]);
        let rendered = store.args(a).render(|_| "Bit".to_string());
        assert_eq!(rendered, "(name:\"rst\", ty:Bit, width:8)");
    }

    #[test]
    fn params_check_reports_everything() {
        let mut store = ArgStore::new();
        let p = store.alloc_params([("width", ArgKind::Int), ("init", ArgKind::Int), ("ty", ArgKind::Type)]);
        let w = store.alloc_arg(Arg::Int(8));
        let s = store.alloc_arg(Arg::Str("x".into()));
        let e = store.alloc_arg(Arg::Int(1));
        let a = store.alloc_args([("width", w), ("init", s), ("extra", e)]);
        let problems = store.params(p).check(store.args(a));
        assert_eq!(
            problems,
            vec![
                ParamMismatch::WrongKind {
                    name: "init".into(),
                    expected: ArgKind::Int,
                    found: ArgKind::Str,
                },
                ParamMismatch::Missing("ty".into()),
                ParamMismatch::Unexpected("extra".into()),
            ]
        );
    }

    #[test]
    fn params_check_accepts_exact_match() {
        let mut store = ArgStore::new();
        let p = store.alloc_params([("width", ArgKind::Int)]);
        let w = store.alloc_arg(Arg::Int(8));
        let a = store.alloc_args([("width", w)]);
        assert!(store.params(p).check(store.args(a)).is_empty());
    }

    #[test]
    fn record_params_keep_order() {
        let mut store = ArgStore::new();
        let rp = store.alloc_record_params([("valid", TypeId::from_raw(0)), ("data", TypeId::from_raw(1))]);
        let names: Vec<_> = store.record_params(rp).fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["valid", "data"]);
    }

    #[test]
    #[should_panic(expected = "duplicate record field `a`")]
    fn record_params_reject_duplicates() {
        let mut store = ArgStore::new();
        store.alloc_record_params([("a", TypeId::from_raw(0)), ("a", TypeId::from_raw(1))]);
    }

    #[test]
    fn params_display() {
        let mut store = ArgStore::new();
        let p = store.alloc_params([("width", ArgKind::Int), ("ty", ArgKind::Type)]);
        assert_eq!(store.params(p).to_string(), "(ty:type, width:int)");
    }

    #[test]
    fn mismatch_display() {
        let m = ParamMismatch::WrongKind {
            name: "w".into(),
            expected: ArgKind::Int,
            found: ArgKind::Type,
        };
        assert_eq!(m.to_string(), "argument `w` should be int, found type");
    }
}

//! WeftIR: a typed, hierarchical netlist representation for hardware tools.
//!
//! A [`Context`] owns canonical [`Type`]s, argument records, namespaces of
//! [`Module`]s and [`Generator`]s, and the diagnostics raised while building
//! them. A [`ModuleDef`] is the body of a module: named instances wired
//! together through [`Wireable`] endpoints selected by path.

#![warn(missing_docs)]

pub mod arena;
pub mod args;
pub mod bulk;
pub mod context;
pub mod errors;
pub mod ids;
pub mod instance_order;
pub mod link;
pub mod module;
pub mod module_def;
pub mod namespace;
pub mod sel_cache;
pub mod serialize;
pub mod types;
pub mod wireable;

pub use args::{Arg, ArgKind, Args, ParamMismatch, Params, RecordParams};
pub use bulk::BulkArray;
pub use context::{Context, GLOBAL_NAMESPACE};
pub use errors::{LookupError, SelectError};
pub use ids::*;
pub use module::{Generator, GeneratorExpander, Module};
pub use module_def::ModuleDef;
pub use namespace::{Instantiable, Namespace};
pub use serialize::{ModuleSerializer, SerializeError};
pub use types::{Type, TypeDb};
pub use wireable::{Connection, InstanceBinding, SelectPath, Wireable, WireableId, WireableKind, SELF_NAME};

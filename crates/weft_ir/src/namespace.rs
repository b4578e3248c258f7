//! Named registries of modules, generators and named types.

use crate::ids::{GeneratorId, ModuleId, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Something an instance can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instantiable {
    /// A concrete module.
    Module(ModuleId),
    /// A parametric generator.
    Generator(GeneratorId),
}

/// A namespace. Modules and generators share one name space; named types
/// have their own.
#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    entries: BTreeMap<String, Instantiable>,
    named_types: BTreeMap<String, TypeId>,
}

impl Namespace {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
            named_types: BTreeMap::new(),
        }
    }

    /// The namespace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a module or generator.
    pub fn lookup(&self, name: &str) -> Option<Instantiable> {
        self.entries.get(name).copied()
    }

    /// Registers an entity. Returns `false` (and changes nothing) if the name
    /// is already taken.
    pub fn register(&mut self, name: &str, entity: Instantiable) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_string(), entity);
        true
    }

    /// All modules and generators, in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Instantiable)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// All modules, in name order.
    pub fn modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.entries.values().filter_map(|e| match e {
            Instantiable::Module(m) => Some(*m),
            Instantiable::Generator(_) => None,
        })
    }

    /// All generators, in name order.
    pub fn generators(&self) -> impl Iterator<Item = GeneratorId> + '_ {
        self.entries.values().filter_map(|e| match e {
            Instantiable::Generator(g) => Some(*g),
            Instantiable::Module(_) => None,
        })
    }

    /// The raw structure behind a named type.
    pub fn named_type(&self, name: &str) -> Option<TypeId> {
        self.named_types.get(name).copied()
    }

    /// Registers the raw structure of a named type. Returns `false` if the
    /// name is already taken.
    pub fn register_named_type(&mut self, name: &str, raw: TypeId) -> bool {
        if self.named_types.contains_key(name) {
            return false;
        }
        self.named_types.insert(name.to_string(), raw);
        true
    }
}

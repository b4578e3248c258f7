//! Addressable endpoints inside a module definition.
//!
//! A wireable is the module interface (`self`), an instance, or a select
//! (`parent.segment`). Selects hang off their parent in a tree rooted at the
//! interface or an instance. Peers are tracked symmetrically by the owning
//! [`ModuleDef`](crate::module_def::ModuleDef); nothing else mutates them.

use crate::ids::{ArgsId, DefId, GeneratorId, ModuleId, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Path segments from the interface or an instance down to one port.
pub type SelectPath = Vec<String>;

/// The name used for the module interface in paths.
pub const SELF_NAME: &str = "self";

/// Handle to a wireable: the definition that owns it plus its slot there.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct WireableId {
    def: DefId,
    index: u32,
}

impl WireableId {
    pub(crate) fn new(def: DefId, index: u32) -> Self {
        Self { def, index }
    }

    /// The definition that owns this wireable.
    pub fn def(self) -> DefId {
        self.def
    }

    /// Slot index within the owning definition.
    pub fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Display for WireableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/w{}", self.def, self.index)
    }
}

/// What an instance instantiates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceBinding {
    /// A concrete module with configuration arguments.
    Module {
        /// The instantiated module.
        module: ModuleId,
        /// Configuration arguments.
        config: ArgsId,
    },
    /// A generator, expanded later by an external collaborator.
    Generator {
        /// The generator.
        generator: GeneratorId,
        /// Generator arguments.
        gen_args: ArgsId,
        /// Configuration arguments.
        config: ArgsId,
    },
}

impl InstanceBinding {
    /// Returns `true` for the deferred generator form.
    pub fn is_generator(&self) -> bool {
        matches!(self, InstanceBinding::Generator { .. })
    }

    /// Configuration arguments, present in both forms.
    pub fn config(&self) -> ArgsId {
        match self {
            InstanceBinding::Module { config, .. } | InstanceBinding::Generator { config, .. } => {
                *config
            }
        }
    }
}

/// The three wireable variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireableKind {
    /// The module boundary.
    Interface,
    /// One use of a sub-circuit.
    Instance {
        /// Instance name, unique within the definition.
        name: String,
        /// What the instance refers to.
        binding: InstanceBinding,
    },
    /// `parent.segment`.
    Select {
        /// The wireable this was selected from.
        parent: WireableId,
        /// Field name or array index.
        segment: String,
    },
}

/// A node in a definition's wireable table.
#[derive(Debug, Clone)]
pub struct Wireable {
    id: WireableId,
    kind: WireableKind,
    ty: Option<TypeId>,
    path: SelectPath,
    selects: Vec<WireableId>,
    connected: BTreeSet<WireableId>,
}

impl Wireable {
    pub(crate) fn new(id: WireableId, kind: WireableKind, ty: Option<TypeId>, path: SelectPath) -> Self {
        Self {
            id,
            kind,
            ty,
            path,
            selects: Vec::new(),
            connected: BTreeSet::new(),
        }
    }

    /// This wireable's handle.
    pub fn id(&self) -> WireableId {
        self.id
    }

    /// The owning definition, i.e. the container.
    pub fn container(&self) -> DefId {
        self.id.def
    }

    /// The variant.
    pub fn kind(&self) -> &WireableKind {
        &self.kind
    }

    /// The type, or `None` for an instance of a generator whose type is not
    /// known yet (and anything selected from it).
    pub fn ty(&self) -> Option<TypeId> {
        self.ty
    }

    /// Hierarchical path, starting with `self` or the instance name.
    pub fn path(&self) -> &SelectPath {
        &self.path
    }

    /// Dotted rendering of [`path`](Self::path).
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Children selected so far, in creation order.
    pub fn selects(&self) -> &[WireableId] {
        &self.selects
    }

    /// Currently connected peers.
    pub fn connected(&self) -> &BTreeSet<WireableId> {
        &self.connected
    }

    /// Returns `true` for the interface.
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, WireableKind::Interface)
    }

    /// The instance name, if this is an instance.
    pub fn instance_name(&self) -> Option<&str> {
        match &self.kind {
            WireableKind::Instance { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The instance binding, if this is an instance.
    pub fn binding(&self) -> Option<&InstanceBinding> {
        match &self.kind {
            WireableKind::Instance { binding, .. } => Some(binding),
            _ => None,
        }
    }

    pub(crate) fn push_select(&mut self, child: WireableId) {
        self.selects.push(child);
    }

    pub(crate) fn add_connected(&mut self, peer: WireableId) {
        self.connected.insert(peer);
    }

    pub(crate) fn remove_connected(&mut self, peer: WireableId) {
        self.connected.remove(&peer);
    }
}

/// An unordered pair of wireables in one definition.
///
/// The endpoints are stored in ascending handle order, so `(a, b)` and
/// `(b, a)` build the same value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Connection {
    first: WireableId,
    second: WireableId,
}

impl Connection {
    /// Canonicalizes the pair.
    pub fn new(a: WireableId, b: WireableId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// The lower endpoint.
    pub fn first(&self) -> WireableId {
        self.first
    }

    /// The higher endpoint.
    pub fn second(&self) -> WireableId {
        self.second
    }

    /// Returns `true` if `w` is one of the endpoints.
    pub fn touches(&self, w: WireableId) -> bool {
        self.first == w || self.second == w
    }
}

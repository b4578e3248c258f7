//! Modules, generators, and the generator-expansion boundary.

use crate::args::Args;
use crate::context::Context;
use crate::ids::{NamespaceId, ParamsId, TypeId};
use crate::module_def::ModuleDef;
use std::fmt;
use std::rc::Rc;

/// A named circuit with a fixed interface type and at most one body.
#[derive(Debug)]
pub struct Module {
    pub(crate) name: String,
    pub(crate) namespace: NamespaceId,
    pub(crate) ty: TypeId,
    pub(crate) config_params: ParamsId,
    pub(crate) def: Option<ModuleDef>,
}

impl Module {
    /// The module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace that owns this module.
    pub fn namespace(&self) -> NamespaceId {
        self.namespace
    }

    /// The interface type, as seen from outside.
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// Configuration parameter signature.
    pub fn config_params(&self) -> ParamsId {
        self.config_params
    }

    /// The body, if this module is defined rather than only declared.
    pub fn def(&self) -> Option<&ModuleDef> {
        self.def.as_ref()
    }

    /// Returns `true` if the module has a body.
    pub fn has_def(&self) -> bool {
        self.def.is_some()
    }
}

/// Turns a generator plus arguments into something concrete.
///
/// Implemented outside the core. The core only asks for
/// [`module_type`](Self::module_type) so that generator instances get typed
/// ports; [`expand_def`](Self::expand_def) is for passes that flatten or
/// elaborate generators.
pub trait GeneratorExpander {
    /// The interface type of the module `args` would produce.
    fn module_type(&self, ctx: &Context, args: &Args) -> TypeId;

    /// Fills `def` with the body `args` would produce.
    fn expand_def(&self, ctx: &Context, def: &mut ModuleDef, args: &Args);
}

/// A parametric producer of modules.
pub struct Generator {
    pub(crate) name: String,
    pub(crate) namespace: NamespaceId,
    pub(crate) params: ParamsId,
    pub(crate) expander: Option<Rc<dyn GeneratorExpander>>,
}

impl Generator {
    /// The generator name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace that owns this generator.
    pub fn namespace(&self) -> NamespaceId {
        self.namespace
    }

    /// Generator parameter signature.
    pub fn params(&self) -> ParamsId {
        self.params
    }

    /// The linked expander, if any.
    pub fn expander(&self) -> Option<Rc<dyn GeneratorExpander>> {
        self.expander.clone()
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("params", &self.params)
            .field("has_expander", &self.expander.is_some())
            .finish()
    }
}

//! The owner of every long-lived IR object.
//!
//! A [`Context`] holds the type cache, the argument store, namespaces with
//! their modules and generators, bulk interop arrays and the diagnostic
//! sink. Everything it hands out is an ID into one of its arenas and stays
//! valid until the context is dropped.
//!
//! Type and argument factories take `&self` so that construction can nest
//! (`ctx.array(4, ctx.bit())`); the underlying stores sit behind
//! [`RefCell`]s. Registering namespaces, modules and generators takes
//! `&mut self`.

use crate::args::{Arg, ArgKind, ArgStore, Args, Params, RecordParams};
use crate::arena::Arena;
use crate::bulk::BulkArray;
use crate::errors::{error_duplicate_name, error_duplicate_namespace, LookupError};
use crate::ids::{
    ArgId, ArgsId, BulkArrayId, DefId, GeneratorId, ModuleId, NamespaceId, ParamsId,
    RecordParamsId, TypeId,
};
use crate::module::{Generator, GeneratorExpander, Module};
use crate::module_def::ModuleDef;
use crate::namespace::{Instantiable, Namespace};
use crate::types::{Type, TypeDb};
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;
use weft_common::Interner;
use weft_config::{load_config, ConfigError, WeftConfig};
use weft_diagnostics::{Diagnostic, DiagnosticRenderer, DiagnosticSink, TerminalRenderer};

/// Name of the namespace every context starts with.
pub const GLOBAL_NAMESPACE: &str = "global";

/// Allocator, registry and error authority for one netlist.
pub struct Context {
    config: WeftConfig,
    interner: Interner,
    types: RefCell<TypeDb>,
    args: RefCell<ArgStore>,
    namespaces: Arena<NamespaceId, Namespace>,
    namespace_names: BTreeMap<String, NamespaceId>,
    global: NamespaceId,
    modules: Arena<ModuleId, Module>,
    generators: Arena<GeneratorId, Generator>,
    def_owners: RefCell<Arena<DefId, ModuleId>>,
    bulk: Arena<BulkArrayId, BulkArray>,
    sink: DiagnosticSink,
    renderer: TerminalRenderer,
}

impl Context {
    /// Creates a context with the default configuration.
    pub fn new() -> Self {
        Self::with_config(WeftConfig::default())
    }

    /// Creates a context, the global namespace and every preloaded library
    /// namespace.
    pub fn with_config(config: WeftConfig) -> Self {
        let sink = DiagnosticSink::new(config.errors.max_errors);
        let renderer = TerminalRenderer::new(config.errors.color);
        let mut ctx = Self {
            config,
            interner: Interner::new(),
            types: RefCell::new(TypeDb::new()),
            args: RefCell::new(ArgStore::new()),
            namespaces: Arena::new(),
            namespace_names: BTreeMap::new(),
            global: NamespaceId::from_raw(0),
            modules: Arena::new(),
            generators: Arena::new(),
            def_owners: RefCell::new(Arena::new()),
            bulk: Arena::new(),
            sink,
            renderer,
        };
        ctx.global = ctx.insert_namespace(GLOBAL_NAMESPACE);
        let preload = ctx.config.libraries.preload.clone();
        for name in preload {
            ctx.new_namespace(&name);
        }
        ctx
    }

    /// Creates a context from `<dir>/weft.toml`.
    pub fn from_config_dir(dir: &Path) -> Result<Self, ConfigError> {
        Ok(Self::with_config(load_config(dir)?))
    }

    /// The configuration this context was built with.
    pub fn config(&self) -> &WeftConfig {
        &self.config
    }

    /// The symbol interner used for names inside types.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    // ------------------------------------------------------------------
    // Namespaces
    // ------------------------------------------------------------------

    fn insert_namespace(&mut self, name: &str) -> NamespaceId {
        let id = self.namespaces.alloc(Namespace::new(name));
        self.namespace_names.insert(name.to_string(), id);
        debug!(namespace = name, "created namespace");
        id
    }

    /// The global namespace.
    pub fn global(&self) -> NamespaceId {
        self.global
    }

    /// Creates a namespace. A name already in use is reported as `E301`.
    pub fn new_namespace(&mut self, name: &str) -> Option<NamespaceId> {
        if self.namespace_names.contains_key(name) {
            self.error(error_duplicate_namespace(name));
            return None;
        }
        Some(self.insert_namespace(name))
    }

    /// Looks up a namespace by name.
    pub fn get_namespace(&self, name: &str) -> Option<NamespaceId> {
        self.namespace_names.get(name).copied()
    }

    /// Returns `true` if a namespace called `name` exists.
    pub fn has_namespace(&self, name: &str) -> bool {
        self.namespace_names.contains_key(name)
    }

    /// Returns a namespace.
    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id]
    }

    /// All namespaces in name order.
    pub fn namespaces(&self) -> impl Iterator<Item = (&str, NamespaceId)> {
        self.namespace_names.iter().map(|(k, v)| (k.as_str(), *v))
    }

    // ------------------------------------------------------------------
    // Modules and generators
    // ------------------------------------------------------------------

    /// Declares a module. `config_params` defaults to an empty signature.
    ///
    /// Returns `None` and reports `E307` if the name is taken in `ns`.
    pub fn new_module(
        &mut self,
        ns: NamespaceId,
        name: &str,
        ty: TypeId,
        config_params: Option<ParamsId>,
    ) -> Option<ModuleId> {
        if self.namespaces[ns].lookup(name).is_some() {
            self.error(error_duplicate_name(self.namespaces[ns].name(), name));
            return None;
        }
        let config_params = config_params.unwrap_or_else(|| {
            let empty: [(&str, ArgKind); 0] = [];
            self.new_params(empty)
        });
        let id = self.modules.alloc(Module {
            name: name.to_string(),
            namespace: ns,
            ty,
            config_params,
            def: None,
        });
        self.namespaces[ns].register(name, Instantiable::Module(id));
        debug!(namespace = self.namespaces[ns].name(), module = name, "declared module");
        Some(id)
    }

    /// Declares a generator.
    ///
    /// Returns `None` and reports `E307` if the name is taken in `ns`.
    pub fn new_generator(
        &mut self,
        ns: NamespaceId,
        name: &str,
        params: ParamsId,
        expander: Option<Rc<dyn GeneratorExpander>>,
    ) -> Option<GeneratorId> {
        if self.namespaces[ns].lookup(name).is_some() {
            self.error(error_duplicate_name(self.namespaces[ns].name(), name));
            return None;
        }
        let id = self.generators.alloc(Generator {
            name: name.to_string(),
            namespace: ns,
            params,
            expander,
        });
        self.namespaces[ns].register(name, Instantiable::Generator(id));
        debug!(namespace = self.namespaces[ns].name(), generator = name, "declared generator");
        Some(id)
    }

    /// Attaches or replaces a generator's expander.
    pub fn set_expander(&mut self, generator: GeneratorId, expander: Rc<dyn GeneratorExpander>) {
        self.generators[generator].expander = Some(expander);
    }

    /// Registers `raw` as the structure of the named type `ns.name` and
    /// returns the named type.
    ///
    /// Returns `None` and reports `E307` if the type name is taken in `ns`.
    pub fn new_named_type(&mut self, ns: NamespaceId, name: &str, raw: TypeId) -> Option<TypeId> {
        let ns_name = self.namespaces[ns].name().to_string();
        if !self.namespaces[ns].register_named_type(name, raw) {
            self.error(error_duplicate_name(&ns_name, name));
            return None;
        }
        Some(self.named(&ns_name, name, None))
    }

    /// Returns a module.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// Returns a generator.
    pub fn generator(&self, id: GeneratorId) -> &Generator {
        &self.generators[id]
    }

    /// Resolves `"namespace.name"`.
    pub fn get_instantiable(&self, reference: &str) -> Result<Instantiable, LookupError> {
        let malformed = || LookupError::MalformedReference(reference.to_string());
        let (ns, name) = reference.split_once('.').ok_or_else(malformed)?;
        if ns.is_empty() || name.is_empty() || name.contains('.') {
            return Err(malformed());
        }
        let ns_id = self
            .get_namespace(ns)
            .ok_or_else(|| LookupError::UnknownNamespace(ns.to_string()))?;
        self.namespaces[ns_id]
            .lookup(name)
            .ok_or_else(|| LookupError::UnknownName {
                namespace: ns.to_string(),
                name: name.to_string(),
            })
    }

    /// `namespace.name` of a module or generator.
    pub fn qualified_name(&self, entity: Instantiable) -> String {
        let (ns, name) = match entity {
            Instantiable::Module(m) => (self.modules[m].namespace, &self.modules[m].name),
            Instantiable::Generator(g) => (self.generators[g].namespace, &self.generators[g].name),
        };
        format!("{}.{}", self.namespaces[ns].name(), name)
    }

    // ------------------------------------------------------------------
    // Module definitions
    // ------------------------------------------------------------------

    /// Creates an empty body for `module`. It is not attached until passed
    /// to [`set_def`](Self::set_def).
    pub fn new_module_def(&self, module: ModuleId) -> ModuleDef {
        let id = self.def_owners.borrow_mut().alloc(module);
        let interface_ty = self.flip(self.modules[module].ty);
        ModuleDef::new(id, module, interface_ty)
    }

    /// Attaches `def` to its module, returning the body it replaces.
    ///
    /// # Panics
    ///
    /// Panics if `def` was created for another module.
    pub fn set_def(&mut self, module: ModuleId, def: ModuleDef) -> Option<ModuleDef> {
        assert_eq!(
            def.module(),
            module,
            "definition {} belongs to another module",
            def.id()
        );
        debug!(module = %self.qualified_name(Instantiable::Module(module)), "attached definition");
        self.modules[module].def.replace(def)
    }

    /// Detaches a module's body for editing.
    pub fn take_def(&mut self, module: ModuleId) -> Option<ModuleDef> {
        self.modules[module].def.take()
    }

    /// A module's attached body.
    pub fn def(&self, module: ModuleId) -> Option<&ModuleDef> {
        self.modules[module].def.as_ref()
    }

    /// The module a body was created for.
    pub fn def_owner(&self, def: DefId) -> ModuleId {
        self.def_owners.borrow()[def]
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// The unconstrained type.
    pub fn any(&self) -> TypeId {
        self.types.borrow_mut().intern(Type::Any)
    }

    /// An output bit.
    pub fn bit(&self) -> TypeId {
        self.types.borrow_mut().intern(Type::Bit)
    }

    /// An input bit.
    pub fn bit_in(&self) -> TypeId {
        self.types.borrow_mut().intern(Type::BitIn)
    }

    /// `len` elements of `element`.
    pub fn array(&self, len: u32, element: TypeId) -> TypeId {
        self.types.borrow_mut().intern(Type::Array { len, element })
    }

    /// A record with the given fields, in order.
    pub fn record(&self, fields: RecordParamsId) -> TypeId {
        let fields: Vec<_> = self
            .args
            .borrow()
            .record_params(fields)
            .fields()
            .iter()
            .map(|(name, ty)| (self.interner.intern(name), *ty))
            .collect();
        self.types.borrow_mut().intern(Type::Record { fields })
    }

    /// The named type `namespace.name`, optionally parameterized.
    pub fn named(&self, namespace: &str, name: &str, args: Option<ArgsId>) -> TypeId {
        let ty = Type::Named {
            namespace: self.interner.intern(namespace),
            name: self.interner.intern(name),
            args,
        };
        self.types.borrow_mut().intern(ty)
    }

    /// The flipped type.
    pub fn flip(&self, ty: TypeId) -> TypeId {
        self.types.borrow_mut().flip(ty)
    }

    /// The input view of `ty`.
    pub fn in_(&self, ty: TypeId) -> TypeId {
        self.types.borrow_mut().input(ty)
    }

    /// The output view of `ty`.
    pub fn out(&self, ty: TypeId) -> TypeId {
        self.types.borrow_mut().output(ty)
    }

    /// The structure behind a type handle.
    pub fn type_of(&self, ty: TypeId) -> Type {
        self.types.borrow().get(ty).clone()
    }

    /// The type of `segment` within `ty`: a record field by name, or an
    /// array element by decimal index. Named types are looked through their
    /// registered structure. Returns `None` if `ty` has no such member.
    pub fn select_type(&self, ty: TypeId, segment: &str) -> Option<TypeId> {
        match self.type_of(ty) {
            Type::Record { fields } => {
                let sym = self.interner.get(segment)?;
                fields.iter().find(|(n, _)| *n == sym).map(|(_, t)| *t)
            }
            Type::Array { len, element } => {
                let index: u32 = segment.parse().ok()?;
                (index < len && index.to_string() == segment).then_some(element)
            }
            Type::Named { .. } => {
                let raw = self.named_raw(ty)?;
                self.select_type(raw, segment)
            }
            Type::Flip(_) | Type::In(_) | Type::Out(_) => {
                let (wrapper, inner) = self.types.borrow().unwrap_direction(ty);
                let member = self.select_type(inner, segment)?;
                Some(match wrapper {
                    Some(w) => self.types.borrow_mut().apply_direction(w, member),
                    None => member,
                })
            }
            Type::Any | Type::Bit | Type::BitIn => None,
        }
    }

    fn named_raw(&self, ty: TypeId) -> Option<TypeId> {
        let Type::Named { namespace, name, .. } = self.type_of(ty) else {
            return None;
        };
        let ns = self.get_namespace(self.interner.resolve(namespace))?;
        self.namespaces[ns].named_type(self.interner.resolve(name))
    }

    /// Renders a type, e.g. `{a:Bit, b:Array(4,BitIn)}`.
    pub fn type_to_string(&self, ty: TypeId) -> String {
        match self.type_of(ty) {
            Type::Any => "Any".to_string(),
            Type::Bit => "Bit".to_string(),
            Type::BitIn => "BitIn".to_string(),
            Type::Array { len, element } => format!("Array({len},{})", self.type_to_string(element)),
            Type::Record { fields } => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(n, t)| format!("{}:{}", self.interner.resolve(*n), self.type_to_string(*t)))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Type::Named {
                namespace,
                name,
                args,
            } => {
                let base = format!(
                    "{}.{}",
                    self.interner.resolve(namespace),
                    self.interner.resolve(name)
                );
                match args {
                    Some(a) => format!("{base}{}", self.args_to_string(a)),
                    None => base,
                }
            }
            Type::Flip(inner) => format!("Flip({})", self.type_to_string(inner)),
            Type::In(inner) => format!("In({})", self.type_to_string(inner)),
            Type::Out(inner) => format!("Out({})", self.type_to_string(inner)),
        }
    }

    /// Number of distinct types created so far.
    pub fn type_count(&self) -> usize {
        self.types.borrow().len()
    }

    // ------------------------------------------------------------------
    // Arguments
    // ------------------------------------------------------------------

    /// An integer argument.
    pub fn int_arg(&self, value: i64) -> ArgId {
        self.args.borrow_mut().alloc_arg(Arg::Int(value))
    }

    /// A string argument.
    pub fn str_arg(&self, value: impl Into<String>) -> ArgId {
        self.args.borrow_mut().alloc_arg(Arg::Str(value.into()))
    }

    /// A type argument.
    pub fn type_arg(&self, ty: TypeId) -> ArgId {
        self.args.borrow_mut().alloc_arg(Arg::Type(ty))
    }

    /// Returns an argument value.
    pub fn arg(&self, id: ArgId) -> Arg {
        self.args.borrow().arg(id).clone()
    }

    /// Builds an argument record. Equal records share one ID.
    pub fn new_args<S: Into<String>>(&self, entries: impl IntoIterator<Item = (S, ArgId)>) -> ArgsId {
        self.args.borrow_mut().alloc_args(entries)
    }

    /// The empty argument record.
    pub fn empty_args(&self) -> ArgsId {
        self.args.borrow_mut().intern_args(Args::default())
    }

    /// Builds a parameter signature.
    pub fn new_params<S: Into<String>>(&self, entries: impl IntoIterator<Item = (S, ArgKind)>) -> ParamsId {
        self.args.borrow_mut().alloc_params(entries)
    }

    /// Builds an ordered record layout.
    ///
    /// # Panics
    ///
    /// Panics if a field name repeats.
    pub fn new_record_params<S: Into<String>>(
        &self,
        fields: impl IntoIterator<Item = (S, TypeId)>,
    ) -> RecordParamsId {
        self.args.borrow_mut().alloc_record_params(fields)
    }

    /// Borrows an argument record. Release the borrow before calling another
    /// argument factory.
    pub fn args(&self, id: ArgsId) -> Ref<'_, Args> {
        Ref::map(self.args.borrow(), |store| store.args(id))
    }

    /// Borrows a parameter signature.
    pub fn params(&self, id: ParamsId) -> Ref<'_, Params> {
        Ref::map(self.args.borrow(), |store| store.params(id))
    }

    /// Borrows a record layout.
    pub fn record_params(&self, id: RecordParamsId) -> Ref<'_, RecordParams> {
        Ref::map(self.args.borrow(), |store| store.record_params(id))
    }

    /// Renders an argument record as `(name:value, ...)`.
    pub fn args_to_string(&self, id: ArgsId) -> String {
        let args = self.args(id).clone();
        args.render(|t| self.type_to_string(t))
    }

    // ------------------------------------------------------------------
    // Bulk arrays
    // ------------------------------------------------------------------

    /// `n` empty instance slots.
    pub fn new_instance_array(&mut self, n: usize) -> BulkArrayId {
        self.bulk.alloc(BulkArray::Instances(vec![None; n]))
    }

    /// `n` empty connection slots.
    pub fn new_connection_array(&mut self, n: usize) -> BulkArrayId {
        self.bulk.alloc(BulkArray::Connections(vec![None; n]))
    }

    /// `n` empty connection-reference slots.
    pub fn new_connection_ptr_array(&mut self, n: usize) -> BulkArrayId {
        self.bulk.alloc(BulkArray::ConnectionRefs(vec![None; n]))
    }

    /// `n` empty wireable slots.
    pub fn new_wireable_array(&mut self, n: usize) -> BulkArrayId {
        self.bulk.alloc(BulkArray::Wireables(vec![None; n]))
    }

    /// `n` empty strings.
    pub fn new_const_string_array(&mut self, n: usize) -> BulkArrayId {
        self.bulk.alloc(BulkArray::Strings(vec![String::new(); n]))
    }

    /// Returns a bulk array.
    pub fn bulk_array(&self, id: BulkArrayId) -> &BulkArray {
        &self.bulk[id]
    }

    /// Returns a bulk array for filling.
    pub fn bulk_array_mut(&mut self, id: BulkArrayId) -> &mut BulkArray {
        &mut self.bulk[id]
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    /// Records a diagnostic. Dies if it is fatal or if the error limit has
    /// been reached. Warnings never count toward the limit.
    pub fn error(&self, diag: Diagnostic) {
        if self.sink.emit(diag).must_stop() {
            self.die();
        }
    }

    /// Returns `true` if any error has been recorded.
    pub fn has_error(&self) -> bool {
        self.sink.has_errors()
    }

    /// Number of errors recorded so far.
    pub fn error_count(&self) -> usize {
        self.sink.error_count()
    }

    /// Every diagnostic recorded so far, in order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.sink.diagnostics()
    }

    /// Drains the recorded diagnostics and resets the error count.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.sink.take_all()
    }

    /// Dies if any error has been recorded.
    pub fn check_errors(&self) {
        if self.has_error() {
            self.die();
        }
    }

    /// Prints every diagnostic to stderr and aborts the current build by
    /// panicking.
    pub fn die(&self) -> ! {
        self.print_errors();
        panic!("aborting due to {} error(s)", self.sink.error_count());
    }

    /// Every diagnostic rendered as one block each.
    pub fn render_errors(&self) -> String {
        self.renderer.render_all(&self.sink.diagnostics())
    }

    /// Writes [`render_errors`](Self::render_errors) to stderr.
    pub fn print_errors(&self) {
        eprint!("{}", self.render_errors());
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

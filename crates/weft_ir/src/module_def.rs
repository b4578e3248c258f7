//! The body of a module: instances, connections and hierarchical selection.
//!
//! A [`ModuleDef`] owns every [`Wireable`] reachable inside it. The interface
//! sits in slot 0 and carries the flipped module type, so that from inside
//! the body an output port of the module is something to drive. Instances
//! and selects are appended as they are created; removed ones leave a
//! tombstone so outstanding [`WireableId`]s never alias a later node.
//!
//! Connections are kept twice: as a set of canonical [`Connection`] pairs,
//! and as the peer set on each endpoint. Every mutation here updates both.

use crate::context::Context;
use crate::errors::{
    error_container_mismatch, error_generator_args, warn_duplicate_connection, Endpoint,
    LookupError, SelectError,
};
use crate::ids::{ArgsId, DefId, GeneratorId, ModuleId, TypeId};
use crate::instance_order::{InstanceOrder, OrderIter};
use crate::namespace::Instantiable;
use crate::sel_cache::SelCache;
use crate::wireable::{
    Connection, InstanceBinding, SelectPath, Wireable, WireableId, WireableKind, SELF_NAME,
};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};
use weft_common::{ContentHash, ContentHasher};

/// A module body.
#[derive(Debug)]
pub struct ModuleDef {
    id: DefId,
    module: ModuleId,
    nodes: Vec<Option<Wireable>>,
    interface: WireableId,
    instances: HashMap<String, WireableId>,
    order: InstanceOrder,
    connections: BTreeSet<Connection>,
    sel_cache: SelCache,
}

impl ModuleDef {
    pub(crate) fn new(id: DefId, module: ModuleId, interface_ty: TypeId) -> Self {
        let interface = WireableId::new(id, 0);
        let root = Wireable::new(
            interface,
            WireableKind::Interface,
            Some(interface_ty),
            vec![SELF_NAME.to_string()],
        );
        Self {
            id,
            module,
            nodes: vec![Some(root)],
            interface,
            instances: HashMap::new(),
            order: InstanceOrder::new(),
            connections: BTreeSet::new(),
            sel_cache: SelCache::new(),
        }
    }

    /// This body's identity. Wireables created here carry it.
    pub fn id(&self) -> DefId {
        self.id
    }

    /// The module this body belongs to.
    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// The interface wireable (`self`).
    pub fn interface(&self) -> WireableId {
        self.interface
    }

    // ------------------------------------------------------------------
    // Node table
    // ------------------------------------------------------------------

    /// Returns a wireable of this body.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to another body or was removed.
    pub fn wireable(&self, id: WireableId) -> &Wireable {
        assert_eq!(
            id.def(),
            self.id,
            "wireable {id} does not belong to {}",
            self.id
        );
        self.try_wireable(id)
            .unwrap_or_else(|| panic!("wireable {id} has been removed"))
    }

    /// Returns a wireable of this body, or `None` if `id` is foreign or removed.
    pub fn try_wireable(&self, id: WireableId) -> Option<&Wireable> {
        if id.def() != self.id {
            return None;
        }
        self.nodes.get(id.index() as usize).and_then(Option::as_ref)
    }

    fn wireable_mut(&mut self, id: WireableId) -> &mut Wireable {
        assert_eq!(
            id.def(),
            self.id,
            "wireable {id} does not belong to {}",
            self.id
        );
        self.nodes
            .get_mut(id.index() as usize)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("wireable {id} has been removed"))
    }

    fn alloc_wireable(&mut self, kind: WireableKind, ty: Option<TypeId>, path: SelectPath) -> WireableId {
        let id = WireableId::new(self.id, self.nodes.len() as u32);
        self.nodes.push(Some(Wireable::new(id, kind, ty, path)));
        id
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Resolves `self`, an instance name, or a dotted path such as
    /// `u0.data.3`.
    ///
    /// # Panics
    ///
    /// Panics if the path cannot be resolved; see [`try_sel`](Self::try_sel).
    pub fn sel(&mut self, ctx: &Context, path: &str) -> WireableId {
        self.try_sel(ctx, path).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of [`sel`](Self::sel).
    pub fn try_sel(&mut self, ctx: &Context, path: &str) -> Result<WireableId, SelectError> {
        if path.contains('.') {
            let segments: Vec<&str> = path.split('.').collect();
            self.try_sel_path(ctx, &segments)
        } else {
            self.sel_root(path)
        }
    }

    /// Resolves a path given as segments.
    ///
    /// # Panics
    ///
    /// Panics if the path cannot be resolved.
    pub fn sel_path<S: AsRef<str>>(&mut self, ctx: &Context, path: &[S]) -> WireableId {
        self.try_sel_path(ctx, path).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of [`sel_path`](Self::sel_path).
    pub fn try_sel_path<S: AsRef<str>>(&mut self, ctx: &Context, path: &[S]) -> Result<WireableId, SelectError> {
        let (first, rest) = path.split_first().ok_or(SelectError::EmptyPath)?;
        let mut cur = self.sel_root(first.as_ref())?;
        for segment in rest {
            cur = self.try_sel_child(ctx, cur, segment.as_ref())?;
        }
        Ok(cur)
    }

    fn sel_root(&self, name: &str) -> Result<WireableId, SelectError> {
        if name == SELF_NAME {
            return Ok(self.interface);
        }
        self.instances
            .get(name)
            .copied()
            .ok_or_else(|| SelectError::UnknownInstance(name.to_string()))
    }

    /// Selects one field or index below `parent`.
    ///
    /// # Panics
    ///
    /// Panics if the segment does not exist in the parent's type.
    pub fn sel_child(&mut self, ctx: &Context, parent: WireableId, segment: &str) -> WireableId {
        self.try_sel_child(ctx, parent, segment)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of [`sel_child`](Self::sel_child).
    ///
    /// The first selection of a segment creates the select; later ones return
    /// the same wireable. Children of an untyped parent are untyped and are
    /// not checked.
    pub fn try_sel_child(
        &mut self,
        ctx: &Context,
        parent: WireableId,
        segment: &str,
    ) -> Result<WireableId, SelectError> {
        if segment.is_empty() {
            return Err(SelectError::EmptySegment(self.wireable(parent).path_string()));
        }
        if let Some(hit) = self.sel_cache.get(parent, segment) {
            return Ok(hit);
        }
        trace!(%parent, segment, "select cache miss");
        let (parent_ty, mut path) = {
            let node = self.wireable(parent);
            (node.ty(), node.path().clone())
        };
        let ty = match parent_ty {
            Some(t) => Some(ctx.select_type(t, segment).ok_or_else(|| {
                SelectError::NotSelectable {
                    path: path.join("."),
                    segment: segment.to_string(),
                    ty: ctx.type_to_string(t),
                }
            })?),
            None => None,
        };
        path.push(segment.to_string());
        let kind = WireableKind::Select {
            parent,
            segment: segment.to_string(),
        };
        let child = self.alloc_wireable(kind, ty, path);
        self.wireable_mut(parent).push_select(child);
        self.sel_cache.insert(parent, segment, child);
        Ok(child)
    }

    // ------------------------------------------------------------------
    // Instances
    // ------------------------------------------------------------------

    /// Adds an instance of a concrete module.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or already used in this body.
    pub fn add_module_instance(
        &mut self,
        ctx: &Context,
        name: &str,
        module: ModuleId,
        config: ArgsId,
    ) -> WireableId {
        let ty = ctx.module(module).ty();
        self.add_bound_instance(ctx, name, InstanceBinding::Module { module, config }, Some(ty))
    }

    /// Adds an instance of a generator.
    ///
    /// Arguments that do not match the generator's parameters are reported
    /// as `E308` and leave the instance untyped. Otherwise the instance is
    /// typed through the generator's expander when one is linked.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or already used in this body.
    pub fn add_generator_instance(
        &mut self,
        ctx: &Context,
        name: &str,
        generator: GeneratorId,
        gen_args: ArgsId,
        config: ArgsId,
    ) -> WireableId {
        let entry = ctx.generator(generator);
        let args = ctx.args(gen_args).clone();
        let problems = ctx.params(entry.params()).check(&args);
        let ty = if problems.is_empty() {
            entry.expander().map(|e| e.module_type(ctx, &args))
        } else {
            let qualified = ctx.qualified_name(Instantiable::Generator(generator));
            ctx.error(error_generator_args(&qualified, name, &problems));
            None
        };
        let binding = InstanceBinding::Generator {
            generator,
            gen_args,
            config,
        };
        self.add_bound_instance(ctx, name, binding, ty)
    }

    /// Adds an instance of whatever `"namespace.name"` refers to.
    ///
    /// For a module, `gen_or_config` is the configuration and `config` is
    /// ignored. For a generator, `gen_or_config` holds the generator
    /// arguments and `config` the configuration (empty if `None`).
    pub fn add_instance_ref(
        &mut self,
        ctx: &Context,
        name: &str,
        reference: &str,
        gen_or_config: ArgsId,
        config: Option<ArgsId>,
    ) -> Result<WireableId, LookupError> {
        let id = match ctx.get_instantiable(reference)? {
            Instantiable::Module(m) => self.add_module_instance(ctx, name, m, gen_or_config),
            Instantiable::Generator(g) => {
                let config = config.unwrap_or_else(|| ctx.empty_args());
                self.add_generator_instance(ctx, name, g, gen_or_config, config)
            }
        };
        Ok(id)
    }

    /// Adds an instance with the same binding and type as `source`, which
    /// may live in any body. `name` defaults to the source's instance name.
    ///
    /// Generator arguments are not checked again and no expander is called.
    ///
    /// # Panics
    ///
    /// Panics if `source` is not an instance, or if the name is taken.
    pub fn add_instance_like(&mut self, ctx: &Context, source: &Wireable, name: Option<&str>) -> WireableId {
        let binding = source
            .binding()
            .unwrap_or_else(|| panic!("`{}` is not an instance", source.path_string()))
            .clone();
        let name = name.or(source.instance_name()).unwrap_or_default();
        self.add_bound_instance(ctx, name, binding, source.ty())
    }

    fn add_bound_instance(
        &mut self,
        ctx: &Context,
        name: &str,
        binding: InstanceBinding,
        ty: Option<TypeId>,
    ) -> WireableId {
        assert!(!name.is_empty(), "instance name must not be empty");
        assert!(name != SELF_NAME, "`{SELF_NAME}` is reserved for the interface");
        assert!(!name.contains('.'), "instance name `{name}` must not contain '.'");
        assert!(
            !self.instances.contains_key(name),
            "instance `{name}` already exists in `{}`",
            ctx.module(self.module).name()
        );
        let kind = WireableKind::Instance {
            name: name.to_string(),
            binding,
        };
        let id = self.alloc_wireable(kind, ty, vec![name.to_string()]);
        self.instances.insert(name.to_string(), id);
        self.order.append(id);
        debug_assert_eq!(self.order.last(), Some(id));
        debug_assert_eq!(self.order.len(), self.instances.len());
        debug!(instance = name, def = %self.id, "added instance");
        id
    }

    /// Removes an instance, first disconnecting it and everything selected
    /// from it. The name becomes available again.
    ///
    /// # Panics
    ///
    /// Panics if no instance is called `name`.
    pub fn remove_instance(&mut self, name: &str) {
        let id = *self
            .instances
            .get(name)
            .unwrap_or_else(|| panic!("instance `{name}` does not exist"));
        let subtree = self.subtree(id);
        for &w in &subtree {
            self.disconnect(w);
        }
        self.instances.remove(name);
        self.order.remove(id);
        debug_assert!(!self.order.contains(id));
        debug_assert_eq!(self.order.len(), self.instances.len());
        for &w in &subtree {
            self.nodes[w.index() as usize] = None;
        }
        self.sel_cache.purge(&subtree);
        debug!(instance = name, def = %self.id, removed = subtree.len(), "removed instance");
    }

    /// [`remove_instance`](Self::remove_instance) by handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live instance of this body.
    pub fn remove_instance_id(&mut self, id: WireableId) {
        let name = self
            .wireable(id)
            .instance_name()
            .unwrap_or_else(|| panic!("wireable {id} is not an instance"))
            .to_string();
        self.remove_instance(&name);
    }

    fn subtree(&self, root: WireableId) -> Vec<WireableId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(w) = stack.pop() {
            out.push(w);
            stack.extend(self.wireable(w).selects().iter().copied());
        }
        out
    }

    /// The instance called `name`.
    pub fn instance(&self, name: &str) -> Option<WireableId> {
        self.instances.get(name).copied()
    }

    /// Returns `true` if an instance is called `name`.
    pub fn has_instance(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    /// Number of live instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Instances in the order they were added.
    pub fn instances_in_order(&self) -> OrderIter<'_> {
        self.order.iter()
    }

    /// The oldest live instance.
    pub fn first_instance(&self) -> Option<WireableId> {
        self.order.first()
    }

    /// The instance added after `id`, skipping removed ones.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live instance.
    pub fn next_instance(&self, id: WireableId) -> Option<WireableId> {
        self.order.next(id)
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Connects two wireables of this body.
    ///
    /// Endpoints from another body are reported as `E300` and nothing
    /// changes. Connecting an existing pair again has no effect.
    pub fn connect(&mut self, ctx: &Context, a: WireableId, b: WireableId) {
        if a.def() != self.id || b.def() != self.id {
            let this = ctx.module(self.module).name().to_string();
            let (path_a, owner_a) = self.describe(ctx, a);
            let (path_b, owner_b) = self.describe(ctx, b);
            ctx.error(error_container_mismatch(
                &this,
                Endpoint {
                    path: &path_a,
                    owner: &owner_a,
                },
                Endpoint {
                    path: &path_b,
                    owner: &owner_b,
                },
            ));
            return;
        }
        let con = Connection::new(a, b);
        if self.connections.contains(&con) {
            let path_a = self.wireable(a).path_string();
            let path_b = self.wireable(b).path_string();
            debug!(a = %path_a, b = %path_b, "connection already present");
            if ctx.config().connections.warn_on_duplicate {
                ctx.error(warn_duplicate_connection(&path_a, &path_b));
            }
            return;
        }
        self.wireable_mut(a).add_connected(b);
        self.wireable_mut(b).add_connected(a);
        self.connections.insert(con);
    }

    /// Connects two dotted paths.
    pub fn connect_paths(&mut self, ctx: &Context, a: &str, b: &str) {
        let a = self.sel(ctx, a);
        let b = self.sel(ctx, b);
        self.connect(ctx, a, b);
    }

    /// Connects two segment paths.
    pub fn connect_select_paths<S: AsRef<str>>(&mut self, ctx: &Context, a: &[S], b: &[S]) {
        let a = self.sel_path(ctx, a);
        let b = self.sel_path(ctx, b);
        self.connect(ctx, a, b);
    }

    /// Path and owning module name of any wireable, for error messages.
    fn describe(&self, ctx: &Context, w: WireableId) -> (String, String) {
        let owner = ctx.module(ctx.def_owner(w.def()));
        let path = if w.def() == self.id {
            self.try_wireable(w).map(Wireable::path_string)
        } else {
            owner.def().and_then(|d| d.try_wireable(w)).map(Wireable::path_string)
        };
        (path.unwrap_or_else(|| w.to_string()), owner.name().to_string())
    }

    /// Returns `true` if `a` and `b` are connected, in either order.
    pub fn has_connection(&self, a: WireableId, b: WireableId) -> bool {
        self.connections.contains(&Connection::new(a, b))
    }

    /// The canonical connection between `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if they are not connected.
    pub fn get_connection(&self, a: WireableId, b: WireableId) -> Connection {
        let con = Connection::new(a, b);
        assert!(
            self.connections.contains(&con),
            "could not find connection between {a} and {b}"
        );
        con
    }

    /// Removes every connection touching `w`. Selects below `w` are not
    /// affected.
    pub fn disconnect(&mut self, w: WireableId) {
        let peers: Vec<WireableId> = self.wireable(w).connected().iter().copied().collect();
        for peer in peers {
            self.disconnect_pair(w, peer);
        }
    }

    /// Removes the connection between `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if they are not connected.
    pub fn disconnect_pair(&mut self, a: WireableId, b: WireableId) {
        self.disconnect_connection(Connection::new(a, b));
    }

    /// Removes a connection.
    ///
    /// # Panics
    ///
    /// Panics if it is not present.
    pub fn disconnect_connection(&mut self, con: Connection) {
        assert!(
            self.connections.contains(&con),
            "cannot delete connection that is not connected: {} <=> {}",
            con.first(),
            con.second()
        );
        self.wireable_mut(con.first()).remove_connected(con.second());
        self.wireable_mut(con.second()).remove_connected(con.first());
        self.connections.remove(&con);
    }

    /// All connections in canonical order.
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        self.connections.iter().copied()
    }

    /// Number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // ------------------------------------------------------------------
    // Whole-body operations
    // ------------------------------------------------------------------

    /// A fresh, independent body for the same module with the same
    /// instances (in the same order) and the same connections.
    pub fn copy(&self, ctx: &Context) -> ModuleDef {
        self.copy_for(ctx, self.module)
    }

    /// Rebuilds this body for `module`, whose type must match.
    pub(crate) fn copy_for(&self, ctx: &Context, module: ModuleId) -> ModuleDef {
        let mut def = ctx.new_module_def(module);
        for id in self.order.iter() {
            def.add_instance_like(ctx, self.wireable(id), None);
        }
        for con in &self.connections {
            let a = self.wireable(con.first()).path().as_slice();
            let b = self.wireable(con.second()).path().as_slice();
            def.connect_select_paths(ctx, a, b);
        }
        def
    }

    fn describe_binding(ctx: &Context, binding: &InstanceBinding) -> String {
        match binding {
            InstanceBinding::Module { module, config } => {
                let name = ctx.qualified_name(Instantiable::Module(*module));
                if ctx.args(*config).is_empty() {
                    name
                } else {
                    format!("{name}{}", ctx.args_to_string(*config))
                }
            }
            InstanceBinding::Generator {
                generator,
                gen_args,
                ..
            } => format!(
                "{}{}",
                ctx.qualified_name(Instantiable::Generator(*generator)),
                ctx.args_to_string(*gen_args)
            ),
        }
    }

    fn instance_lines(&self, ctx: &Context) -> Vec<(String, String)> {
        self.order
            .iter()
            .map(|id| {
                let node = self.wireable(id);
                let name = node.instance_name().unwrap_or_default().to_string();
                let binding = node
                    .binding()
                    .map(|b| Self::describe_binding(ctx, b))
                    .unwrap_or_default();
                (name, binding)
            })
            .collect()
    }

    fn connection_lines(&self) -> Vec<(String, String)> {
        self.connections
            .iter()
            .map(|con| {
                let a = self.wireable(con.first()).path_string();
                let b = self.wireable(con.second()).path_string();
                if a <= b {
                    (a, b)
                } else {
                    (b, a)
                }
            })
            .collect()
    }

    /// Human-readable listing of instances and connections.
    pub fn render(&self, ctx: &Context) -> String {
        let mut out = format!(
            "{}\n",
            ctx.qualified_name(Instantiable::Module(self.module))
        );
        out.push_str("  Def:\n    Instances:\n");
        for (name, binding) in self.instance_lines(ctx) {
            out.push_str(&format!("      {name} : {binding}\n"));
        }
        out.push_str("    Connections:\n");
        let mut lines = self.connection_lines();
        lines.sort();
        for (a, b) in lines {
            out.push_str(&format!("      {a} <=> {b}\n"));
        }
        out
    }

    /// Writes [`render`](Self::render) to stdout.
    pub fn print(&self, ctx: &Context) {
        print!("{}", self.render(ctx));
    }

    /// Fingerprint of the body's structure: instance names and bindings plus
    /// connections by path. Insertion order and handle values do not matter.
    pub fn content_hash(&self, ctx: &Context) -> ContentHash {
        let mut instances = self.instance_lines(ctx);
        instances.sort();
        let mut connections = self.connection_lines();
        connections.sort();

        let mut hasher = ContentHasher::new();
        hasher.field((instances.len() as u64).to_le_bytes());
        for (name, binding) in &instances {
            hasher.field(name).field(binding);
        }
        hasher.field((connections.len() as u64).to_le_bytes());
        for (a, b) in &connections {
            hasher.field(a).field(b);
        }
        hasher.finish()
    }
}

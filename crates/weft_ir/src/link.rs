//! Linking a library of definitions into a namespace of declarations.
//!
//! A declaration is a module without a body, or a generator without an
//! expander. Linking fills those in from a same-named entity of another
//! namespace, after checking that both sides agree on their signature.

use crate::context::Context;
use crate::errors::{
    error_cyclic_instantiation, error_duplicate_definition, error_link_kind, error_link_signature,
    error_self_link,
};
use crate::ids::{GeneratorId, ModuleId, NamespaceId};
use crate::namespace::Instantiable;
use crate::wireable::InstanceBinding;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::debug;

fn kind_name(entity: Instantiable) -> &'static str {
    match entity {
        Instantiable::Module(_) => "module",
        Instantiable::Generator(_) => "generator",
    }
}

impl Context {
    /// Links every entity of `decls` that has a same-named counterpart in
    /// `defs`.
    ///
    /// Module bodies are copied by path onto body-less declarations.
    /// Generators without an expander take the definition's. Mismatches are
    /// reported (`E302`, `E303`, `E304`, `E306`) and skipped, and the
    /// resulting instantiation hierarchy of `decls` is checked for cycles
    /// (`E305`). Returns `true` if this call reported no errors.
    pub fn link_lib(&mut self, defs: NamespaceId, decls: NamespaceId) -> bool {
        let before = self.error_count();
        if defs == decls {
            self.error(error_self_link(self.namespace(defs).name()));
            return false;
        }
        let pairs: Vec<(String, Instantiable, Instantiable)> = self
            .namespace(decls)
            .entries()
            .filter_map(|(name, decl)| {
                self.namespace(defs)
                    .lookup(name)
                    .map(|def| (name.to_string(), decl, def))
            })
            .collect();
        for (name, decl, def) in pairs {
            let qualified = format!("{}.{}", self.namespace(decls).name(), name);
            match (decl, def) {
                (Instantiable::Module(d), Instantiable::Module(f)) => {
                    self.link_module(&qualified, d, f)
                }
                (Instantiable::Generator(d), Instantiable::Generator(f)) => {
                    self.link_generator(&qualified, d, f)
                }
                _ => self.error(error_link_kind(&qualified, kind_name(decl), kind_name(def))),
            }
        }
        self.check_hierarchy(decls);
        self.error_count() == before
    }

    fn link_module(&mut self, qualified: &str, decl: ModuleId, def: ModuleId) {
        let (decl_ty, def_ty) = (self.module(decl).ty(), self.module(def).ty());
        if decl_ty != def_ty {
            self.error(error_link_signature(
                qualified,
                "types",
                &self.type_to_string(decl_ty),
                &self.type_to_string(def_ty),
            ));
            return;
        }
        let decl_params = self.params(self.module(decl).config_params()).clone();
        let def_params = self.params(self.module(def).config_params()).clone();
        if decl_params != def_params {
            self.error(error_link_signature(
                qualified,
                "configuration parameters",
                &decl_params.to_string(),
                &def_params.to_string(),
            ));
            return;
        }
        let decl_defined = self.module(decl).has_def();
        let copied = match self.module(def).def() {
            None => return,
            Some(_) if decl_defined => {
                self.error(error_duplicate_definition(qualified));
                return;
            }
            Some(body) => body.copy_for(self, decl),
        };
        self.set_def(decl, copied);
        debug!(module = qualified, "linked definition");
    }

    fn link_generator(&mut self, qualified: &str, decl: GeneratorId, def: GeneratorId) {
        let decl_params = self.params(self.generator(decl).params()).clone();
        let def_params = self.params(self.generator(def).params()).clone();
        if decl_params != def_params {
            self.error(error_link_signature(
                qualified,
                "parameters",
                &decl_params.to_string(),
                &def_params.to_string(),
            ));
            return;
        }
        match (self.generator(decl).expander(), self.generator(def).expander()) {
            (Some(_), Some(_)) => self.error(error_duplicate_definition(qualified)),
            (None, Some(expander)) => {
                self.set_expander(decl, expander);
                debug!(generator = qualified, "linked expander");
            }
            (_, None) => {}
        }
    }

    /// Checks that no module of `ns` instantiates itself, directly or
    /// through other modules in any namespace. Reports `E305` for the first
    /// cycle found and returns whether the hierarchy is acyclic.
    pub fn check_hierarchy(&self, ns: NamespaceId) -> bool {
        let mut graph: DiGraph<ModuleId, ()> = DiGraph::new();
        let mut nodes: HashMap<ModuleId, NodeIndex> = HashMap::new();
        let mut pending: Vec<ModuleId> = self.namespace(ns).modules().collect();
        for &m in &pending {
            nodes.insert(m, graph.add_node(m));
        }

        while let Some(m) = pending.pop() {
            let from = nodes[&m];
            let Some(def) = self.def(m) else {
                continue;
            };
            for inst in def.instances_in_order() {
                let Some(InstanceBinding::Module { module: child, .. }) =
                    def.wireable(inst).binding()
                else {
                    continue;
                };
                let to = match nodes.get(child) {
                    Some(&idx) => idx,
                    None => {
                        let idx = graph.add_node(*child);
                        nodes.insert(*child, idx);
                        pending.push(*child);
                        idx
                    }
                };
                graph.update_edge(from, to, ());
            }
        }

        match petgraph::algo::toposort(&graph, None) {
            Ok(_) => true,
            Err(cycle) => {
                let module = graph[cycle.node_id()];
                self.error(error_cyclic_instantiation(
                    &self.qualified_name(Instantiable::Module(module)),
                ));
                false
            }
        }
    }
}

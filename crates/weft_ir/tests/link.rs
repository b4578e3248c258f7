//! Linking library namespaces and checking the instantiation hierarchy.

mod common;

use common::{child_type, top_type, PassThrough};
use std::rc::Rc;
use weft_ir::errors::{E302, E303, E304, E305, E306};
use weft_ir::{ArgKind, Context, GeneratorExpander, ModuleId, NamespaceId};

struct Libs {
    ctx: Context,
    lib: NamespaceId,
    app: NamespaceId,
}

fn libs() -> Libs {
    let mut ctx = Context::new();
    let lib = ctx.new_namespace("lib").unwrap();
    let app = ctx.new_namespace("app").unwrap();
    Libs { ctx, lib, app }
}

/// Defines `ns.top` with one instance of `leaf` wired through.
fn define_top(ctx: &mut Context, ns: NamespaceId, leaf: ModuleId) -> ModuleId {
    let ty = top_type(ctx);
    let top = ctx.new_module(ns, "top", ty, None).unwrap();
    let mut def = ctx.new_module_def(top);
    def.add_module_instance(ctx, "u0", leaf, ctx.empty_args());
    def.connect_paths(ctx, "self.in", "u0.in");
    def.connect_paths(ctx, "u0.out", "self.out");
    ctx.set_def(top, def);
    top
}

#[test]
fn body_is_copied_onto_declaration() {
    let mut l = libs();
    let leaf_ty = child_type(&l.ctx);
    let leaf = l.ctx.new_module(l.lib, "leaf", leaf_ty, None).unwrap();
    let lib_top = define_top(&mut l.ctx, l.lib, leaf);
    let decl_ty = top_type(&l.ctx);
    let app_top = l.ctx.new_module(l.app, "top", decl_ty, None).unwrap();

    assert!(l.ctx.link_lib(l.lib, l.app));

    let linked = l.ctx.def(app_top).unwrap();
    let original = l.ctx.def(lib_top).unwrap();
    assert_ne!(linked.id(), original.id());
    assert_eq!(linked.module(), app_top);
    assert_eq!(linked.connection_count(), 2);
    assert_eq!(linked.content_hash(&l.ctx), original.content_hash(&l.ctx));
    assert!(!l.ctx.has_error());
}

#[test]
fn self_link_is_rejected() {
    let mut l = libs();
    assert!(!l.ctx.link_lib(l.lib, l.lib));
    assert_eq!(l.ctx.diagnostics()[0].code, E306);
}

#[test]
fn type_mismatch_is_reported() {
    let mut l = libs();
    let bit = l.ctx.bit();
    let bit_in = l.ctx.bit_in();
    l.ctx.new_module(l.lib, "m", bit, None);
    l.ctx.new_module(l.app, "m", bit_in, None);
    assert!(!l.ctx.link_lib(l.lib, l.app));
    let diags = l.ctx.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, E302);
    assert!(diags[0].notes.iter().any(|n| n.contains("BitIn")));
}

#[test]
fn config_param_mismatch_is_reported() {
    let mut l = libs();
    let bit = l.ctx.bit();
    let p1 = l.ctx.new_params([("init", ArgKind::Int)]);
    let p2 = l.ctx.new_params([("init", ArgKind::Str)]);
    l.ctx.new_module(l.lib, "m", bit, Some(p1));
    l.ctx.new_module(l.app, "m", bit, Some(p2));
    assert!(!l.ctx.link_lib(l.lib, l.app));
    assert_eq!(l.ctx.diagnostics()[0].code, E302);
}

#[test]
fn kind_mismatch_is_reported() {
    let mut l = libs();
    let bit = l.ctx.bit();
    let params = l.ctx.new_params([("width", ArgKind::Int)]);
    l.ctx.new_generator(l.lib, "add", params, None);
    l.ctx.new_module(l.app, "add", bit, None);
    assert!(!l.ctx.link_lib(l.lib, l.app));
    assert_eq!(l.ctx.diagnostics()[0].code, E304);
}

#[test]
fn both_defined_is_reported() {
    let mut l = libs();
    let leaf_ty = child_type(&l.ctx);
    let leaf = l.ctx.new_module(l.lib, "leaf", leaf_ty, None).unwrap();
    define_top(&mut l.ctx, l.lib, leaf);
    let app_top = define_top(&mut l.ctx, l.app, leaf);
    let before = l.ctx.def(app_top).unwrap().id();
    assert!(!l.ctx.link_lib(l.lib, l.app));
    assert_eq!(l.ctx.diagnostics()[0].code, E303);
    assert_eq!(l.ctx.def(app_top).unwrap().id(), before);
}

#[test]
fn declarations_without_counterpart_are_untouched() {
    let mut l = libs();
    let bit = l.ctx.bit();
    let m = l.ctx.new_module(l.app, "lonely", bit, None).unwrap();
    assert!(l.ctx.link_lib(l.lib, l.app));
    assert!(l.ctx.def(m).is_none());
}

#[test]
fn generator_inherits_expander() {
    let mut l = libs();
    let params = l.ctx.new_params([("width", ArgKind::Int)]);
    let expander: Rc<dyn GeneratorExpander> = Rc::new(PassThrough);
    l.ctx.new_generator(l.lib, "pass", params, Some(expander));
    let params = l.ctx.new_params([("width", ArgKind::Int)]);
    let decl = l.ctx.new_generator(l.app, "pass", params, None).unwrap();
    assert!(l.ctx.generator(decl).expander().is_none());
    assert!(l.ctx.link_lib(l.lib, l.app));
    assert!(l.ctx.generator(decl).expander().is_some());
}

#[test]
fn generator_param_mismatch_is_reported() {
    let mut l = libs();
    let p1 = l.ctx.new_params([("width", ArgKind::Int)]);
    let p2 = l.ctx.new_params([("width", ArgKind::Type)]);
    l.ctx.new_generator(l.lib, "pass", p1, Some(Rc::new(PassThrough)));
    let decl = l.ctx.new_generator(l.app, "pass", p2, None).unwrap();
    assert!(!l.ctx.link_lib(l.lib, l.app));
    assert_eq!(l.ctx.diagnostics()[0].code, E302);
    assert!(l.ctx.generator(decl).expander().is_none());
}

#[test]
fn cycles_are_detected() {
    let mut ctx = Context::new();
    let g = ctx.global();
    let ty = top_type(&ctx);
    let a = ctx.new_module(g, "a", ty, None).unwrap();
    let b = ctx.new_module(g, "b", ty, None).unwrap();

    let mut def_a = ctx.new_module_def(a);
    def_a.add_module_instance(&ctx, "b0", b, ctx.empty_args());
    ctx.set_def(a, def_a);
    assert!(ctx.check_hierarchy(g));

    let mut def_b = ctx.new_module_def(b);
    def_b.add_module_instance(&ctx, "a0", a, ctx.empty_args());
    ctx.set_def(b, def_b);
    assert!(!ctx.check_hierarchy(g));

    let diags = ctx.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, E305);
}

#[test]
fn self_instantiation_is_a_cycle() {
    let mut ctx = Context::new();
    let g = ctx.global();
    let ty = top_type(&ctx);
    let a = ctx.new_module(g, "a", ty, None).unwrap();
    let mut def = ctx.new_module_def(a);
    def.add_module_instance(&ctx, "me", a, ctx.empty_args());
    ctx.set_def(a, def);
    assert!(!ctx.check_hierarchy(g));
    assert!(ctx.diagnostics()[0].message.contains("global.a"));
}

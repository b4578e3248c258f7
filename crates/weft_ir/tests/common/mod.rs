//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::rc::Rc;
use weft_config::WeftConfig;
use weft_ir::{ArgKind, Args, Context, GeneratorExpander, GeneratorId, ModuleDef, ModuleId, TypeId};

/// A context with two modules in the global namespace:
///
/// * `child : {in:BitIn, out:Bit, data:Array(4,Bit)}`
/// * `top   : {in:BitIn, out:Bit}`
pub struct Fixture {
    pub ctx: Context,
    pub child: ModuleId,
    pub top: ModuleId,
}

pub fn fixture() -> Fixture {
    fixture_with(WeftConfig::default())
}

pub fn fixture_with(config: WeftConfig) -> Fixture {
    let mut ctx = Context::with_config(config);
    let g = ctx.global();
    let child_ty = child_type(&ctx);
    let child = ctx.new_module(g, "child", child_ty, None).unwrap();
    let top_ty = top_type(&ctx);
    let top = ctx.new_module(g, "top", top_ty, None).unwrap();
    Fixture { ctx, child, top }
}

pub fn child_type(ctx: &Context) -> TypeId {
    ctx.record(ctx.new_record_params([
        ("in", ctx.bit_in()),
        ("out", ctx.bit()),
        ("data", ctx.array(4, ctx.bit())),
    ]))
}

pub fn top_type(ctx: &Context) -> TypeId {
    ctx.record(ctx.new_record_params([("in", ctx.bit_in()), ("out", ctx.bit())]))
}

/// Names of the live instances of `def`, in iteration order.
pub fn order_names(def: &ModuleDef) -> Vec<String> {
    def.instances_in_order()
        .map(|id| def.wireable(id).instance_name().unwrap().to_string())
        .collect()
}

/// A `width`-bit pass-through: `{in:Array(width,BitIn), out:Array(width,Bit)}`.
pub struct PassThrough;

impl GeneratorExpander for PassThrough {
    fn module_type(&self, ctx: &Context, args: &Args) -> TypeId {
        let width = args.get_int("width").unwrap() as u32;
        ctx.record(ctx.new_record_params([
            ("in", ctx.array(width, ctx.bit_in())),
            ("out", ctx.array(width, ctx.bit())),
        ]))
    }

    fn expand_def(&self, ctx: &Context, def: &mut ModuleDef, _args: &Args) {
        def.connect_paths(ctx, "self.in", "self.out");
    }
}

/// Registers `global.pass` with a `width:int` parameter.
pub fn add_pass_generator(ctx: &mut Context, with_expander: bool) -> GeneratorId {
    let g = ctx.global();
    let params = ctx.new_params([("width", ArgKind::Int)]);
    let expander: Option<Rc<dyn GeneratorExpander>> = if with_expander {
        Some(Rc::new(PassThrough))
    } else {
        None
    };
    ctx.new_generator(g, "pass", params, expander).unwrap()
}

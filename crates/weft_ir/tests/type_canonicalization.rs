//! Structural canonicalization of types through the context factories.

use weft_ir::{Context, Type};

#[test]
fn independently_built_records_share_a_handle() {
    let ctx = Context::new();
    let a = ctx.record(ctx.new_record_params([("valid", ctx.bit()), ("data", ctx.array(8, ctx.bit()))]));
    let b = ctx.record(ctx.new_record_params([("valid", ctx.bit()), ("data", ctx.array(8, ctx.bit()))]));
    assert_eq!(a, b);
}

#[test]
fn field_order_matters() {
    let ctx = Context::new();
    let a = ctx.record(ctx.new_record_params([("x", ctx.bit()), ("y", ctx.bit_in())]));
    let b = ctx.record(ctx.new_record_params([("y", ctx.bit_in()), ("x", ctx.bit())]));
    assert_ne!(a, b);
}

#[test]
fn double_flip_is_identity() {
    let ctx = Context::new();
    let g = ctx.named("global", "clk", None);
    let samples = [
        ctx.any(),
        ctx.bit(),
        ctx.bit_in(),
        ctx.array(0, ctx.bit()),
        ctx.array(3, ctx.array(2, ctx.bit_in())),
        ctx.record(ctx.new_record_params([("a", ctx.bit()), ("b", ctx.bit_in())])),
        ctx.record(ctx.new_record_params::<&str>([])),
        g,
        ctx.in_(g),
        ctx.out(g),
    ];
    for t in samples {
        assert_eq!(ctx.flip(ctx.flip(t)), t, "{}", ctx.type_to_string(t));
    }
}

#[test]
fn flip_pushes_through_aggregates() {
    let ctx = Context::new();
    let rec = ctx.record(ctx.new_record_params([("a", ctx.bit()), ("b", ctx.array(2, ctx.bit_in()))]));
    let expected = ctx.record(ctx.new_record_params([("a", ctx.bit_in()), ("b", ctx.array(2, ctx.bit()))]));
    assert_eq!(ctx.flip(rec), expected);
}

#[test]
fn directions_on_named_types_wrap() {
    let ctx = Context::new();
    let n = ctx.named("stdlib", "bus", None);
    let f = ctx.flip(n);
    assert_eq!(ctx.type_of(f), Type::Flip(n));
    assert_eq!(ctx.type_of(ctx.in_(n)), Type::In(n));
    assert_eq!(ctx.flip(ctx.in_(n)), ctx.out(n));
    assert_eq!(ctx.in_(ctx.out(n)), ctx.in_(n));
}

#[test]
fn in_and_out_normalize_bits() {
    let ctx = Context::new();
    let rec = ctx.record(ctx.new_record_params([("a", ctx.bit()), ("b", ctx.bit_in())]));
    let all_in = ctx.record(ctx.new_record_params([("a", ctx.bit_in()), ("b", ctx.bit_in())]));
    let all_out = ctx.record(ctx.new_record_params([("a", ctx.bit()), ("b", ctx.bit())]));
    assert_eq!(ctx.in_(rec), all_in);
    assert_eq!(ctx.out(rec), all_out);
    assert_eq!(ctx.in_(ctx.any()), ctx.any());
}

#[test]
fn named_types_compare_by_name_and_args() {
    let ctx = Context::new();
    let w8 = ctx.int_arg(8);
    let w8_again = ctx.int_arg(8);
    let a = ctx.named("stdlib", "word", Some(ctx.new_args([("w", w8)])));
    let b = ctx.named("stdlib", "word", Some(ctx.new_args([("w", w8_again)])));
    assert_eq!(a, b);
    let w4 = ctx.int_arg(4);
    let c = ctx.named("stdlib", "word", Some(ctx.new_args([("w", w4)])));
    assert_ne!(a, c);
    assert_ne!(a, ctx.named("stdlib", "word", None));
}

#[test]
fn factories_do_not_grow_cache_for_known_types() {
    let ctx = Context::new();
    ctx.array(4, ctx.bit());
    let before = ctx.type_count();
    ctx.array(4, ctx.bit());
    assert_eq!(ctx.type_count(), before);
    // The first flip adds BitIn and Array(4,BitIn); the second adds nothing.
    ctx.flip(ctx.flip(ctx.array(4, ctx.bit())));
    assert_eq!(ctx.type_count(), before + 2);
}

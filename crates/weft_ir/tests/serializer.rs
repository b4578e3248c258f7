//! A line-based netlist format written against the public API.
//!
//! ```text
//! module global.top
//! inst u0 global.child
//! conn self.in u0.in
//! ```

mod common;

use common::fixture;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use weft_ir::{
    Context, InstanceBinding, Instantiable, ModuleId, ModuleSerializer, SerializeError,
};

struct LineFormat;

impl ModuleSerializer for LineFormat {
    fn load_module(&self, ctx: &mut Context, path: &Path) -> Result<ModuleId, SerializeError> {
        let text = fs::read_to_string(path)?;
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| SerializeError::Format("empty file".into()))?;
        let reference = header
            .strip_prefix("module ")
            .ok_or_else(|| SerializeError::Format(format!("expected `module`, found `{header}`")))?;
        let module = match ctx
            .get_instantiable(reference)
            .map_err(|e| SerializeError::Format(e.to_string()))?
        {
            Instantiable::Module(m) => m,
            Instantiable::Generator(_) => {
                return Err(SerializeError::Format(format!("`{reference}` is a generator")))
            }
        };

        let mut def = ctx.new_module_def(module);
        for line in lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                ["inst", name, target] => {
                    def.add_instance_ref(ctx, name, target, ctx.empty_args(), None)
                        .map_err(|e| SerializeError::Format(e.to_string()))?;
                }
                ["conn", a, b] => {
                    let a = def
                        .try_sel(ctx, a)
                        .map_err(|e| SerializeError::Format(e.to_string()))?;
                    let b = def
                        .try_sel(ctx, b)
                        .map_err(|e| SerializeError::Format(e.to_string()))?;
                    def.connect(ctx, a, b);
                }
                _ => return Err(SerializeError::Format(format!("unrecognized line `{line}`"))),
            }
        }
        ctx.set_def(module, def);
        Ok(module)
    }

    fn save_module(&self, ctx: &Context, module: ModuleId, path: &Path) -> Result<(), SerializeError> {
        let mut out = format!("module {}\n", ctx.qualified_name(Instantiable::Module(module)));
        if let Some(def) = ctx.def(module) {
            for id in def.instances_in_order() {
                let w = def.wireable(id);
                let Some(InstanceBinding::Module { module: target, .. }) = w.binding() else {
                    return Err(SerializeError::Format("generator instances are not supported".into()));
                };
                let _ = writeln!(
                    out,
                    "inst {} {}",
                    w.instance_name().unwrap_or_default(),
                    ctx.qualified_name(Instantiable::Module(*target))
                );
            }
            for con in def.connections() {
                let _ = writeln!(
                    out,
                    "conn {} {}",
                    def.wireable(con.first()).path_string(),
                    def.wireable(con.second()).path_string()
                );
            }
        }
        fs::write(path, out)?;
        Ok(())
    }
}

#[test]
fn saved_module_loads_back_with_same_content() {
    let mut f = fixture();
    let mut def = f.ctx.new_module_def(f.top);
    def.add_module_instance(&f.ctx, "u0", f.child, f.ctx.empty_args());
    def.add_module_instance(&f.ctx, "u1", f.child, f.ctx.empty_args());
    def.connect_paths(&f.ctx, "self.in", "u0.in");
    def.connect_paths(&f.ctx, "u0.out", "u1.in");
    def.connect_paths(&f.ctx, "u1.out", "self.out");
    let hash = def.content_hash(&f.ctx);
    f.ctx.set_def(f.top, def);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("top.net");
    LineFormat.save_module(&f.ctx, f.top, &path).unwrap();
    f.ctx.take_def(f.top);

    let loaded = LineFormat.load_module(&mut f.ctx, &path).unwrap();
    assert_eq!(loaded, f.top);
    let def = f.ctx.def(f.top).unwrap();
    assert_eq!(def.content_hash(&f.ctx), hash);
    assert!(!f.ctx.has_error());
}

#[test]
fn missing_file_is_io_error() {
    let mut f = fixture();
    let dir = tempfile::tempdir().unwrap();
    let err = LineFormat
        .load_module(&mut f.ctx, &dir.path().join("absent.net"))
        .unwrap_err();
    assert!(matches!(err, SerializeError::Io(_)));
}

#[test]
fn empty_file_is_format_error() {
    let mut f = fixture();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.net");
    fs::write(&path, "").unwrap();
    let err = LineFormat.load_module(&mut f.ctx, &path).unwrap_err();
    assert_eq!(err.to_string(), "format error: empty file");
}

#[test]
fn unknown_reference_is_format_error() {
    let mut f = fixture();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.net");
    fs::write(&path, "module global.top\ninst u0 global.nowhere\n").unwrap();
    let err = LineFormat.load_module(&mut f.ctx, &path).unwrap_err();
    assert!(matches!(err, SerializeError::Format(_)));
    assert!(f.ctx.def(f.top).is_none());
}

#[test]
fn bad_select_is_format_error() {
    let mut f = fixture();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.net");
    fs::write(&path, "module global.top\nconn self.nope self.in\n").unwrap();
    let err = LineFormat.load_module(&mut f.ctx, &path).unwrap_err();
    assert!(err.to_string().contains("format error"));
}

//! Host import bridge.
//!
//! Exposes the fixed drawing call table the guest imports at startup. The
//! guest resolves these imports eagerly, so [`install_import_bridge`] must
//! run against the linker before instantiation.
//!
//! Every operation is side-effecting only and returns nothing. Calls are
//! high-frequency (once per guest-drawn primitive, potentially hundreds per
//! frame) and must never trap across the boundary: with no surface handle
//! installed, or with guest memory not yet available for a string argument,
//! the call is a silent no-op.

use wasmi::{Caller, Linker};

use inkhost_surface::Context2D;

use crate::GuestError;
use crate::module::HostState;

/// Import module name the guest links its drawing calls against.
pub const IMPORT_MODULE: &str = "context2D";

fn read_str(caller: &Caller<'_, HostState>, ptr: i32, len: i32) -> Option<String> {
    let memory = caller.data().memory?;
    let start = usize::try_from(ptr).ok()?;
    let len = usize::try_from(len).ok()?;
    let bytes = memory.data(caller).get(start..start.checked_add(len)?)?;
    Some(String::from_utf8_lossy(bytes).into_owned())
}

/// Adds a bridge function that only touches the surface.
macro_rules! surface_fn {
    ($linker:expr, $name:literal, |$surface:ident $(, $arg:ident : $ty:ty)*| $body:expr) => {
        $linker
            .func_wrap(
                IMPORT_MODULE,
                $name,
                |caller: Caller<'_, HostState> $(, $arg: $ty)*| {
                    let Some(handle) = caller.data().surface.clone() else {
                        return;
                    };
                    let mut $surface = handle.lock();
                    $body;
                },
            )
            .map_err(|e| GuestError::load(format!("Failed to add {}: {}", $name, e)))?;
    };
}

/// Adds a bridge function taking one guest-memory string argument.
macro_rules! surface_str_fn {
    ($linker:expr, $name:literal, |$surface:ident, $text:ident $(, $arg:ident : $ty:ty)*| $body:expr) => {
        $linker
            .func_wrap(
                IMPORT_MODULE,
                $name,
                |caller: Caller<'_, HostState>, ptr: i32, len: i32 $(, $arg: $ty)*| {
                    let Some($text) = read_str(&caller, ptr, len) else {
                        return;
                    };
                    let Some(handle) = caller.data().surface.clone() else {
                        return;
                    };
                    let mut $surface = handle.lock();
                    $body;
                },
            )
            .map_err(|e| GuestError::load(format!("Failed to add {}: {}", $name, e)))?;
    };
}

/// Installs the drawing import table into the linker.
pub fn install_import_bridge(linker: &mut Linker<HostState>) -> Result<(), GuestError> {
    // Style setters
    surface_fn!(linker, "globalAlpha", |s, alpha: f64| s.set_global_alpha(alpha));
    surface_str_fn!(linker, "fillStyle", |s, style| s.set_fill_style(&style));
    surface_str_fn!(linker, "strokeStyle", |s, style| s.set_stroke_style(&style));
    surface_fn!(linker, "lineWidth", |s, width: f64| s.set_line_width(width));
    surface_str_fn!(linker, "font", |s, font| s.set_font(&font));

    // Fill/stroke operations
    surface_str_fn!(linker, "fillText", |s, text, x: f64, y: f64| s.fill_text(&text, x, y));
    surface_fn!(linker, "fillRect", |s, x: f64, y: f64, w: f64, h: f64| s.fill_rect(x, y, w, h));
    surface_fn!(linker, "strokeRect", |s, x: f64, y: f64, w: f64, h: f64| {
        s.stroke_rect(x, y, w, h)
    });
    surface_fn!(linker, "fill", |s| s.fill());
    surface_fn!(linker, "stroke", |s| s.stroke());

    // Path construction
    surface_fn!(linker, "beginPath", |s| s.begin_path());
    surface_fn!(linker, "moveTo", |s, x: f64, y: f64| s.move_to(x, y));
    surface_fn!(linker, "lineTo", |s, x: f64, y: f64| s.line_to(x, y));
    surface_fn!(linker, "closePath", |s| s.close_path());
    surface_fn!(linker, "clip", |s| s.clip());

    // Transforms
    surface_fn!(linker, "rotate", |s, angle: f64| s.rotate(angle));
    surface_fn!(linker, "scale", |s, x: f64, y: f64| s.scale(x, y));
    surface_fn!(linker, "translate", |s, x: f64, y: f64| s.translate(x, y));
    surface_fn!(linker, "transform", |s, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64| {
        s.transform(a, b, c, d, e, f)
    });
    surface_fn!(linker, "setTransform", |s, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64| {
        s.set_transform(a, b, c, d, e, f)
    });
    surface_fn!(linker, "resetTransform", |s| s.reset_transform());

    // Context lifecycle
    surface_fn!(linker, "save", |s| s.save());
    surface_fn!(linker, "restore", |s| s.restore());
    surface_fn!(linker, "reset", |s| s.reset());

    Ok(())
}

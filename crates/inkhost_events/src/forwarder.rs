//! Event forwarding.
//!
//! Maps host pointer, resize, and ratio events 1:1 onto the module handle's
//! bus. Pointer coordinates are translated from client space into the raw
//! offset from the target's bounding-rect origin; nothing here scales them.

use std::sync::Arc;

use tracing::trace;

use inkhost_guest::ModuleHandle;
use inkhost_surface::DrawTarget;

use crate::InputEvent;

/// A pointer position relative to the draw target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
    /// Backing-to-CSS scale, carried for consumers that need it. The
    /// coordinates themselves stay in CSS offset space.
    pub ratio: f64,
}

/// Forwards host events to one module handle.
pub struct EventForwarder {
    target: Arc<dyn DrawTarget>,
    handle: Arc<ModuleHandle>,
    device_ratio: f64,
}

impl EventForwarder {
    pub fn new(target: Arc<dyn DrawTarget>, handle: Arc<ModuleHandle>, device_ratio: f64) -> Self {
        Self { target, handle, device_ratio }
    }

    /// Translates a client-space pointer position.
    ///
    /// The offset is measured from the bounding-rect origin. The effective
    /// ratio is backing width over CSS width, falling back to the device
    /// ratio when the CSS width is zero (detached or zero-sized target).
    pub fn pointer_position(&self, client_x: f64, client_y: f64) -> PointerPosition {
        let rect = self.target.bounding_rect();
        let (backing_width, _) = self.target.backing_size();
        let ratio = if rect.width == 0.0 {
            self.device_ratio
        } else {
            backing_width as f64 / rect.width
        };
        PointerPosition {
            x: client_x - rect.left,
            y: client_y - rect.top,
            ratio,
        }
    }

    /// Dispatches one host event onto the bus.
    pub fn dispatch(&self, event: InputEvent) {
        trace!(?event, "Dispatching host event");
        let bus = self.handle.bus();
        match event {
            InputEvent::MouseDown { x, y } => {
                let p = self.pointer_position(x, y);
                bus.emit_mouse_down(p.x, p.y);
            }
            InputEvent::MouseUp { x, y } => {
                let p = self.pointer_position(x, y);
                bus.emit_mouse_up(p.x, p.y);
            }
            InputEvent::MouseMove { x, y } => {
                let p = self.pointer_position(x, y);
                bus.emit_mouse_move(p.x, p.y);
            }
            InputEvent::Resize { width, height } => bus.emit_resize(width, height),
            InputEvent::PixelRatioChanged { ratio } => bus.emit_pixel_ratio(ratio),
            InputEvent::FrameTick { delta_seconds } => bus.emit_update(delta_seconds),
        }
    }

    /// Reacts to a parent layout-size change: syncs the target's backing
    /// pixel store to the parent content box, then forwards the new pixel
    /// dimensions. A detached target is left untouched.
    pub fn on_parent_resized(&self) {
        let Some((width, height)) = self.target.parent_content_box() else {
            return;
        };
        self.target.set_backing_size(width, height);
        self.handle.bus().emit_resize(width as f64, height as f64);
    }
}

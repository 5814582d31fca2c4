//! Per-module-handle event bus.
//!
//! Named callback slots for the host-side event wiring, owned by the
//! [`ModuleHandle`](crate::ModuleHandle) and torn down with it. Replaces
//! process-wide mutable callback fields: `reset` clears the slots on this
//! bus only, never global state.

use parking_lot::Mutex;

type PointerSlot = Mutex<Option<Box<dyn Fn(f64, f64) + Send + Sync>>>;
type ScalarSlot = Mutex<Option<Box<dyn Fn(f64) + Send + Sync>>>;

/// Named callback slots for forwarded host events.
///
/// Emitting into an empty slot is a no-op; events are ephemeral and never
/// stored beyond the current dispatch.
#[derive(Default)]
pub struct EventBus {
    mouse_down: PointerSlot,
    mouse_up: PointerSlot,
    mouse_move: PointerSlot,
    resize: PointerSlot,
    update: ScalarSlot,
    pixel_ratio: ScalarSlot,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mouse_down(&self, f: impl Fn(f64, f64) + Send + Sync + 'static) {
        *self.mouse_down.lock() = Some(Box::new(f));
    }

    pub fn set_mouse_up(&self, f: impl Fn(f64, f64) + Send + Sync + 'static) {
        *self.mouse_up.lock() = Some(Box::new(f));
    }

    pub fn set_mouse_move(&self, f: impl Fn(f64, f64) + Send + Sync + 'static) {
        *self.mouse_move.lock() = Some(Box::new(f));
    }

    pub fn set_resize(&self, f: impl Fn(f64, f64) + Send + Sync + 'static) {
        *self.resize.lock() = Some(Box::new(f));
    }

    pub fn set_update(&self, f: impl Fn(f64) + Send + Sync + 'static) {
        *self.update.lock() = Some(Box::new(f));
    }

    pub fn set_pixel_ratio(&self, f: impl Fn(f64) + Send + Sync + 'static) {
        *self.pixel_ratio.lock() = Some(Box::new(f));
    }

    pub fn emit_mouse_down(&self, x: f64, y: f64) {
        if let Some(f) = self.mouse_down.lock().as_ref() {
            f(x, y);
        }
    }

    pub fn emit_mouse_up(&self, x: f64, y: f64) {
        if let Some(f) = self.mouse_up.lock().as_ref() {
            f(x, y);
        }
    }

    pub fn emit_mouse_move(&self, x: f64, y: f64) {
        if let Some(f) = self.mouse_move.lock().as_ref() {
            f(x, y);
        }
    }

    pub fn emit_resize(&self, width: f64, height: f64) {
        if let Some(f) = self.resize.lock().as_ref() {
            f(width, height);
        }
    }

    pub fn emit_update(&self, delta_seconds: f64) {
        if let Some(f) = self.update.lock().as_ref() {
            f(delta_seconds);
        }
    }

    pub fn emit_pixel_ratio(&self, ratio: f64) {
        if let Some(f) = self.pixel_ratio.lock().as_ref() {
            f(ratio);
        }
    }

    /// Clears every slot. Idempotent.
    pub fn reset(&self) {
        *self.mouse_down.lock() = None;
        *self.mouse_up.lock() = None;
        *self.mouse_move.lock() = None;
        *self.resize.lock() = None;
        *self.update.lock() = None;
        *self.pixel_ratio.lock() = None;
    }

    /// Whether any slot currently holds a callback.
    pub fn has_callbacks(&self) -> bool {
        self.mouse_down.lock().is_some()
            || self.mouse_up.lock().is_some()
            || self.mouse_move.lock().is_some()
            || self.resize.lock().is_some()
            || self.update.lock().is_some()
            || self.pixel_ratio.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emit_into_empty_slot_is_noop() {
        let bus = EventBus::new();
        bus.emit_mouse_move(1.0, 2.0);
        bus.emit_update(0.016);
    }

    #[test]
    fn emit_invokes_registered_callback() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        bus.set_mouse_down(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit_mouse_down(5.0, 5.0);
        bus.emit_mouse_down(6.0, 6.0);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reset_clears_all_slots() {
        let bus = EventBus::new();
        bus.set_update(|_| {});
        bus.set_resize(|_, _| {});
        assert!(bus.has_callbacks());

        bus.reset();
        assert!(!bus.has_callbacks());
    }

    #[test]
    fn reset_is_idempotent() {
        let bus = EventBus::new();
        bus.set_pixel_ratio(|_| {});

        bus.reset();
        let after_one = bus.has_callbacks();
        bus.reset();
        let after_two = bus.has_callbacks();

        assert_eq!(after_one, after_two);
        assert!(!after_two);
    }
}

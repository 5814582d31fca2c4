//! The shared module handle.
//!
//! Created once per bootstrap, immutable after reaching `Ready`, never
//! recreated. The export table is shared read-only by the bridge, the frame
//! clock, the event forwarder, and the session coordinator; guest calls
//! serialize through the module's store lock.

use std::sync::Arc;

use tracing::warn;

use crate::bus::EventBus;
use crate::engine::CompilationEngine;
use crate::module::GuestModule;
use crate::wire::{CompilationId, CompletionItem, Diagnostic};
use crate::GuestError;

/// Lifecycle phase of the guest module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModulePhase {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

/// A ready guest module plus its event bus.
pub struct ModuleHandle {
    module: GuestModule,
    bus: EventBus,
}

impl ModuleHandle {
    pub fn new(module: GuestModule) -> Arc<Self> {
        Arc::new(Self { module, bus: EventBus::new() })
    }

    pub fn module(&self) -> &GuestModule {
        &self.module
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Clears every bus slot and the guest's own callback registrations.
    /// Idempotent.
    pub fn reset(&self) -> Result<(), GuestError> {
        self.bus.reset();
        self.module.reset()
    }

    /// Wires the bus slots to the guest export table.
    ///
    /// Slots hold weak references so the bus (owned by this handle) never
    /// keeps the handle alive. A failed guest call is logged, never
    /// propagated into the event source.
    pub fn wire_bus(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.bus.set_mouse_down(forward_pointer(weak.clone(), GuestModule::call_mouse_down));
        self.bus.set_mouse_up(forward_pointer(weak.clone(), GuestModule::call_mouse_up));
        self.bus.set_mouse_move(forward_pointer(weak.clone(), GuestModule::call_mouse_move));
        self.bus.set_resize(forward_pointer(weak.clone(), GuestModule::call_resize));
        self.bus.set_update(forward_scalar(weak.clone(), GuestModule::call_update));
        self.bus.set_pixel_ratio(forward_scalar(weak, GuestModule::call_pixel_ratio));
    }
}

fn forward_pointer(
    weak: std::sync::Weak<ModuleHandle>,
    call: fn(&GuestModule, f64, f64) -> Result<(), GuestError>,
) -> impl Fn(f64, f64) + Send + Sync + 'static {
    move |x, y| {
        if let Some(handle) = weak.upgrade()
            && let Err(e) = call(&handle.module, x, y)
        {
            warn!("Guest event callback failed: {}", e);
        }
    }
}

fn forward_scalar(
    weak: std::sync::Weak<ModuleHandle>,
    call: fn(&GuestModule, f64) -> Result<(), GuestError>,
) -> impl Fn(f64) + Send + Sync + 'static {
    move |value| {
        if let Some(handle) = weak.upgrade()
            && let Err(e) = call(&handle.module, value)
        {
            warn!("Guest event callback failed: {}", e);
        }
    }
}

impl CompilationEngine for ModuleHandle {
    fn create_compilation(&self, initial_text: &str) -> Result<CompilationId, GuestError> {
        self.module.create_compilation(initial_text)
    }

    fn recompile(&self, session: CompilationId, text: &str) -> Result<(), GuestError> {
        self.module.recompile(session, text)
    }

    fn get_completions(
        &self,
        session: CompilationId,
        offset: u32,
    ) -> Result<Vec<CompletionItem>, GuestError> {
        self.module.get_completions(session, offset)
    }

    fn get_diagnostics(&self, session: CompilationId) -> Result<Vec<Diagnostic>, GuestError> {
        self.module.get_diagnostics(session)
    }
}

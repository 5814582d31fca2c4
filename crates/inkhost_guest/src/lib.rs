//! # inkhost_guest
//!
//! Guest module hosting for the inkhost playground.
//!
//! This crate provides:
//! - [`GuestModule`]: a wasmi-backed guest instance with a typed export table
//! - The import bridge installing host drawing operations the guest calls
//!   synchronously while it executes
//! - [`EventBus`]: per-module-handle callback slots for host-side event wiring
//! - [`ModuleHandle`]: the shared, immutable-once-ready handle the rest of
//!   the host coordinates through
//!
//! The guest resolves its imports eagerly during its own startup, so the
//! bridge must be installed in the linker before instantiation. Drawing
//! calls issued before the surface exists are silently dropped rather than
//! buffered; a guest-issued drawing call must never halt guest execution.

mod bridge;
mod bus;
mod engine;
mod error;
mod handle;
mod module;
mod wire;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use bridge::{IMPORT_MODULE, install_import_bridge};
pub use bus::EventBus;
pub use engine::CompilationEngine;
pub use error::GuestError;
pub use handle::{ModuleHandle, ModulePhase};
pub use module::GuestModule;
pub use wire::{CompilationId, CompletionItem, Diagnostic, Severity};

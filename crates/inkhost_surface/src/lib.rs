//! # inkhost_surface
//!
//! Drawing surface abstraction for the inkhost playground host.
//!
//! This crate provides:
//! - The [`Context2D`] capability trait the guest draws through
//! - [`DrawTarget`], combining a drawing context with surface geometry
//! - [`SurfaceProvider`], a value-or-accessor that eventually yields a target
//! - [`RecordingCanvas`], a reference target that records draw commands
//!
//! The host owns the surface; the call bridge only ever holds a shared,
//! non-owning [`SharedContext2D`] handle.

mod context;
mod target;

pub use context::{Context2D, DrawCommand, RecordingSurface};
pub use target::{BoundingRect, DrawTarget, RecordingCanvas, SharedContext2D, SurfaceProvider};

//! # inkhost_session
//!
//! Keeps the editor's linting and completion state synchronized with the
//! guest's compilation engine:
//! - [`SessionCoordinator`]: lazy, single-flight session creation plus
//!   fire-and-forget recompilation on document changes
//! - [`adapter`]: guest wire shapes converted to `tower_lsp::lsp_types`
//!   editor shapes
//!
//! Nothing here cancels in-flight work. Queries issued against a stale
//! document resolve with whatever the guest computed; consumers treat the
//! most recently resolved result as authoritative.

pub mod adapter;
mod coordinator;
mod error;

pub use tower_lsp::lsp_types;

pub use coordinator::{SessionCoordinator, SessionPhase};
pub use error::{QueryError, SessionError};

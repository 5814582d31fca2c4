//! Compilation engine abstraction.
//!
//! The session coordinator talks to the guest's compilation surface through
//! this trait rather than the concrete module, so it can be exercised
//! against controllable fakes.

use crate::wire::{CompilationId, CompletionItem, Diagnostic};
use crate::GuestError;

/// The guest's compilation surface.
///
/// None of the operations are cancellable: a caller that issues a second
/// request before the first resolves does not cancel the first, and
/// responses may resolve out of issuance order. Consumers must treat the
/// most recently *resolved* result as authoritative.
pub trait CompilationEngine: Send + Sync {
    /// Creates a compilation session seeded with `initial_text`.
    fn create_compilation(&self, initial_text: &str) -> Result<CompilationId, GuestError>;

    /// Requests recompilation against the full current document text.
    /// Fire-and-forget: no coalescing, no cancellation of earlier requests.
    fn recompile(&self, session: CompilationId, text: &str) -> Result<(), GuestError>;

    /// Completion items for the cursor offset captured at request time.
    fn get_completions(
        &self,
        session: CompilationId,
        offset: u32,
    ) -> Result<Vec<CompletionItem>, GuestError>;

    /// Diagnostics for the most recently compiled document.
    fn get_diagnostics(&self, session: CompilationId) -> Result<Vec<Diagnostic>, GuestError>;
}

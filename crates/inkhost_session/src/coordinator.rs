//! The compilation session coordinator.
//!
//! One coordinator owns at most one live session. Creation is lazy and
//! single-flight: the memoized cell is both the guard and the result, so
//! any number of concurrent callers produce exactly one session. A failed
//! creation initializes the cell empty and the coordinator stays pending
//! for its remaining lifetime; tearing the coordinator down is the only
//! way to start over.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::{Notify, OnceCell};
use tower_lsp::lsp_types;
use tracing::{debug, warn};

use inkhost_guest::{CompilationEngine, CompilationId};

use crate::adapter;
use crate::{QueryError, SessionError};

/// Coordinator lifecycle as the editor sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing requested a session yet.
    NoSession,
    /// Creation kicked off, or failed permanently.
    Pending,
    /// The session serves queries.
    Ready,
}

struct Session<E> {
    engine: Arc<E>,
    id: CompilationId,
}

/// Lazily creates one compilation session and keeps it fed with the
/// current document.
pub struct SessionCoordinator<E: CompilationEngine> {
    cell: OnceCell<Option<Session<E>>>,
    document: Mutex<String>,
    started: AtomicBool,
    ready: Notify,
}

impl<E: CompilationEngine + 'static> Default for SessionCoordinator<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CompilationEngine + 'static> SessionCoordinator<E> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            document: Mutex::new(String::new()),
            started: AtomicBool::new(false),
            ready: Notify::new(),
        }
    }

    /// Ensures a session exists once the module becomes available.
    ///
    /// Idempotent under any amount of concurrency: the first caller runs
    /// the creation, everyone else awaits the same cell. `module` resolving
    /// to `None` (the module never loaded) or a failed creation both leave
    /// the coordinator pending with no retry.
    pub async fn ensure_session<Fut>(&self, module: Fut)
    where
        Fut: Future<Output = Option<Arc<E>>> + Send,
    {
        self.started.store(true, Ordering::SeqCst);
        self.cell
            .get_or_init(|| async {
                let Some(engine) = module.await else {
                    warn!("Module never became available; session stays pending");
                    return None;
                };
                let text = self.document.lock().clone();
                match engine.create_compilation(&text) {
                    Ok(id) => {
                        debug!(session = id.0, "Compilation session created");
                        Some(Session { engine, id })
                    }
                    Err(e) => {
                        warn!("{}", SessionError::Create(e));
                        None
                    }
                }
            })
            .await;

        if self.ready_session().is_some() {
            self.ready.notify_waiters();
        }
    }

    /// Records the new document text; once ready, every change issues a
    /// fire-and-forget recompilation with the full text. No coalescing, no
    /// cancellation: when requests race, resolution order wins.
    pub fn on_document_changed(&self, text: &str) {
        *self.document.lock() = text.to_string();

        let Some(Some(session)) = self.cell.get() else {
            return;
        };
        let engine = Arc::clone(&session.engine);
        let id = session.id;
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = engine.recompile(id, &text) {
                warn!("Recompilation failed: {}", e);
            }
        });
    }

    /// Completion items for `offset`, adapted to editor shapes.
    ///
    /// Empty immediately unless ready; a failed round trip degrades to
    /// empty with a logged warning.
    pub fn get_completions(&self, offset: u32) -> Vec<lsp_types::CompletionItem> {
        let Some(session) = self.ready_session() else {
            return Vec::new();
        };
        match session
            .engine
            .get_completions(session.id, offset)
            .map_err(QueryError::from)
        {
            Ok(items) => items.iter().map(adapter::to_lsp_completion).collect(),
            Err(e) => {
                warn!("Completions query failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Diagnostics for the current document, adapted to editor shapes.
    pub fn get_diagnostics(&self) -> Vec<lsp_types::Diagnostic> {
        let Some(session) = self.ready_session() else {
            return Vec::new();
        };
        let text = self.document.lock().clone();
        match session
            .engine
            .get_diagnostics(session.id)
            .map_err(QueryError::from)
        {
            Ok(diags) => diags
                .iter()
                .filter_map(|d| adapter::to_lsp_diagnostic(d, &text))
                .collect(),
            Err(e) => {
                warn!("Diagnostics query failed: {}", e);
                Vec::new()
            }
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.cell.get() {
            Some(Some(_)) => SessionPhase::Ready,
            Some(None) => SessionPhase::Pending,
            None if self.started.load(Ordering::SeqCst) => SessionPhase::Pending,
            None => SessionPhase::NoSession,
        }
    }

    /// Resolves once the session is ready. Never resolves for a coordinator
    /// whose creation failed.
    pub async fn ready(&self) {
        loop {
            let notified = self.ready.notified();
            if self.ready_session().is_some() {
                return;
            }
            notified.await;
        }
    }

    fn ready_session(&self) -> Option<&Session<E>> {
        self.cell.get().and_then(Option::as_ref)
    }
}

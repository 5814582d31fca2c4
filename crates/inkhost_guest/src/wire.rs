//! Wire types crossing the guest boundary.
//!
//! The guest reports diagnostics and completion items as UTF-8 JSON; these
//! are the host-side shapes. They are deliberately distinct from the
//! editor-facing shapes, which the session layer produces by adaptation.

use serde::{Deserialize, Serialize};

/// Opaque reference to a compilation session inside the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompilationId(pub i32);

/// Severity level reported by the guest.
///
/// The guest's vocabulary is wider than the editor's; unrecognized values
/// deserialize as [`Severity::Unknown`] so the mapping downstream stays
/// total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
    Hidden,
    #[serde(other)]
    Unknown,
}

/// A diagnostic produced by the guest for the latest requested document.
///
/// Never cached across document versions beyond the latest request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Start byte offset in the document.
    pub start: u32,
    /// End byte offset in the document.
    pub end: u32,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    #[serde(default)]
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(start: u32, end: u32, message: impl Into<String>, severity: Severity) -> Self {
        Self { start, end, message: message.into(), severity }
    }
}

/// A completion item produced by the guest for a cursor offset.
///
/// Keyed to the offset captured at request time; if the document has
/// changed since, the item may be stale. The host makes no invalidation
/// guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    /// Text shown in the completion list.
    pub display_text: String,
    /// Short description shown inline next to the item.
    #[serde(default)]
    pub inline_description: String,
    /// Ordered classification tags (e.g. "Class", "Public").
    #[serde(default)]
    pub tags: Vec<String>,
}

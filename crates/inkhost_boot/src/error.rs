//! Bootstrap error taxonomy.

use thiserror::Error;

use inkhost_guest::GuestError;

use crate::integrity::IntegrityError;

/// Terminal bootstrap failure. No variant is retried.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// No surface provider was configured in the options.
    #[error("No surface provider configured")]
    NoSurfaceProvider,

    /// The provider yielded a target that cannot produce a 2D context.
    #[error("Surface target has no 2D context adapter")]
    NoContextAdapter,

    /// Manifest failed to parse or is structurally incomplete.
    #[error("Invalid resource manifest: {0}")]
    InvalidManifest(String),

    /// An asset or manifest fetch failed.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// An asset's integrity pin is malformed or its bytes do not match.
    #[error("Integrity check failed for {url}: {source}")]
    Integrity {
        url: String,
        #[source]
        source: IntegrityError,
    },

    /// Guest compilation, instantiation, or seed call failure.
    #[error("Guest error: {0}")]
    Guest(#[from] GuestError),
}

impl BootstrapError {
    pub fn invalid_manifest(reason: impl Into<String>) -> Self {
        Self::InvalidManifest(reason.into())
    }

    pub fn fetch(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Fetch { url: url.into(), reason: reason.to_string() }
    }

    pub fn integrity(url: impl Into<String>, source: IntegrityError) -> Self {
        Self::Integrity { url: url.into(), source }
    }
}

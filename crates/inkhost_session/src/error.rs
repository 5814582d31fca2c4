//! Session error taxonomy.
//!
//! Neither error surfaces to the editor. A [`SessionError`] leaves the
//! coordinator pending; a [`QueryError`] is recovered locally as an empty
//! result set. Both are logged.

use thiserror::Error;

use inkhost_guest::GuestError;

/// Session creation failed. The coordinator stays pending, no retry.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session creation failed: {0}")]
    Create(#[from] GuestError),
}

/// A completion or diagnostic round trip failed.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query round trip failed: {0}")]
    Guest(#[from] GuestError),
}

//! Guest module error types.

use thiserror::Error;

/// Errors that can occur while loading or calling the guest module.
#[derive(Debug, Error)]
pub enum GuestError {
    /// Failed to load or instantiate the guest module.
    #[error("Failed to load guest module: {0}")]
    LoadError(String),

    /// A call into the guest failed.
    #[error("Guest call failed: {0}")]
    CallError(String),

    /// The guest returned a malformed payload.
    #[error("Invalid guest payload: {0}")]
    InvalidPayload(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GuestError {
    /// Creates a load error.
    pub fn load(message: impl Into<String>) -> Self {
        Self::LoadError(message.into())
    }

    /// Creates a call error.
    pub fn call(message: impl Into<String>) -> Self {
        Self::CallError(message.into())
    }

    /// Creates an invalid payload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }
}

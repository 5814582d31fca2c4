//! Asset integrity pins.
//!
//! The manifest may pin each asset to a sha256 digest, either as bare hex
//! or SRI-style (`sha256-` prefixed). The pin is parsed into a typed
//! digest before anything downloads, so a malformed manifest value fails
//! the same way a missing category does rather than surfacing mid-download.

use std::fmt;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Why an asset failed its integrity gate.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// The manifest's integrity value is not a sha256 digest.
    #[error("Malformed integrity pin {value:?}: expected 64 hex digits, optionally prefixed with sha256-")]
    Malformed { value: String },

    /// The downloaded bytes do not hash to the pinned digest.
    #[error("Digest mismatch: manifest pins {pinned}, downloaded bytes hash to {computed}")]
    Mismatch { pinned: String, computed: String },
}

/// A sha256 digest pinning one manifest asset.
///
/// Stored as lowercase hex; displays in the SRI-style form the manifest
/// uses, so a computed digest can be written straight back into a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityDigest {
    hex: String,
}

impl IntegrityDigest {
    /// Parses a manifest integrity value. The `sha256-` prefix is optional
    /// and hex case is ignored.
    pub fn parse(value: &str) -> Result<Self, IntegrityError> {
        let hex_part = value.strip_prefix("sha256-").unwrap_or(value);
        if hex_part.len() != 64 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IntegrityError::Malformed { value: value.to_string() });
        }
        Ok(Self { hex: hex_part.to_ascii_lowercase() })
    }

    /// The digest of the given bytes.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self { hex: hex::encode(Sha256::digest(bytes)) }
    }

    /// Checks downloaded bytes against this pin.
    pub fn check(&self, bytes: &[u8]) -> Result<(), IntegrityError> {
        let computed = Self::of_bytes(bytes);
        if computed.hex == self.hex {
            Ok(())
        } else {
            Err(IntegrityError::Mismatch {
                pinned: self.hex.clone(),
                computed: computed.hex,
            })
        }
    }
}

impl fmt::Display for IntegrityDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256-{}", self.hex)
    }
}

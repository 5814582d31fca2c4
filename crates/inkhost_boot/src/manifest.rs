//! The resource manifest.
//!
//! Describes the assets the guest needs before it can start: the core
//! runtime assembly, application assemblies, debug symbols, ICU data, and
//! per-locale satellite resources. The manifest is produced by the guest's
//! build pipeline; the host only consumes it.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::BootstrapError;
use crate::integrity::{IntegrityDigest, IntegrityError};

/// One downloadable asset.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Path the guest knows the asset by.
    pub virtual_path: String,
    /// Where to fetch it from. Assets without one are skipped, not errors.
    #[serde(default)]
    pub resolved_url: Option<String>,
    /// SHA256 hex digest, optionally `sha256-` prefixed.
    #[serde(default)]
    pub integrity: Option<String>,
}

impl Asset {
    /// The parsed integrity pin, if the manifest carries one.
    pub fn integrity_digest(&self) -> Option<Result<IntegrityDigest, IntegrityError>> {
        self.integrity.as_deref().map(IntegrityDigest::parse)
    }
}

/// The parsed resource manifest.
///
/// `assembly`, `core_assembly`, and `satellite_resources` are structurally
/// required: their absence is a malformed manifest even when empty lists
/// would be acceptable. `pdb` and `icu` are genuinely optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceManifest {
    pub assembly: Option<Vec<Asset>>,
    pub core_assembly: Option<Vec<Asset>>,
    #[serde(default)]
    pub pdb: Vec<Asset>,
    #[serde(default)]
    pub icu: Vec<Asset>,
    pub satellite_resources: Option<BTreeMap<String, Vec<Asset>>>,
}

impl ResourceManifest {
    /// Structural validation: the three required categories must be present.
    pub fn validate(&self) -> Result<(), BootstrapError> {
        if self.assembly.is_none() {
            return Err(BootstrapError::invalid_manifest("missing assembly category"));
        }
        if self.core_assembly.is_none() {
            return Err(BootstrapError::invalid_manifest("missing coreAssembly category"));
        }
        if self.satellite_resources.is_none() {
            return Err(BootstrapError::invalid_manifest(
                "missing satelliteResources category",
            ));
        }
        Ok(())
    }

    /// The fixed progress denominator: assemblies, symbols, and ICU data,
    /// plus one unit for the final guest handshake.
    pub fn resources_to_load(&self) -> usize {
        let assemblies = self.assembly.as_deref().map_or(0, <[Asset]>::len);
        assemblies + self.pdb.len() + self.icu.len() + 1
    }

    /// All assets in download order: core runtime first, then application
    /// assemblies, satellites, symbols, and ICU data.
    pub fn assets_in_download_order(&self) -> Vec<&Asset> {
        let mut assets = Vec::new();
        assets.extend(self.core_assembly.iter().flatten());
        assets.extend(self.assembly.iter().flatten());
        assets.extend(self.satellite_resources.iter().flat_map(BTreeMap::values).flatten());
        assets.extend(&self.pdb);
        assets.extend(&self.icu);
        assets
    }

    /// The first core runtime asset, the one the guest is instantiated from.
    pub fn core_asset(&self) -> Option<&Asset> {
        self.core_assembly.as_deref().and_then(<[Asset]>::first)
    }
}

//! # inkhost_boot
//!
//! Bootstraps a guest module from a resource manifest: fetches and verifies
//! the assets, waits for the drawing surface, instantiates the guest with
//! the import bridge installed, seeds it, and hands back a ready
//! [`ReadyModule`].
//!
//! Bootstrap failures are terminal: nothing here retries, and a
//! [`BootstrapError`] from [`Bootstrapper::initialize`] means the embedder
//! must start over with fresh options.

mod bootstrap;
mod error;
mod fetch;
mod integrity;
mod manifest;
mod options;
mod progress;

pub use bootstrap::{Bootstrapper, ReadyModule};
pub use error::BootstrapError;
pub use fetch::{AssetFetcher, FileAssetFetcher, HttpAssetFetcher};
pub use integrity::{IntegrityDigest, IntegrityError};
pub use manifest::{Asset, ResourceManifest};
pub use options::BootOptions;
pub use progress::ProgressTracker;

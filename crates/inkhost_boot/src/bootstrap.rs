//! The bootstrap sequence.
//!
//! Order matters: the manifest is validated before anything downloads, the
//! surface must resolve before instantiation (the import bridge needs the
//! context, and the guest resolves its imports eagerly at start), and the
//! guest is seeded before the event bus goes live.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use inkhost_events::EventForwarder;
use inkhost_guest::{GuestModule, ModuleHandle, ModulePhase};
use inkhost_surface::{DrawTarget, SurfaceProvider};

use crate::error::BootstrapError;
use crate::fetch::AssetFetcher;
use crate::manifest::{Asset, ResourceManifest};
use crate::options::BootOptions;
use crate::progress::ProgressTracker;

/// Delay between surface provider polls.
const SURFACE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A bootstrapped guest: the shared handle plus the forwarder wired to it.
pub struct ReadyModule {
    pub handle: Arc<ModuleHandle>,
    pub forwarder: EventForwarder,
}

/// Runs the bootstrap sequence against an asset source.
pub struct Bootstrapper<F: AssetFetcher> {
    fetcher: F,
    phase: Mutex<ModulePhase>,
}

impl<F: AssetFetcher> Bootstrapper<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher, phase: Mutex::new(ModulePhase::Uninitialized) }
    }

    /// The module lifecycle phase as of the last observation.
    pub fn phase(&self) -> ModulePhase {
        *self.phase.lock()
    }

    /// Initializes a guest module from the manifest at `manifest_url`.
    ///
    /// Every failure is terminal; the caller starts over with a fresh
    /// bootstrapper and options if it wants to retry.
    pub async fn initialize(
        &self,
        manifest_url: &str,
        options: BootOptions,
    ) -> Result<ReadyModule, BootstrapError> {
        *self.phase.lock() = ModulePhase::Loading;
        match self.run_boot(manifest_url, options).await {
            Ok(ready) => {
                *self.phase.lock() = ModulePhase::Ready;
                Ok(ready)
            }
            Err(e) => {
                *self.phase.lock() = ModulePhase::Failed;
                error!("Bootstrap failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run_boot(
        &self,
        manifest_url: &str,
        options: BootOptions,
    ) -> Result<ReadyModule, BootstrapError> {
        let BootOptions {
            surface,
            debug_level,
            enable_diagnostic_tracing,
            disable_integrity_check,
            assemblies_url,
            on_config_loaded,
            on_download_resource_progress,
            initial_pixel_ratio,
        } = options;

        let provider = surface.ok_or(BootstrapError::NoSurfaceProvider)?;
        let pixel_ratio = initial_pixel_ratio.unwrap_or(1.0);
        info!(manifest_url, debug_level, "Bootstrapping guest module");

        let manifest_bytes = self.fetcher.fetch(manifest_url).await?;
        let manifest: ResourceManifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| BootstrapError::invalid_manifest(e.to_string()))?;
        manifest.validate()?;
        if let Some(hook) = &on_config_loaded {
            hook(&manifest);
        }

        let tracker = ProgressTracker::new(on_download_resource_progress);
        tracker.set_total(manifest.resources_to_load());

        let target = wait_for_target(&provider).await;
        let context = target.context2d().ok_or(BootstrapError::NoContextAdapter)?;

        let core_virtual_path = manifest.core_asset().map(|a| a.virtual_path.clone());
        let mut core_bytes: Option<Vec<u8>> = None;
        let mut resolved_urls = Vec::new();

        for asset in manifest.assets_in_download_order() {
            let Some(url) = resolve_asset_url(asset, assemblies_url.as_ref()) else {
                debug!(virtual_path = %asset.virtual_path, "Asset has no resolved URL; skipping");
                continue;
            };
            if enable_diagnostic_tracing {
                debug!(url, virtual_path = %asset.virtual_path, "Downloading asset");
            }

            let bytes = self.fetcher.fetch(&url).await?;
            if !disable_integrity_check
                && let Some(pin) = asset.integrity_digest()
            {
                pin.and_then(|digest| digest.check(&bytes))
                    .map_err(|e| BootstrapError::integrity(&url, e))?;
            }
            tracker.advance();

            if core_bytes.is_none() && Some(&asset.virtual_path) == core_virtual_path.as_ref() {
                core_bytes = Some(bytes);
            }
            resolved_urls.push(url);
        }

        let core = core_bytes.ok_or_else(|| {
            BootstrapError::invalid_manifest("no core assembly asset with a resolved URL")
        })?;

        // Bridge installation happens inside instantiate, before the guest
        // starts.
        let module = GuestModule::instantiate(&core, Some(context))?;
        let handle = ModuleHandle::new(module);

        handle.module().reset()?;
        handle.module().call_pixel_ratio(pixel_ratio)?;
        handle.module().init_assets(&resolved_urls)?;
        // The handshake is the final progress unit.
        tracker.advance();

        let (loaded, total) = tracker.snapshot();
        info!(loaded, total, "Guest module ready");

        handle.wire_bus();
        let forwarder = EventForwarder::new(target, Arc::clone(&handle), pixel_ratio);
        Ok(ReadyModule { handle, forwarder })
    }
}

async fn wait_for_target(provider: &SurfaceProvider) -> Arc<dyn DrawTarget> {
    loop {
        if let Some(target) = provider.get() {
            return target;
        }
        trace!("Surface target not ready; polling again");
        tokio::time::sleep(SURFACE_POLL_INTERVAL).await;
    }
}

fn resolve_asset_url(asset: &Asset, base: Option<&Url>) -> Option<String> {
    if let Some(base) = base {
        return match base.join(&asset.virtual_path) {
            Ok(url) => Some(url.into()),
            Err(e) => {
                warn!(virtual_path = %asset.virtual_path, "Cannot rebase asset: {}", e);
                None
            }
        };
    }
    asset.resolved_url.clone()
}

//! Bootstrap options.

use url::Url;

use inkhost_surface::SurfaceProvider;

use crate::manifest::ResourceManifest;

pub(crate) type ConfigHook = Box<dyn Fn(&ResourceManifest) + Send + Sync>;
pub(crate) type ProgressHook = Box<dyn Fn(usize, usize) + Send + Sync>;

/// The recognized bootstrap configuration surface.
///
/// Everything except the surface provider has a working default.
#[derive(Default)]
pub struct BootOptions {
    pub(crate) surface: Option<SurfaceProvider>,
    pub(crate) debug_level: i32,
    pub(crate) enable_diagnostic_tracing: bool,
    pub(crate) disable_integrity_check: bool,
    pub(crate) assemblies_url: Option<Url>,
    pub(crate) on_config_loaded: Option<ConfigHook>,
    pub(crate) on_download_resource_progress: Option<ProgressHook>,
    pub(crate) initial_pixel_ratio: Option<f64>,
}

impl BootOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The drawing surface provider. Required.
    pub fn surface(mut self, provider: SurfaceProvider) -> Self {
        self.surface = Some(provider);
        self
    }

    /// Debug verbosity marker, recorded in the bootstrap log. Default 0.
    pub fn debug_level(mut self, level: i32) -> Self {
        self.debug_level = level;
        self
    }

    /// Extra per-asset tracing during bootstrap.
    pub fn enable_diagnostic_tracing(mut self, enable: bool) -> Self {
        self.enable_diagnostic_tracing = enable;
        self
    }

    /// Skips sha256 verification of downloaded assets.
    pub fn disable_integrity_check(mut self, disable: bool) -> Self {
        self.disable_integrity_check = disable;
        self
    }

    /// Rebases every asset onto this URL by its virtual path, overriding
    /// the manifest's resolved URLs.
    pub fn assemblies_url(mut self, base: Url) -> Self {
        self.assemblies_url = Some(base);
        self
    }

    /// Fires once after the manifest parses and validates.
    pub fn on_config_loaded(mut self, hook: impl Fn(&ResourceManifest) + Send + Sync + 'static) -> Self {
        self.on_config_loaded = Some(Box::new(hook));
        self
    }

    /// Fires with `(loaded, total)` after every asset fetch.
    pub fn on_download_resource_progress(
        mut self,
        hook: impl Fn(usize, usize) + Send + Sync + 'static,
    ) -> Self {
        self.on_download_resource_progress = Some(Box::new(hook));
        self
    }

    /// Pixel ratio seeded into the guest right after instantiation.
    /// Default 1.0.
    pub fn initial_pixel_ratio(mut self, ratio: f64) -> Self {
        self.initial_pixel_ratio = Some(ratio);
        self
    }
}

//! Draw targets and surface providers.
//!
//! A [`DrawTarget`] is what the bootstrapper waits for: a drawing context
//! plus the geometry the event forwarder needs (bounding rectangle in CSS
//! space, backing pixel size, parent content box). The provider may not be
//! able to yield a target immediately because of layout timing outside the
//! host's control.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::{Context2D, RecordingSurface};

/// Shared, non-owning handle to a drawing context.
///
/// Held by the import bridge for the lifetime of the guest module; the host
/// remains the owner of the underlying surface.
pub type SharedContext2D = Arc<Mutex<dyn Context2D>>;

/// Bounding rectangle of a target in CSS pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// A drawing target: context acquisition plus layout geometry.
///
/// `context2d` is the capability check the bootstrapper performs before
/// accepting a target: a provider that yields something unable to produce a
/// context is rejected with a typed error rather than silently accepted.
pub trait DrawTarget: Send + Sync {
    /// Acquires the drawing context adapter, if this target has one.
    fn context2d(&self) -> Option<SharedContext2D>;

    /// Bounding rectangle in CSS pixel space.
    fn bounding_rect(&self) -> BoundingRect;

    /// Backing pixel dimensions (may differ from CSS dimensions).
    fn backing_size(&self) -> (u32, u32);

    /// Resizes the backing pixel store.
    fn set_backing_size(&self, width: u32, height: u32);

    /// Content box of the parent container in pixels, if the target is
    /// attached to one.
    fn parent_content_box(&self) -> Option<(u32, u32)>;
}

/// A value-or-accessor that eventually yields a drawing target.
///
/// The accessor form exists because the target may depend on layout timing:
/// the bootstrapper polls it until it yields something.
pub enum SurfaceProvider {
    /// A target that already exists.
    Value(Arc<dyn DrawTarget>),
    /// An accessor invoked on every poll; returns `None` until the target
    /// exists.
    Accessor(Box<dyn Fn() -> Option<Arc<dyn DrawTarget>> + Send + Sync>),
}

impl SurfaceProvider {
    /// Wraps an existing target.
    pub fn value(target: Arc<dyn DrawTarget>) -> Self {
        Self::Value(target)
    }

    /// Wraps a zero-argument accessor.
    pub fn accessor<F>(accessor: F) -> Self
    where
        F: Fn() -> Option<Arc<dyn DrawTarget>> + Send + Sync + 'static,
    {
        Self::Accessor(Box::new(accessor))
    }

    /// Attempts to resolve the target once.
    pub fn get(&self) -> Option<Arc<dyn DrawTarget>> {
        match self {
            Self::Value(target) => Some(Arc::clone(target)),
            Self::Accessor(accessor) => accessor(),
        }
    }
}

impl std::fmt::Debug for SurfaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(_) => f.write_str("SurfaceProvider::Value"),
            Self::Accessor(_) => f.write_str("SurfaceProvider::Accessor"),
        }
    }
}

/// In-memory draw target backed by a [`RecordingSurface`].
///
/// Geometry is mutable so tests and the CLI can simulate layout changes.
pub struct RecordingCanvas {
    surface: Arc<Mutex<RecordingSurface>>,
    geometry: Mutex<CanvasGeometry>,
}

struct CanvasGeometry {
    rect: BoundingRect,
    backing: (u32, u32),
    parent: Option<(u32, u32)>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: Arc::new(Mutex::new(RecordingSurface::new())),
            geometry: Mutex::new(CanvasGeometry {
                rect: BoundingRect::new(0.0, 0.0, width as f64, height as f64),
                backing: (width, height),
                parent: None,
            }),
        }
    }

    /// Direct handle to the recording, for inspecting what was drawn.
    pub fn surface(&self) -> Arc<Mutex<RecordingSurface>> {
        Arc::clone(&self.surface)
    }

    /// Overrides the CSS-space bounding rectangle.
    pub fn set_bounding_rect(&self, rect: BoundingRect) {
        self.geometry.lock().rect = rect;
    }

    /// Attaches the canvas to a parent container of the given content box.
    pub fn set_parent_content_box(&self, size: Option<(u32, u32)>) {
        self.geometry.lock().parent = size;
    }
}

impl DrawTarget for RecordingCanvas {
    fn context2d(&self) -> Option<SharedContext2D> {
        Some(Arc::clone(&self.surface) as SharedContext2D)
    }

    fn bounding_rect(&self) -> BoundingRect {
        self.geometry.lock().rect
    }

    fn backing_size(&self) -> (u32, u32) {
        self.geometry.lock().backing
    }

    fn set_backing_size(&self, width: u32, height: u32) {
        self.geometry.lock().backing = (width, height);
    }

    fn parent_content_box(&self) -> Option<(u32, u32)> {
        self.geometry.lock().parent
    }
}

//! Host input events.

/// An ephemeral host event, consumed at dispatch and never stored.
///
/// Pointer coordinates are client-space positions as the host reports them;
/// the forwarder translates them into target-relative offsets before they
/// reach the guest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MouseDown { x: f64, y: f64 },
    MouseUp { x: f64, y: f64 },
    MouseMove { x: f64, y: f64 },
    Resize { width: f64, height: f64 },
    PixelRatioChanged { ratio: f64 },
    FrameTick { delta_seconds: f64 },
}

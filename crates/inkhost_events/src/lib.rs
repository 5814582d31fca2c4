//! # inkhost_events
//!
//! Host-side event plumbing for the inkhost playground:
//! - [`InputEvent`]: the ephemeral host events delivered to the guest
//! - [`FrameClock`]: the continuous tick loop driving `Input.CallUpdate`
//! - [`PixelRatioWatcher`]: threshold-based pixel ratio change detection
//! - [`EventForwarder`]: maps pointer/resize/ratio events onto the bus
//!
//! Events of the same kind keep arrival order; there is no ordering contract
//! across kinds. Nothing here buffers: an event with no registered bus slot
//! is dropped at dispatch.

mod clock;
mod event;
mod forwarder;
mod ratio;

pub use clock::{FrameClock, FrameScheduler, IntervalScheduler};
pub use event::InputEvent;
pub use forwarder::{EventForwarder, PointerPosition};
pub use ratio::{PixelRatioWatcher, RatioSource};

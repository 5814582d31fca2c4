//! The frame clock.
//!
//! One continuous tick loop per module handle, running for the lifetime of
//! the host. Each tick measures elapsed wall time against a monotonic
//! instant and emits the delta through the bus; there is no frame rate
//! guarantee and the delta is never clamped.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::{Interval, MissedTickBehavior, interval};

use inkhost_guest::EventBus;

/// The display-synchronized wait primitive the clock loops over.
///
/// The host decides what a "frame" is; the clock only awaits the next one.
pub trait FrameScheduler: Send {
    fn next_frame(&mut self) -> impl Future<Output = ()> + Send;
}

/// Fixed-period scheduler backed by a tokio interval.
pub struct IntervalScheduler {
    interval: Interval,
}

impl IntervalScheduler {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl FrameScheduler for IntervalScheduler {
    async fn next_frame(&mut self) {
        self.interval.tick().await;
    }
}

/// Measures per-frame deltas from a monotonic instant.
pub struct FrameClock {
    last_tick: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last_tick: Instant::now() }
    }

    /// Seconds elapsed since the previous tick. Never negative, unclamped.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;
        delta
    }

    /// Drives the bus forever: wait for the next frame, emit the delta,
    /// reschedule.
    pub async fn run(mut self, mut scheduler: impl FrameScheduler, bus: &EventBus) {
        loop {
            scheduler.next_frame().await;
            bus.emit_update(self.tick());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn delta_is_nonnegative() {
        let mut clock = FrameClock::new();
        assert!(clock.tick() >= 0.0);
        assert!(clock.tick() >= 0.0);
    }

    #[test]
    fn delta_reflects_elapsed_time() {
        let mut clock = FrameClock::new();
        clock.tick();
        std::thread::sleep(Duration::from_millis(5));
        assert!(clock.tick() >= 0.005);
    }

    #[tokio::test(start_paused = true)]
    async fn run_emits_ticks_through_the_bus() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        bus.set_update(move |delta| {
            assert!(delta >= 0.0);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let clock = FrameClock::new();
        let scheduler = IntervalScheduler::new(Duration::from_millis(16));
        let _ = tokio::time::timeout(
            Duration::from_millis(100),
            clock.run(scheduler, &bus),
        )
        .await;

        assert!(hits.load(Ordering::SeqCst) >= 2);
    }
}

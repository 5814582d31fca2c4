//! Pixel ratio change detection.
//!
//! The host offers no continuous ratio-change event, only a one-shot
//! threshold listener that fires when the ratio stops matching an armed
//! value. The watcher keeps exactly one listener armed at all times, always
//! at the last known ratio, and rearms before notifying.

use parking_lot::Mutex;
use tracing::debug;

/// The host's threshold-match primitive.
///
/// `arm(ratio)` registers a one-shot listener that fires when the current
/// ratio stops matching `ratio`; `disarm` removes it.
pub trait RatioSource: Send + Sync {
    fn current_ratio(&self) -> f64;
    fn arm(&self, ratio: f64);
    fn disarm(&self);
}

/// Keeps a single threshold listener armed at the last known pixel ratio.
pub struct PixelRatioWatcher<S: RatioSource> {
    source: S,
    armed_ratio: Mutex<f64>,
    on_change: Box<dyn Fn(f64) + Send + Sync>,
}

impl<S: RatioSource> PixelRatioWatcher<S> {
    /// Arms the source at its current ratio.
    pub fn new(source: S, on_change: impl Fn(f64) + Send + Sync + 'static) -> Self {
        let ratio = source.current_ratio();
        source.arm(ratio);
        Self {
            source,
            armed_ratio: Mutex::new(ratio),
            on_change: Box::new(on_change),
        }
    }

    /// The ratio the listener is currently armed at.
    pub fn armed_ratio(&self) -> f64 {
        *self.armed_ratio.lock()
    }

    /// Host notification that the armed threshold stopped matching.
    ///
    /// Reads the ratio back first: a spurious fire that still matches the
    /// armed value is a no-op. Otherwise deregisters and rearms at the new
    /// ratio as one step under the lock, then notifies once.
    pub fn on_threshold_fired(&self) {
        let mut armed = self.armed_ratio.lock();
        let ratio = self.source.current_ratio();
        #[allow(clippy::float_cmp)]
        if ratio == *armed {
            debug!("Pixel ratio threshold fired without a ratio change; ignoring");
            return;
        }

        self.source.disarm();
        self.source.arm(ratio);
        *armed = ratio;
        drop(armed);

        debug!(ratio, "Pixel ratio changed");
        (self.on_change)(ratio);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    /// Fake source that records every arm/disarm and tracks how many
    /// listeners are live.
    struct FakeSource {
        ratio: Mutex<f64>,
        log: Mutex<Vec<String>>,
        armed: AtomicUsize,
    }

    impl FakeSource {
        fn new(ratio: f64) -> Arc<Self> {
            Arc::new(Self {
                ratio: Mutex::new(ratio),
                log: Mutex::new(Vec::new()),
                armed: AtomicUsize::new(0),
            })
        }

        fn set_ratio(&self, ratio: f64) {
            *self.ratio.lock() = ratio;
        }

        fn armed_listeners(&self) -> usize {
            self.armed.load(Ordering::SeqCst)
        }
    }

    impl RatioSource for Arc<FakeSource> {
        fn current_ratio(&self) -> f64 {
            *self.ratio.lock()
        }

        fn arm(&self, ratio: f64) {
            self.log.lock().push(format!("arm({})", ratio));
            self.armed.fetch_add(1, Ordering::SeqCst);
        }

        fn disarm(&self) {
            self.log.lock().push("disarm".to_string());
            self.armed.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn arms_at_the_initial_ratio() {
        let source = FakeSource::new(1.0);
        let watcher = PixelRatioWatcher::new(Arc::clone(&source), |_| {});

        assert_eq!(watcher.armed_ratio(), 1.0);
        assert_eq!(source.armed_listeners(), 1);
        assert_eq!(source.log.lock().as_slice(), &["arm(1)".to_string()]);
    }

    #[test]
    fn spurious_fire_is_a_noop() {
        let source = FakeSource::new(2.0);
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&changes);
        let watcher = PixelRatioWatcher::new(Arc::clone(&source), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        watcher.on_threshold_fired();

        assert_eq!(changes.load(Ordering::SeqCst), 0);
        assert_eq!(watcher.armed_ratio(), 2.0);
        assert_eq!(source.armed_listeners(), 1);
    }

    #[test]
    fn rearms_then_notifies_on_a_real_change() {
        let source = FakeSource::new(1.0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let watcher = PixelRatioWatcher::new(Arc::clone(&source), move |ratio| {
            sink.lock().push(ratio);
        });

        source.set_ratio(2.0);
        watcher.on_threshold_fired();

        assert_eq!(watcher.armed_ratio(), 2.0);
        assert_eq!(seen.lock().as_slice(), &[2.0]);
        assert_eq!(
            source.log.lock().as_slice(),
            &["arm(1)".to_string(), "disarm".to_string(), "arm(2)".to_string()]
        );
    }

    #[test]
    fn exactly_one_listener_stays_armed_across_changes() {
        let source = FakeSource::new(1.0);
        let watcher = PixelRatioWatcher::new(Arc::clone(&source), |_| {});

        for ratio in [1.5, 2.0, 1.0, 3.0] {
            source.set_ratio(ratio);
            watcher.on_threshold_fired();
            assert_eq!(source.armed_listeners(), 1);
            assert_eq!(watcher.armed_ratio(), ratio);
        }
    }
}

//! Download progress tracking.

use parking_lot::Mutex;
use tracing::debug;

type ProgressHook = Box<dyn Fn(usize, usize) + Send + Sync>;

struct ProgressState {
    observed: usize,
    total: Option<usize>,
}

/// Monotonic `{loaded, total}` counter for the bootstrap progress hook.
///
/// The total is fixed the first time it is known and never shrinks or grows
/// afterwards. More fetches may be observed than the denominator counts
/// (the denominator deliberately excludes some categories), so the reported
/// `loaded` is clamped to never exceed `total`.
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
    hook: Option<ProgressHook>,
}

impl ProgressTracker {
    pub fn new(hook: Option<ProgressHook>) -> Self {
        Self {
            state: Mutex::new(ProgressState { observed: 0, total: None }),
            hook,
        }
    }

    /// Fixes the denominator. Later calls are ignored.
    pub fn set_total(&self, total: usize) {
        let mut state = self.state.lock();
        if state.total.is_some() {
            debug!(total, "Progress total already fixed; ignoring");
            return;
        }
        state.total = Some(total);
    }

    /// Records one completed fetch and fires the hook with the clamped
    /// `(loaded, total)` pair.
    pub fn advance(&self) {
        let (loaded, total) = {
            let mut state = self.state.lock();
            state.observed += 1;
            let total = state.total.unwrap_or(state.observed);
            (state.observed.min(total), total)
        };
        debug!(loaded, total, "Resource loaded");
        if let Some(hook) = &self.hook {
            hook(loaded, total);
        }
    }

    /// The clamped `(loaded, total)` pair as last reported.
    pub fn snapshot(&self) -> (usize, usize) {
        let state = self.state.lock();
        let total = state.total.unwrap_or(state.observed);
        (state.observed.min(total), total)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;

    fn recording_tracker() -> (ProgressTracker, Arc<Mutex<Vec<(usize, usize)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let tracker = ProgressTracker::new(Some(Box::new(move |loaded, total| {
            sink.lock().push((loaded, total));
        })));
        (tracker, seen)
    }

    #[test]
    fn reports_monotonic_progress() {
        let (tracker, seen) = recording_tracker();
        tracker.set_total(3);

        tracker.advance();
        tracker.advance();
        tracker.advance();

        assert_eq!(seen.lock().as_slice(), &[(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn loaded_never_exceeds_total() {
        let (tracker, seen) = recording_tracker();
        tracker.set_total(2);

        for _ in 0..4 {
            tracker.advance();
        }

        assert_eq!(seen.lock().as_slice(), &[(1, 2), (2, 2), (2, 2), (2, 2)]);
        assert_eq!(tracker.snapshot(), (2, 2));
    }

    #[test]
    fn total_is_fixed_once_known() {
        let (tracker, seen) = recording_tracker();
        tracker.set_total(5);
        tracker.set_total(10);

        tracker.advance();
        assert_eq!(seen.lock().as_slice(), &[(1, 5)]);
    }

    #[test]
    fn works_without_a_hook() {
        let tracker = ProgressTracker::new(None);
        tracker.set_total(1);
        tracker.advance();
        assert_eq!(tracker.snapshot(), (1, 1));
    }
}

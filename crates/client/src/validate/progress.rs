//! Run progress counters and the reporting callback.

use std::sync::{Arc, Mutex};

use serde::Serialize;

/// Snapshot of a validation run.
///
/// `checked` counts every URL with a final result, cache hits included, so it
/// reaches `total` when the run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub total: usize,
    pub checked: usize,
    pub success: usize,
    pub failed: usize,
    pub in_progress: usize,
}

impl Progress {
    pub fn is_done(&self) -> bool {
        self.checked >= self.total && self.in_progress == 0
    }
}

/// Callback invoked after every progress transition.
pub type ProgressFn = Arc<dyn Fn(Progress) + Send + Sync>;

/// Shared counters for one run.
///
/// Transitions happen under a lock so every emitted snapshot is consistent;
/// the callback itself runs after the lock is released.
pub(crate) struct ProgressTracker {
    state: Mutex<Progress>,
    callback: Option<ProgressFn>,
}

impl ProgressTracker {
    pub(crate) fn new(total: usize, callback: Option<ProgressFn>) -> Self {
        Self { state: Mutex::new(Progress { total, ..Default::default() }), callback }
    }

    /// Count `n` URLs answered from the cache.
    pub(crate) fn cached(&self, n: usize) {
        self.update(|p| {
            p.checked += n;
            p.success += n;
        });
    }

    pub(crate) fn started(&self) {
        self.update(|p| p.in_progress += 1);
    }

    pub(crate) fn finished(&self, ok: bool) {
        self.update(|p| {
            p.in_progress = p.in_progress.saturating_sub(1);
            p.checked += 1;
            if ok {
                p.success += 1;
            } else {
                p.failed += 1;
            }
        });
    }

    /// Count a check that never reported back (its task was lost).
    pub(crate) fn lost(&self) {
        self.finished(false);
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Progress {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update(&self, change: impl FnOnce(&mut Progress)) {
        let snapshot = {
            let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            change(&mut state);
            *state
        };
        if let Some(callback) = &self.callback {
            callback(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> (ProgressTracker, Arc<Mutex<Vec<Progress>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let tracker = ProgressTracker::new(3, Some(Arc::new(move |p| sink.lock().unwrap().push(p))));
        (tracker, seen)
    }

    #[test]
    fn test_transitions_are_reported() {
        let (tracker, seen) = recording();
        tracker.cached(1);
        tracker.started();
        tracker.started();
        tracker.finished(true);
        tracker.finished(false);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[2].in_progress, 2);
        assert_eq!(*seen.last().unwrap(), Progress { total: 3, checked: 3, success: 2, failed: 1, in_progress: 0 });
        assert!(seen.last().unwrap().is_done());
    }

    #[test]
    fn test_lost_task_counts_as_failure() {
        let tracker = ProgressTracker::new(1, None);
        tracker.started();
        tracker.lost();
        let p = tracker.snapshot();
        assert_eq!((p.checked, p.failed, p.in_progress), (1, 1, 0));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(Progress { total: 2, in_progress: 1, ..Default::default() }).unwrap();
        assert_eq!(json["inProgress"], 1);
        assert_eq!(json["total"], 2);
    }
}

//! Resource monitoring and leak detection
//!
//! Every counted resource created through [`RefCounted::new_tracked`] registers
//! here on creation and deregisters when its release action runs, so a test or
//! a host can ask which resources are still alive after a lifecycle settles.
//!
//! [`RefCounted::new_tracked`]: crate::refcount::RefCounted::new_tracked

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::types::ResourceId;

/// Tracks live counted resources by kind.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    inner: Mutex<TrackerState>,
}

#[derive(Debug, Default)]
struct TrackerState {
    active: HashMap<ResourceId, ResourceInfo>,
    created: HashMap<&'static str, usize>,
    released: HashMap<&'static str, usize>,
}

#[derive(Debug, Clone)]
struct ResourceInfo {
    kind: &'static str,
    acquired_at: DateTime<Utc>,
}

impl ResourceTracker {
    /// Create a new tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource acquisition
    pub fn register_acquisition(&self, id: ResourceId, kind: &'static str) {
        let mut state = self.inner.lock();
        state.active.insert(
            id,
            ResourceInfo {
                kind,
                acquired_at: Utc::now(),
            },
        );
        *state.created.entry(kind).or_insert(0) += 1;
    }

    /// Register a resource release
    pub fn register_release(&self, id: ResourceId) {
        let mut state = self.inner.lock();
        if let Some(info) = state.active.remove(&id) {
            *state.released.entry(info.kind).or_insert(0) += 1;
        } else {
            tracing::warn!(%id, "release registered for an untracked resource");
        }
    }

    /// Snapshot of current and historical counts.
    pub fn stats(&self) -> ResourceStats {
        let state = self.inner.lock();
        let mut live = HashMap::new();
        let mut oldest = None;
        for info in state.active.values() {
            *live.entry(info.kind).or_insert(0) += 1;
            oldest = match oldest {
                Some(current) if current <= info.acquired_at => Some(current),
                _ => Some(info.acquired_at),
            };
        }
        ResourceStats {
            live,
            created: state.created.clone(),
            released: state.released.clone(),
            oldest_acquired_at: oldest,
        }
    }

    /// Identifiers of resources alive for longer than `threshold`.
    pub fn find_potential_leaks(&self, threshold: Duration) -> Vec<ResourceId> {
        let now = Utc::now();
        self.inner
            .lock()
            .active
            .iter()
            .filter(|(_, info)| now - info.acquired_at > threshold)
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Statistics about counted resources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceStats {
    live: HashMap<&'static str, usize>,
    created: HashMap<&'static str, usize>,
    released: HashMap<&'static str, usize>,
    /// Acquisition time of the oldest live resource.
    pub oldest_acquired_at: Option<DateTime<Utc>>,
}

impl ResourceStats {
    /// Total live resources of every kind.
    pub fn total_live(&self) -> usize {
        self.live.values().sum()
    }

    /// Live resources of one kind.
    pub fn live_of(&self, kind: &str) -> usize {
        self.live.get(kind).copied().unwrap_or(0)
    }

    /// Resources of one kind created since the tracker started.
    pub fn created_of(&self, kind: &str) -> usize {
        self.created.get(kind).copied().unwrap_or(0)
    }

    /// Resources of one kind released since the tracker started.
    pub fn released_of(&self, kind: &str) -> usize {
        self.released.get(kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquisition_and_release_balance() {
        let tracker = ResourceTracker::new();
        let a = ResourceId::new();
        let b = ResourceId::new();
        tracker.register_acquisition(a, "camera");
        tracker.register_acquisition(b, "camera");
        tracker.register_release(a);

        let stats = tracker.stats();
        assert_eq!(stats.live_of("camera"), 1);
        assert_eq!(stats.created_of("camera"), 2);
        assert_eq!(stats.released_of("camera"), 1);
        assert_eq!(stats.total_live(), 1);
        assert!(stats.oldest_acquired_at.is_some());
    }

    #[test]
    fn unknown_release_leaves_counts_untouched() {
        let tracker = ResourceTracker::new();
        tracker.register_release(ResourceId::new());
        assert_eq!(tracker.stats(), ResourceStats::default());
    }

    #[test]
    fn fresh_resources_are_not_reported_as_leaks() {
        let tracker = ResourceTracker::new();
        tracker.register_acquisition(ResourceId::new(), "surface");
        assert!(tracker.find_potential_leaks(Duration::hours(1)).is_empty());
        assert_eq!(tracker.find_potential_leaks(Duration::milliseconds(-1)).len(), 1);
    }
}

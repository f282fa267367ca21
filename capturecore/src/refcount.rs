//! Shared ownership with explicit reference counting and close-on-zero.
//!
//! A [`RefCounted`] value *is* one count: creating one starts the count at 1,
//! [`RefCounted::add_ref`] hands out another guard and increments, and closing or
//! dropping a guard decrements. When the count reaches zero the release action
//! runs exactly once, synchronously, on the thread that dropped the last guard.
//!
//! Because the resource is only reachable through a live guard, using a
//! resource after its last reference was released does not compile. The runtime
//! assertions that remain guard against counting bugs inside this module and
//! fail fast rather than corrupt state.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::resource::tracker::ResourceTracker;
use crate::types::ResourceId;

type ReleaseAction<R> = Box<dyn FnOnce(&R) + Send>;

struct Shared<R> {
    id: ResourceId,
    kind: &'static str,
    count: AtomicUsize,
    resource: R,
    release: Mutex<Option<ReleaseAction<R>>>,
    tracker: Option<Arc<ResourceTracker>>,
}

/// One counted reference to a shared resource.
pub struct RefCounted<R> {
    shared: Arc<Shared<R>>,
}

impl<R> RefCounted<R> {
    /// Wraps a freshly created resource with a count of 1.
    ///
    /// `release` runs once, when the last reference is released.
    pub fn new<F>(kind: &'static str, resource: R, release: F) -> Self
    where
        F: FnOnce(&R) + Send + 'static,
    {
        Self::build(kind, resource, Box::new(release), None)
    }

    /// Like [`RefCounted::new`], additionally registering the resource with a
    /// tracker until it is released.
    pub fn new_tracked<F>(
        kind: &'static str,
        resource: R,
        tracker: &Arc<ResourceTracker>,
        release: F,
    ) -> Self
    where
        F: FnOnce(&R) + Send + 'static,
    {
        Self::build(kind, resource, Box::new(release), Some(Arc::clone(tracker)))
    }

    fn build(
        kind: &'static str,
        resource: R,
        release: ReleaseAction<R>,
        tracker: Option<Arc<ResourceTracker>>,
    ) -> Self {
        let id = ResourceId::new();
        if let Some(tracker) = &tracker {
            tracker.register_acquisition(id, kind);
        }
        tracing::debug!(kind, %id, "counted resource created");
        Self {
            shared: Arc::new(Shared {
                id,
                kind,
                count: AtomicUsize::new(1),
                resource,
                release: Mutex::new(Some(release)),
                tracker,
            }),
        }
    }

    /// Adds a reference, returning the guard that owns it.
    ///
    /// # Panics
    ///
    /// Panics if the count was already zero.
    #[must_use = "dropping the returned reference releases it immediately"]
    pub fn add_ref(&self) -> Self {
        let previous = self.shared.count.fetch_add(1, Ordering::AcqRel);
        assert!(
            previous > 0,
            "add_ref on fully released {} resource {}",
            self.shared.kind,
            self.shared.id
        );
        tracing::debug!(
            kind = self.shared.kind,
            id = %self.shared.id,
            count = previous + 1,
            "reference added"
        );
        Self {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Releases this reference.
    ///
    /// Equivalent to dropping the guard; spelled out where the release point
    /// matters.
    pub fn close(self) {
        drop(self);
    }

    /// The underlying resource.
    pub fn get(&self) -> &R {
        debug_assert!(self.shared.count.load(Ordering::Acquire) > 0);
        &self.shared.resource
    }

    /// Current number of live references.
    pub fn ref_count(&self) -> usize {
        self.shared.count.load(Ordering::Acquire)
    }

    /// Tracking identifier of the resource.
    pub fn id(&self) -> ResourceId {
        self.shared.id
    }

    /// Kind label the resource was created with.
    pub fn kind(&self) -> &'static str {
        self.shared.kind
    }

    /// True when both guards refer to the same underlying resource.
    pub fn same_resource(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// A non-owning observer of this resource's count.
    pub fn probe(&self) -> RefProbe<R> {
        RefProbe {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R> Drop for RefCounted<R> {
    fn drop(&mut self) {
        let previous = self.shared.count.fetch_sub(1, Ordering::AcqRel);
        assert!(
            previous > 0,
            "release of already released {} resource {}",
            self.shared.kind,
            self.shared.id
        );
        if previous > 1 {
            tracing::debug!(
                kind = self.shared.kind,
                id = %self.shared.id,
                count = previous - 1,
                "reference released"
            );
            return;
        }

        let action = self.shared.release.lock().take();
        match action {
            Some(action) => action(&self.shared.resource),
            None => panic!(
                "release action of {} resource {} ran twice",
                self.shared.kind, self.shared.id
            ),
        }
        if let Some(tracker) = &self.shared.tracker {
            tracker.register_release(self.shared.id);
        }
        tracing::debug!(kind = self.shared.kind, id = %self.shared.id, "counted resource closed");
    }
}

impl<R> fmt::Debug for RefCounted<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefCounted")
            .field("kind", &self.shared.kind)
            .field("id", &self.shared.id)
            .field("count", &self.ref_count())
            .finish()
    }
}

/// Observes a counted resource without holding a reference to it.
///
/// A probe keeps the bookkeeping alive so tests and diagnostics can read the
/// count after every guard is gone, but it never grants access to the resource.
pub struct RefProbe<R> {
    shared: Arc<Shared<R>>,
}

impl<R> RefProbe<R> {
    /// Current number of live references.
    pub fn ref_count(&self) -> usize {
        self.shared.count.load(Ordering::Acquire)
    }

    /// True once the release action has run.
    pub fn is_released(&self) -> bool {
        self.ref_count() == 0 && self.shared.release.lock().is_none()
    }

    /// Tracking identifier of the observed resource.
    pub fn id(&self) -> ResourceId {
        self.shared.id
    }
}

impl<R> Clone for RefProbe<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R> fmt::Debug for RefProbe<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefProbe")
            .field("kind", &self.shared.kind)
            .field("id", &self.shared.id)
            .field("count", &self.ref_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::AtomicUsize;

    fn counted(closes: &Arc<AtomicUsize>) -> RefCounted<&'static str> {
        let closes = Arc::clone(closes);
        RefCounted::new("test", "resource", move |_| {
            closes.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn new_reference_starts_at_one() {
        let closes = Arc::new(AtomicUsize::new(0));
        let handle = counted(&closes);
        assert_eq!(handle.ref_count(), 1);
        assert_eq!(*handle.get(), "resource");
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn release_action_runs_once_when_last_reference_closes() {
        let closes = Arc::new(AtomicUsize::new(0));
        let first = counted(&closes);
        let second = first.add_ref();
        let probe = first.probe();
        assert_eq!(probe.ref_count(), 2);

        first.close();
        assert_eq!(closes.load(Ordering::SeqCst), 0);
        assert!(!probe.is_released());

        second.close();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(probe.is_released());
        assert_eq!(probe.ref_count(), 0);
    }

    #[test]
    fn added_references_share_the_resource() {
        let closes = Arc::new(AtomicUsize::new(0));
        let first = counted(&closes);
        let second = first.add_ref();
        assert!(first.same_resource(&second));
        assert_eq!(first.id(), second.id());

        let other = counted(&closes);
        assert!(!first.same_resource(&other));
    }

    #[test]
    fn tracked_resources_are_registered_until_released() {
        let tracker = Arc::new(ResourceTracker::new());
        let handle = RefCounted::new_tracked("surface", 7u32, &tracker, |_| {});
        let extra = handle.add_ref();
        assert_eq!(tracker.stats().live_of("surface"), 1);

        drop(handle);
        assert_eq!(tracker.stats().live_of("surface"), 1);
        drop(extra);

        let stats = tracker.stats();
        assert_eq!(stats.live_of("surface"), 0);
        assert_eq!(stats.created_of("surface"), 1);
        assert_eq!(stats.released_of("surface"), 1);
    }

    #[test]
    #[should_panic(expected = "add_ref on fully released")]
    fn add_ref_on_released_resource_fails_fast() {
        let handle = RefCounted::new("test", (), |()| {});
        // Force the count to zero without running the guard's drop, to model a
        // counting bug elsewhere.
        handle.shared.count.store(0, Ordering::SeqCst);
        let _revived = handle.add_ref();
    }

    proptest! {
        #[test]
        fn any_release_order_closes_exactly_once(
            extra in 0usize..16,
            order in proptest::collection::vec(any::<prop::sample::Index>(), 0..16),
        ) {
            let closes = Arc::new(AtomicUsize::new(0));
            let first = counted(&closes);
            let probe = first.probe();
            let mut handles: Vec<_> = (0..extra).map(|_| first.add_ref()).collect();
            handles.push(first);
            prop_assert_eq!(probe.ref_count(), extra + 1);

            for index in order {
                if handles.len() <= 1 {
                    break;
                }
                let picked = index.index(handles.len());
                handles.swap_remove(picked).close();
                prop_assert_eq!(closes.load(Ordering::SeqCst), 0);
            }

            prop_assert_eq!(probe.ref_count(), handles.len());
            handles.clear();
            prop_assert_eq!(closes.load(Ordering::SeqCst), 1);
            prop_assert!(probe.is_released());
        }
    }
}

//! Leak tracking for pending latches.
//!
//! Every registered latch stays listed until it fires, so a coordination
//! point that never completes can be found by snapshotting the registry.
//! Registries are plain instances: tests create their own with
//! [`LatchRegistry::new`], while [`AsyncLatch::new`](crate::AsyncLatch::new)
//! consults a process-wide default that only tracks while the global debug
//! toggle is on. Tracking is purely observational and has no effect on latch
//! semantics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use crate::latch::AsyncLatch;

pub(crate) type WeakRegistry = Weak<Mutex<RegistryInner>>;

pub(crate) struct RegistryInner {
    /// Next debug id to hand out. Ids increase monotonically per registry.
    next_id: u64,
    /// Registered latches that have not fired yet.
    active: Vec<(u64, AsyncLatch)>,
}

/// A registry of constructed-but-not-yet-fired latches.
///
/// Latches are added when they are registered (at construction) and removed
/// the moment they fire. The registry holds strong handles, so a leaked
/// latch remains inspectable through [`list_unfired`](Self::list_unfired)
/// for as long as the registry lives; each latch keeps only a weak
/// back-reference for deregistration.
///
/// # Examples
///
/// ```
/// use async_latch::{AsyncLatch, LatchRegistry};
///
/// # fn main() -> async_latch::Result<()> {
/// let registry = LatchRegistry::new();
/// let latch = AsyncLatch::with_registry(1, || {}, &registry);
/// assert_eq!(registry.unfired_count(), 1);
///
/// latch.release()?;
/// assert_eq!(registry.unfired_count(), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LatchRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl LatchRegistry {
    /// Creates an empty registry, independent of the global one.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                next_id: 0,
                active: Vec::new(),
            })),
        }
    }

    /// Returns a snapshot of every registered latch that has not fired yet.
    ///
    /// The returned `Vec` is an independent copy: firing a latch after the
    /// snapshot was taken does not remove it from the snapshot.
    pub fn list_unfired(&self) -> Vec<AsyncLatch> {
        self.lock()
            .active
            .iter()
            .map(|(_, latch)| latch.clone())
            .collect()
    }

    /// Number of registered latches that have not fired yet.
    pub fn unfired_count(&self) -> usize {
        self.lock().active.len()
    }

    /// Assigns a debug id to `latch` and starts tracking it.
    pub(crate) fn track(&self, latch: &AsyncLatch) {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.active.push((id, latch.clone()));
            id
        };
        latch.set_tracking(id, Arc::downgrade(&self.inner));
        tracing::debug!(id, count = latch.count(), "tracking latch");
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes a fired latch from the registry it was tracked in, if that
/// registry is still alive.
pub(crate) fn untrack(registry: &WeakRegistry, id: u64) {
    if let Some(inner) = registry.upgrade() {
        let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.active.retain(|(entry_id, _)| *entry_id != id);
        tracing::trace!(id, "latch deregistered");
    }
}

static DEBUG: AtomicBool = AtomicBool::new(false);
static GLOBAL: OnceLock<LatchRegistry> = OnceLock::new();

/// Enables or disables debug tracking of latches (default: off).
///
/// While enabled, every latch created through
/// [`AsyncLatch::new`](crate::AsyncLatch::new) or
/// [`AsyncLatch::detached`](crate::AsyncLatch::detached) is assigned a debug
/// id and registered in the process-wide registry until it fires. Latches
/// created while the toggle is off are never tracked retroactively.
///
/// # Examples
///
/// ```ignore
/// async_latch::set_debug(true);
/// let latch = async_latch::AsyncLatch::new(2, || {});
/// assert!(async_latch::list_unfired().iter().any(|l| l.debug_id() == latch.debug_id()));
/// ```
pub fn set_debug(enabled: bool) {
    DEBUG.store(enabled, Ordering::SeqCst);
    tracing::debug!(enabled, "latch debug tracking");
}

/// Returns whether debug tracking is currently enabled.
pub fn debug_enabled() -> bool {
    DEBUG.load(Ordering::SeqCst)
}

/// Snapshot of the process-wide registry's pending latches.
///
/// Only meaningful while debug tracking is (or was) enabled; with tracking
/// off no latches are added, so the snapshot stays empty.
pub fn list_unfired() -> Vec<AsyncLatch> {
    global().list_unfired()
}

pub(crate) fn global() -> &'static LatchRegistry {
    GLOBAL.get_or_init(LatchRegistry::new)
}

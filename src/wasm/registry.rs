//! Leak tracking for pending latches (single-threaded WASM variant).
//!
//! Same contract as the native registry: a registered latch stays listed
//! until it fires. The global registry and the debug toggle are
//! thread-local, which on WASM is the whole program.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::wasm::latch::AsyncLatch;

pub(crate) type WeakRegistry = Weak<RefCell<RegistryInner>>;

pub(crate) struct RegistryInner {
    next_id: u64,
    active: Vec<(u64, AsyncLatch)>,
}

/// A registry of constructed-but-not-yet-fired latches.
///
/// Latches are added when they are registered (at construction) and removed
/// the moment they fire. The registry holds strong handles, so a leaked
/// latch remains inspectable through [`list_unfired`](Self::list_unfired)
/// for as long as the registry lives; each latch keeps only a weak
/// back-reference for deregistration.
#[derive(Clone)]
pub struct LatchRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl LatchRegistry {
    /// Creates an empty registry, independent of the global one.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
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
        self.inner
            .borrow()
            .active
            .iter()
            .map(|(_, latch)| latch.clone())
            .collect()
    }

    /// Number of registered latches that have not fired yet.
    pub fn unfired_count(&self) -> usize {
        self.inner.borrow().active.len()
    }

    /// Assigns a debug id to `latch` and starts tracking it.
    pub(crate) fn track(&self, latch: &AsyncLatch) {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.active.push((id, latch.clone()));
            id
        };
        latch.set_tracking(id, Rc::downgrade(&self.inner));
        tracing::debug!(id, count = latch.count(), "tracking latch");
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
        inner
            .borrow_mut()
            .active
            .retain(|(entry_id, _)| *entry_id != id);
        tracing::trace!(id, "latch deregistered");
    }
}

thread_local! {
    static DEBUG: Cell<bool> = const { Cell::new(false) };
    static GLOBAL: LatchRegistry = LatchRegistry::new();
}

/// Enables or disables debug tracking of latches (default: off).
///
/// While enabled, every latch created through
/// [`AsyncLatch::new`](crate::AsyncLatch::new) or
/// [`AsyncLatch::detached`](crate::AsyncLatch::detached) is assigned a
/// debug id and registered in the global registry until it fires.
pub fn set_debug(enabled: bool) {
    DEBUG.with(|debug| debug.set(enabled));
    tracing::debug!(enabled, "latch debug tracking");
}

/// Returns whether debug tracking is currently enabled.
pub fn debug_enabled() -> bool {
    DEBUG.with(Cell::get)
}

/// Snapshot of the global registry's pending latches.
///
/// Only meaningful while debug tracking is (or was) enabled; with tracking
/// off no latches are added, so the snapshot stays empty.
pub fn list_unfired() -> Vec<AsyncLatch> {
    GLOBAL.with(LatchRegistry::list_unfired)
}

pub(crate) fn with_global<R>(f: impl FnOnce(&LatchRegistry) -> R) -> R {
    GLOBAL.with(|global| f(global))
}

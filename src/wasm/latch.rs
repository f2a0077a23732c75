//! Counting latch with a fire-once completion callback (single-threaded
//! WASM variant).
//!
//! Uses `Rc<RefCell<..>>` for interior mutability; the `RefCell` borrow is
//! dropped before the completion callback is invoked so the callback may
//! freely touch the latch it belongs to.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::wasm::registry::{self, LatchRegistry, WeakRegistry};

type Callback = Box<dyn FnOnce() + 'static>;

/// Shared state of a latch.
struct LatchState {
    /// Outstanding units of work. Only `acquire` increments and only
    /// `release` decrements.
    count: usize,
    /// Set on the release that drives `count` from 1 to 0; never reset.
    fired: bool,
    /// Completion callback, taken exactly once at fire time. `None` makes
    /// firing a no-op.
    on_complete: Option<Callback>,
    /// Debug id, assigned only when the latch is registered.
    debug_id: Option<u64>,
    /// Registry to deregister from at fire time.
    registry: Option<WeakRegistry>,
}

/// A counting latch that invokes a completion callback exactly once, after
/// a known number of independent, possibly asynchronous, operations have
/// all completed.
///
/// Single-threaded: `acquire`/`release` are called from callback contexts
/// dispatched by the browser event loop (timers, fetch completions, UI
/// events), never from parallel threads. The release that brings the count
/// from 1 to 0 fires the callback synchronously, before it returns.
///
/// # Examples
///
/// ```
/// use async_latch::AsyncLatch;
///
/// # fn main() -> async_latch::Result<()> {
/// let latch = AsyncLatch::new(2, || println!("both responses arrived"));
///
/// latch.release()?;
/// assert!(!latch.is_fired());
///
/// latch.release()?; // fires here, inside this call
/// assert!(latch.is_fired());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AsyncLatch {
    state: Rc<RefCell<LatchState>>,
}

impl AsyncLatch {
    /// Creates a latch that invokes `on_complete` once the count reaches
    /// zero.
    ///
    /// The callback is a fully bound closure: whatever context it needs is
    /// captured at construction time. A latch constructed with
    /// `initial_count` of 0 is pending, not fired; it fires only when a
    /// later `release` brings an acquired count back to zero.
    ///
    /// While debug tracking is on (see [`set_debug`](crate::set_debug)),
    /// the new latch is registered in the global registry.
    pub fn new(initial_count: usize, on_complete: impl FnOnce() + 'static) -> Self {
        Self::build(initial_count, Some(Box::new(on_complete)))
    }

    /// Creates a latch with no completion callback; firing is a no-op.
    pub fn detached(initial_count: usize) -> Self {
        Self::build(initial_count, None)
    }

    /// Creates a latch tracked by `registry` regardless of the global
    /// debug toggle.
    pub fn with_registry(
        initial_count: usize,
        on_complete: impl FnOnce() + 'static,
        registry: &LatchRegistry,
    ) -> Self {
        let latch = Self::from_parts(initial_count, Some(Box::new(on_complete)));
        registry.track(&latch);
        latch
    }

    fn build(initial_count: usize, on_complete: Option<Callback>) -> Self {
        let latch = Self::from_parts(initial_count, on_complete);
        if registry::debug_enabled() {
            registry::with_global(|global| global.track(&latch));
        }
        latch
    }

    fn from_parts(initial_count: usize, on_complete: Option<Callback>) -> Self {
        tracing::trace!(count = initial_count, "created latch");
        Self {
            state: Rc::new(RefCell::new(LatchState {
                count: initial_count,
                fired: false,
                on_complete,
                debug_id: None,
                registry: None,
            })),
        }
    }

    /// Registers one more outstanding unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyFired`] if the latch has fired; registering
    /// new work on a completed latch is a coordination bug, not a request
    /// to restart it.
    pub fn acquire(&self) -> Result<()> {
        let mut state = self.borrow_mut();
        if state.fired {
            return Err(Error::AlreadyFired);
        }
        state.count += 1;
        let id = state.debug_id;
        let count = state.count;
        drop(state);
        tracing::trace!(?id, count, "acquired latch");
        Ok(())
    }

    /// Marks one outstanding unit of work as complete.
    ///
    /// The release that brings the count from 1 to 0 marks the latch fired,
    /// removes it from its registry and invokes the completion callback:
    /// synchronously, after the count mutation and before this call
    /// returns. The borrow is dropped before the callback runs, so the
    /// callback may inspect the latch it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underflow`] if the count is already 0: more
    /// completions were signaled than units acquired, which always
    /// indicates a caller bug and is never clamped away. Returns
    /// [`Error::DoubleFire`] if the decrement would fire a latch that has
    /// already fired.
    pub fn release(&self) -> Result<()> {
        let mut state = self.borrow_mut();
        if state.count == 0 {
            return Err(Error::Underflow);
        }
        state.count -= 1;

        if state.count > 0 {
            let id = state.debug_id;
            let count = state.count;
            drop(state);
            tracing::trace!(?id, count, "released latch");
            return Ok(());
        }

        if state.fired {
            return Err(Error::DoubleFire);
        }
        state.fired = true;
        let on_complete = state.on_complete.take();
        let id = state.debug_id;
        let tracked_in = state.registry.take();
        drop(state);

        if let (Some(id), Some(tracked_in)) = (id, &tracked_in) {
            registry::untrack(tracked_in, id);
        }
        tracing::debug!(?id, "latch fired");
        if let Some(on_complete) = on_complete {
            on_complete();
        }
        Ok(())
    }

    /// Current number of outstanding units of work.
    pub fn count(&self) -> usize {
        self.borrow().count
    }

    /// Whether the completion callback has been invoked.
    pub fn is_fired(&self) -> bool {
        self.borrow().fired
    }

    /// Debug id assigned at registration, if this latch is tracked.
    pub fn debug_id(&self) -> Option<u64> {
        self.borrow().debug_id
    }

    /// Returns a zero-argument closure that performs exactly one
    /// [`release`](Self::release) per invocation, with identical error
    /// semantics.
    ///
    /// Hand this to an external asynchronous API as its completion handler
    /// without exposing the latch itself.
    pub fn to_callback(&self) -> impl Fn() -> Result<()> + 'static {
        let latch = self.clone();
        move || latch.release()
    }

    pub(crate) fn set_tracking(&self, id: u64, registry: WeakRegistry) {
        let mut state = self.borrow_mut();
        state.debug_id = Some(id);
        state.registry = Some(registry);
    }

    fn borrow(&self) -> Ref<'_, LatchState> {
        self.state.borrow()
    }

    fn borrow_mut(&self) -> RefMut<'_, LatchState> {
        self.state.borrow_mut()
    }
}

impl fmt::Debug for AsyncLatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.borrow();
        f.debug_struct("AsyncLatch")
            .field("count", &state.count)
            .field("fired", &state.fired)
            .field("debug_id", &state.debug_id)
            .finish()
    }
}

//! Integration tests for async-latch on WASM platforms.
//!
//! These verify the single-threaded implementation the way a browser host
//! drives it: completion handlers handed out as plain closures, invoked
//! from event-loop callbacks.

#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use async_latch::{AsyncLatch, Error, LatchRegistry};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn fires_after_all_handlers_complete() {
    let fired = Rc::new(Cell::new(0));
    let fired_in_callback = fired.clone();
    let latch = AsyncLatch::new(3, move || {
        fired_in_callback.set(fired_in_callback.get() + 1);
    });

    // One handler per outstanding request.
    let handlers: Vec<_> = (0..3).map(|_| latch.to_callback()).collect();
    for handler in &handlers {
        handler().unwrap();
    }

    assert_eq!(fired.get(), 1);
    assert!(latch.is_fired());
    assert_eq!(latch.count(), 0);
}

#[wasm_bindgen_test]
fn late_work_is_joined_too() {
    let fired = Rc::new(Cell::new(false));
    let fired_in_callback = fired.clone();
    let latch = AsyncLatch::new(1, move || fired_in_callback.set(true));

    latch.acquire().unwrap();
    latch.release().unwrap();
    assert!(!fired.get());

    latch.release().unwrap();
    assert!(fired.get());
}

#[wasm_bindgen_test]
fn misuse_errors_are_synchronous() {
    let latch = AsyncLatch::detached(1);
    latch.release().unwrap();

    assert!(matches!(latch.release(), Err(Error::Underflow)));
    assert!(matches!(latch.acquire(), Err(Error::AlreadyFired)));
}

#[wasm_bindgen_test]
fn leaked_latch_is_diagnosable_through_registry() {
    let registry = LatchRegistry::new();
    let completed = AsyncLatch::with_registry(1, || {}, &registry);
    let leaked = AsyncLatch::with_registry(2, || {}, &registry);

    completed.release().unwrap();
    leaked.release().unwrap(); // one completion never arrives

    let pending = registry.list_unfired();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].debug_id(), leaked.debug_id());
    assert_eq!(pending[0].count(), 1);
}

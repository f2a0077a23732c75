//! Integration tests for async-latch on native platforms.
//!
//! These verify the latch as the join point for work running on a real
//! async runtime: completion handlers handed to spawned tasks, caller-side
//! timeouts around a latch that never fires, and leak diagnosis through an
//! isolated registry.

use std::sync::Once;
use std::time::Duration;

use async_latch::logging::{init_logging, LoggingConfig};
use async_latch::{AsyncLatch, Error, LatchRegistry};
use tokio::sync::oneshot;

fn init_tracing() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let config = LoggingConfig::default().with_level(tracing::Level::TRACE);
        init_logging(config).expect("logging init");
    });
}

#[tokio::test(flavor = "multi_thread")]
async fn joins_concurrent_tasks() {
    init_tracing();

    let (tx, rx) = oneshot::channel();
    let latch = AsyncLatch::new(4, move || {
        let _ = tx.send(());
    });

    for i in 0..4u64 {
        let done = latch.to_callback();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5 * i)).await;
            done().unwrap();
        });
    }

    tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("latch should fire")
        .expect("completion callback should run");

    assert!(latch.is_fired());
    assert_eq!(latch.count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn work_registered_mid_flight_is_joined() {
    init_tracing();

    let (tx, rx) = oneshot::channel();
    let latch = AsyncLatch::new(1, move || {
        let _ = tx.send(());
    });

    // A second operation appears while the first is still outstanding.
    latch.acquire().unwrap();
    for _ in 0..2 {
        let done = latch.to_callback();
        tokio::spawn(async move { done().unwrap() });
    }

    tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("latch should fire")
        .expect("completion callback should run");
    assert!(latch.is_fired());
}

#[tokio::test]
async fn starved_latch_never_fires_and_timeout_is_callers_job() {
    init_tracing();

    let (tx, rx) = oneshot::channel();
    let latch = AsyncLatch::new(2, move || {
        let _ = tx.send(());
    });

    // Only one of the two expected completions ever arrives.
    latch.release().unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(50), rx).await;
    assert!(timed_out.is_err());
    assert!(!latch.is_fired());
    assert_eq!(latch.count(), 1);
}

#[test]
fn misuse_is_reported_synchronously() {
    init_tracing();

    let latch = AsyncLatch::detached(1);
    latch.release().unwrap();

    assert!(matches!(latch.release(), Err(Error::Underflow)));
    assert!(matches!(latch.acquire(), Err(Error::AlreadyFired)));
}

#[test]
fn leaked_latch_is_diagnosable_through_registry() {
    init_tracing();

    let registry = LatchRegistry::new();
    let completed = AsyncLatch::with_registry(1, || {}, &registry);
    let leaked = AsyncLatch::with_registry(3, || {}, &registry);

    completed.release().unwrap();
    leaked.release().unwrap(); // two completions never arrive

    let pending = registry.list_unfired();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].debug_id(), leaked.debug_id());
    assert_eq!(pending[0].count(), 2);
}

#[test]
fn latches_are_independent() {
    init_tracing();

    let first = AsyncLatch::detached(1);
    let second = AsyncLatch::detached(1);

    first.release().unwrap();
    assert!(first.is_fired());
    assert!(!second.is_fired());
    assert_eq!(second.count(), 1);
}

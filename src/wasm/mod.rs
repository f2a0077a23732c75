//! WASM-specific latch implementations.
//!
//! This module provides single-threaded implementations for WebAssembly
//! that match the API surface of the native versions. Downstream code uses
//! the same types regardless of target.
//!
//! # Key differences from native:
//!
//! - All operations are single-threaded (no `Send` or `Sync` requirements)
//! - State is shared through `Rc<RefCell<..>>` instead of `Arc<Mutex<..>>`
//! - Completion callbacks do not need to be `Send`
//! - The process-wide debug registry is thread-local
//!
//! `acquire`/`release` are expected to be called from callback contexts
//! dispatched by the browser event loop; there is no preemption between the
//! decrement and the fired check, so no locking is needed.

pub mod latch;
pub mod registry;

pub use latch::AsyncLatch;
pub use registry::{debug_enabled, list_unfired, set_debug, LatchRegistry};

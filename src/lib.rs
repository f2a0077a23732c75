//! Asynchronous countdown latch for browser-style, callback-driven hosts.
//!
//! This crate provides [`AsyncLatch`]: a counting latch that invokes a
//! completion callback exactly once, after a known number of independent,
//! possibly asynchronous, operations have all completed. Callers register
//! outstanding work with [`AsyncLatch::acquire`] and signal completion with
//! [`AsyncLatch::release`]; the release that brings the count to zero runs
//! the callback synchronously before it returns. It is a single-use join
//! point, not a task scheduler or an executor.
//!
//! # Architecture
//!
//! The crate uses conditional compilation (`#[cfg]`) to provide
//! platform-specific implementations while keeping a consistent API
//! surface:
//!
//! - Native platforms: state behind `Arc<Mutex<..>>`, handles are
//!   `Send + Sync`, completion callbacks must be `Send`.
//! - WebAssembly: single-threaded state behind `Rc<RefCell<..>>`, driven
//!   by the browser's event loop, no `Send` requirements.
//!
//! # Modules
//!
//! - [`error`]: typed usage errors (`Underflow`, `DoubleFire`,
//!   `AlreadyFired`) returned by latch operations
//! - [`logging`]: opt-in `tracing` subscriber setup for embedders
//! - [`LatchRegistry`] plus [`set_debug`]/[`list_unfired`]: leak tracking
//!   of latches that were created but never fired
//!
//! # Examples
//!
//! ```
//! use async_latch::AsyncLatch;
//!
//! # fn main() -> async_latch::Result<()> {
//! // Run a callback only after three independent requests finish.
//! let latch = AsyncLatch::new(3, || println!("all responses arrived"));
//! let on_done = latch.to_callback();
//!
//! for _ in 0..3 {
//!     // Handed to each request as its completion handler.
//!     on_done()?;
//! }
//! assert!(latch.is_fired());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod logging;

#[cfg(not(target_arch = "wasm32"))]
mod latch;
#[cfg(not(target_arch = "wasm32"))]
mod registry;

// WASM-specific implementations
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use error::{Error, Result};

#[cfg(not(target_arch = "wasm32"))]
pub use latch::AsyncLatch;
#[cfg(not(target_arch = "wasm32"))]
pub use registry::{debug_enabled, list_unfired, set_debug, LatchRegistry};

#[cfg(target_arch = "wasm32")]
pub use wasm::latch::AsyncLatch;
#[cfg(target_arch = "wasm32")]
pub use wasm::registry::{debug_enabled, list_unfired, set_debug, LatchRegistry};

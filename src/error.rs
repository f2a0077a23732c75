use thiserror::Error;

/// Usage errors surfaced by latch operations.
///
/// All latch variants indicate a mismatched acquire/release count on the
/// caller's side. They are returned synchronously and are never retried or
/// absorbed by the latch itself.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot release a latch whose count is already 0")]
    Underflow,

    #[error("Latch has already fired; the completion callback cannot fire twice")]
    DoubleFire,

    #[error("Cannot acquire a latch that has already fired")]
    AlreadyFired,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the task-execution core.
//!
//! [`Error`] covers protocol violations and abnormal worker exits. These are
//! programming errors in the shutdown ordering (a write after close, a second
//! close) or faults inside a worker, and are always surfaced to the caller.
//!
//! Expected business outcomes, like a withdrawal exceeding the balance, are
//! not errors of this kind and live in [`crate::AccountError`].

use crate::pool::WorkerId;

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All protocol and lifecycle errors that `corral` can produce.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An item was written to a queue or sink after it was closed.
    #[error("write to closed {channel}")]
    Closed { channel: &'static str },

    /// `close()` was called on a queue or sink that was already closed.
    #[error("{channel} closed more than once")]
    AlreadyClosed { channel: &'static str },

    /// A pool or queue was configured with unusable values.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A worker exited abnormally (panicked task, or a write to a closed
    /// result sink).
    #[error("worker {worker} faulted: {reason}")]
    WorkerFaulted { worker: WorkerId, reason: String },

    /// A coordinating task (producer or fan-in coordinator) panicked or was
    /// aborted before it could report.
    #[error("join error: {context}")]
    Join { context: String },
}

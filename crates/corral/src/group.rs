//! An explicit task group: spawn many tasks, then join them all at once.
//!
//! [`TaskGroup::join_all`] consumes the group, so the join can only happen
//! once, and it is the only point at which the caller suspends.

use core::future::Future;
use tokio::task::{JoinError, JoinHandle};

/// A set of spawned Tokio tasks joined together.
///
/// Results are returned in spawn order, so the `n`th entry of
/// [`join_all`](Self::join_all) belongs to the `n`th spawned task.
pub struct TaskGroup<T> {
    handles: Vec<JoinHandle<T>>,
}

impl<T> Default for TaskGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskGroup<T> {
    pub const fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl<T: Send + 'static> TaskGroup<T> {
    /// Spawns `task` onto the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.handles.push(tokio::spawn(task));
    }

    /// Runs a blocking closure on Tokio's blocking thread pool as part of
    /// the group.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn_blocking<F>(&mut self, task: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.handles.push(tokio::task::spawn_blocking(task));
    }

    /// Waits until every task in the group has finished.
    ///
    /// A task that panicked or was aborted yields `Err(JoinError)` in its
    /// slot; the other slots are unaffected.
    pub async fn join_all(self) -> Vec<Result<T, JoinError>> {
        futures::future::join_all(self.handles).await
    }
}

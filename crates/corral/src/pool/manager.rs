//! Fixed-size pool of asynchronous workers draining a shared [`WorkQueue`].
//!
//! [`WorkerPool::start`] spawns one task per worker into a [`TaskGroup`] and
//! returns a [`PoolHandle`]. The handle's
//! [`await_completion`](PoolHandle::await_completion) consumes it, so each
//! started pool is awaited exactly once, and it only returns once every
//! worker task has exited.
//!
//! Workers pull from a single shared queue rather than per-worker channels,
//! so load is balanced by whoever is free next. Shutdown is cooperative via
//! a shared [`CancellationToken`].

use crate::{
    PoolConfig, PoolReport, Result, SinkWriter, TaskGroup, WorkQueue, WorkerReport,
    pool::worker::{WorkerId, worker_loop},
};
use core::{fmt::Display, future::Future};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A pool of `config.workers` concurrent workers.
///
/// The pool itself holds no queue: callers create a [`WorkQueue`], start the
/// pool on it, then feed and close the queue. A single pool may be started
/// several times; every start shares the same shutdown token.
#[derive(Debug)]
pub struct WorkerPool {
    config: PoolConfig,
    shutdown_token: CancellationToken,
}

impl WorkerPool {
    /// Creates a pool from a validated [`PoolConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) if the
    /// config does not validate.
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            shutdown_token: CancellationToken::new(),
        })
    }

    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns a clone of the token that stops every worker of this pool.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Asks every worker to stop before its next pull.
    ///
    /// Items already being processed run to completion. Items left in the
    /// queue are not processed.
    pub fn cancel(&self) {
        #[cfg(feature = "tracing")]
        tracing::info!("Cancelling worker pool");
        self.shutdown_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Spawns the workers on `queue`, each running `task` per item until
    /// end-of-stream. Task outputs are discarded.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn start<T, R, E, F, Fut>(&self, queue: &WorkQueue<T>, task: F) -> PoolHandle
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Display + Send + 'static,
        F: Fn(WorkerId, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        self.spawn_workers(queue, None, task)
    }

    pub(crate) fn spawn_workers<T, R, E, F, Fut>(
        &self,
        queue: &WorkQueue<T>,
        output: Option<SinkWriter<R>>,
        task: F,
    ) -> PoolHandle
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Display + Send + 'static,
        F: Fn(WorkerId, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        #[cfg(feature = "tracing")]
        tracing::debug!("Starting {} workers", self.config.workers);

        let task = Arc::new(task);
        let mut group = TaskGroup::with_capacity(self.config.workers);

        for worker in 1..=self.config.workers {
            group.spawn(worker_loop(
                worker,
                queue.clone(),
                output.clone(),
                Arc::clone(&task),
                self.shutdown_token.clone(),
            ));
        }

        PoolHandle { group }
    }
}

/// Handle to a started pool. Await it with
/// [`await_completion`](Self::await_completion).
#[must_use = "a started pool should be awaited with `await_completion`"]
pub struct PoolHandle {
    group: TaskGroup<WorkerReport>,
}

impl PoolHandle {
    pub fn workers(&self) -> usize {
        self.group.len()
    }

    /// Waits until every worker has exited and reports how each one ended.
    ///
    /// A worker task that died outside its own panic guard (for example, an
    /// aborted runtime) is reported as faulted.
    pub async fn await_completion(self) -> PoolReport {
        let joined = self.group.join_all().await;

        let workers = joined
            .into_iter()
            .enumerate()
            .map(|(idx, outcome)| match outcome {
                Ok(report) => report,
                Err(e) => WorkerReport::faulted(idx + 1, e.to_string()),
            })
            .collect();

        let report = PoolReport::new(workers);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Worker pool completed ({} processed, {} failed, clean: {})",
            report.processed(),
            report.failed(),
            report.is_clean()
        );

        report
    }
}

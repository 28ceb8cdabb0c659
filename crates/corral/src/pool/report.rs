use crate::{Error, Result, pool::WorkerId};

/// How a worker left its loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerExit {
    /// The work queue reached end-of-stream.
    Clean,
    /// The pool's shutdown token fired between two item pulls.
    Cancelled,
    /// The worker stopped abnormally: its task panicked, or it could not
    /// hand a result to the sink.
    Faulted { reason: String },
}

/// Per-worker outcome returned by
/// [`PoolHandle::await_completion`](crate::PoolHandle::await_completion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: WorkerId,
    /// Items whose task returned `Ok`.
    pub processed: usize,
    /// Items whose task returned `Err`. The worker kept going after each.
    pub failed: usize,
    pub exit: WorkerExit,
}

impl WorkerReport {
    pub(crate) const fn new(worker: WorkerId) -> Self {
        Self {
            worker,
            processed: 0,
            failed: 0,
            exit: WorkerExit::Clean,
        }
    }

    pub(crate) fn faulted(worker: WorkerId, reason: String) -> Self {
        Self {
            exit: WorkerExit::Faulted { reason },
            ..Self::new(worker)
        }
    }
}

/// The completion signal of a pool: one [`WorkerReport`] per worker, ordered
/// by worker id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
    workers: Vec<WorkerReport>,
}

impl PoolReport {
    pub(crate) const fn new(workers: Vec<WorkerReport>) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> &[WorkerReport] {
        &self.workers
    }

    /// Total items processed successfully across all workers.
    pub fn processed(&self) -> usize {
        self.workers.iter().map(|w| w.processed).sum()
    }

    /// Total items whose task failed across all workers.
    pub fn failed(&self) -> usize {
        self.workers.iter().map(|w| w.failed).sum()
    }

    /// `true` if every worker reached end-of-stream.
    pub fn is_clean(&self) -> bool {
        self.workers.iter().all(|w| w.exit == WorkerExit::Clean)
    }

    pub fn is_cancelled(&self) -> bool {
        self.workers.iter().any(|w| w.exit == WorkerExit::Cancelled)
    }

    pub fn faulted(&self) -> impl Iterator<Item = &WorkerReport> {
        self.workers
            .iter()
            .filter(|w| matches!(w.exit, WorkerExit::Faulted { .. }))
    }

    /// Converts the first faulted worker, if any, into an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerFaulted`] for the lowest-numbered faulted
    /// worker.
    pub fn into_result(self) -> Result<Self> {
        let fault = self.workers.iter().find_map(|w| match &w.exit {
            WorkerExit::Faulted { reason } => Some((w.worker, reason.clone())),
            _ => None,
        });

        match fault {
            Some((worker, reason)) => Err(Error::WorkerFaulted { worker, reason }),
            None => Ok(self),
        }
    }
}

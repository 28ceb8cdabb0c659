//! One-call construction and execution of a pool over numbered jobs.
//!
//! [`JobRunner`] wires producer, pool and (optionally) consumer together:
//!
//! ```text
//! producer --push 1..=jobs--> WorkQueue --pop--> workers --send--> ResultSink --> consumer
//!    |                                              |                   ^
//!    +-- close() after the last job                 +-- all exited -----+ close()
//! ```
//!
//! Both [`JobRunner::run`] and [`JobRunner::run_collect`] return only after
//! every job has been drained and, for the fan-in variant, every result
//! consumed.

use crate::{Error, PoolConfig, PoolReport, Result, WorkQueue, WorkerId, WorkerPool};
use core::{fmt::Display, future::Future};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Runs a task over the job ids `1..=jobs` on a fixed pool of workers.
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> corral::Result<()> {
/// use corral::JobRunner;
///
/// let runner = JobRunner::new(3, 10)?;
/// let (mut doubled, report) = runner
///     .run_collect(|_worker, job| async move { Ok::<_, core::convert::Infallible>(job * 2) })
///     .await?;
///
/// doubled.sort_unstable();
/// assert_eq!(doubled, (1..=10).map(|j| j * 2).collect::<Vec<_>>());
/// assert!(report.is_clean());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JobRunner {
    pool: WorkerPool,
    jobs: usize,
}

impl JobRunner {
    /// Creates a runner for `jobs` work items on `workers` workers.
    ///
    /// Both the work queue and the result sink are sized to hold every job,
    /// so the producer never waits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `workers` is zero.
    pub fn new(workers: usize, jobs: usize) -> Result<Self> {
        let capacity = jobs.max(1);
        let config = PoolConfig::new(workers)
            .with_queue_capacity(capacity)
            .with_result_capacity(capacity);
        Self::with_config(config, jobs)
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` does not validate.
    pub fn with_config(config: PoolConfig, jobs: usize) -> Result<Self> {
        Ok(Self {
            pool: WorkerPool::new(config)?,
            jobs,
        })
    }

    pub const fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub const fn jobs(&self) -> usize {
        self.jobs
    }

    /// Cancellation hook: cancelling this token stops the producer and every
    /// worker between two items.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.pool.shutdown_token()
    }

    /// Processes every job and discards task outputs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerFaulted`] if any worker faulted, or
    /// [`Error::Join`] if the producer task did not complete.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(jobs = self.jobs)))]
    pub async fn run<R, E, F, Fut>(&self, task: F) -> Result<PoolReport>
    where
        R: Send + 'static,
        E: Display + Send + 'static,
        F: Fn(WorkerId, usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let queue = WorkQueue::bounded(self.pool.config().queue_capacity)?;
        let handle = self.pool.start(&queue, task);
        let (stop, producer) = self.spawn_producer(&queue);

        let report = handle.await_completion().await;
        // Only has an effect if the workers exited before end-of-stream
        // (cancelled or faulted) and left the producer waiting on a full
        // queue.
        stop.cancel();
        join_producer(producer).await?;

        report.into_result()
    }

    /// Processes every job and gathers each task output through a result
    /// sink. Result order follows completion, not job order.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(jobs = self.jobs)))]
    pub async fn run_collect<R, E, F, Fut>(&self, task: F) -> Result<(Vec<R>, PoolReport)>
    where
        R: Send + 'static,
        E: Display + Send + 'static,
        F: Fn(WorkerId, usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let queue = WorkQueue::bounded(self.pool.config().queue_capacity)?;
        let fan_in = self.pool.start_fan_in(&queue, task)?;
        let (stop, producer) = self.spawn_producer(&queue);

        let (results, report) = fan_in.collect().await?;
        stop.cancel();
        join_producer(producer).await?;

        Ok((results, report.into_result()?))
    }

    /// Feeds `1..=jobs` into `queue` on its own task, then closes it.
    ///
    /// The returned token is a child of the pool's shutdown token, so both
    /// pool cancellation and the caller can stop the producer early. The
    /// queue is closed either way.
    fn spawn_producer(
        &self,
        queue: &WorkQueue<usize>,
    ) -> (CancellationToken, JoinHandle<Result<usize>>) {
        let stop = self.pool.shutdown_token().child_token();
        let producer = tokio::spawn(produce(queue.clone(), self.jobs, stop.clone()));
        (stop, producer)
    }
}

async fn produce(queue: WorkQueue<usize>, jobs: usize, stop: CancellationToken) -> Result<usize> {
    let mut sent = 0;

    for job in 1..=jobs {
        tokio::select! {
            biased;
            () = stop.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Producer stopped after {sent} of {jobs} jobs");
                break;
            }
            pushed = queue.push(job) => {
                pushed?;
                sent += 1;
            }
        }
    }

    queue.close()?;
    Ok(sent)
}

async fn join_producer(producer: JoinHandle<Result<usize>>) -> Result<()> {
    let _sent = producer.await.map_err(|e| Error::Join {
        context: format!("producer: {e}"),
    })??;

    #[cfg(feature = "tracing")]
    tracing::trace!("Producer enqueued {_sent} jobs");

    Ok(())
}

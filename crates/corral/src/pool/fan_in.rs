use crate::{
    Error, PoolHandle, PoolReport, Result, ResultSink, SinkWriter, WorkQueue, WorkerPool,
    pool::WorkerId, result_sink,
};
use core::{fmt::Display, future::Future};
use tokio::task::JoinHandle;

impl WorkerPool {
    /// Starts the fan-out/fan-in variant: workers run `task` per item and
    /// write each `Ok` output into a fresh result sink.
    ///
    /// A coordinator task waits for every worker to exit and only then
    /// closes the sink, so a consumer can drain [`FanIn::recv`] until `None`
    /// without racing the workers.
    ///
    /// The consumer must keep draining: workers wait on a full sink, and the
    /// sink only closes after every worker has exited.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configured result capacity is
    /// zero.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn start_fan_in<T, R, E, F, Fut>(&self, queue: &WorkQueue<T>, task: F) -> Result<FanIn<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Display + Send + 'static,
        F: Fn(WorkerId, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let (writer, results) = result_sink(self.config().result_capacity)?;
        let handle = self.spawn_workers(queue, Some(writer.clone()), task);
        let coordinator = tokio::spawn(close_after_completion(handle, writer));

        Ok(FanIn {
            results,
            coordinator,
        })
    }
}

/// Waits for every worker, then closes the sink.
///
/// This is the only place a result sink is ever closed. Closing any earlier
/// would turn an in-flight write into [`Error::Closed`].
async fn close_after_completion<R>(handle: PoolHandle, writer: SinkWriter<R>) -> Result<PoolReport> {
    let report = handle.await_completion().await;
    writer.close()?;

    #[cfg(feature = "tracing")]
    tracing::debug!("All workers exited; result sink closed");

    Ok(report)
}

/// Consumer side of a fan-in run.
pub struct FanIn<R> {
    results: ResultSink<R>,
    coordinator: JoinHandle<Result<PoolReport>>,
}

impl<R: Send + 'static> FanIn<R> {
    /// Takes the next result, or `None` once every worker has exited and the
    /// sink is drained.
    pub async fn recv(&self) -> Option<R> {
        self.results.recv().await
    }

    pub const fn results(&self) -> &ResultSink<R> {
        &self.results
    }

    /// Waits for the coordinator and returns the pool's report.
    ///
    /// Only call this after draining the sink, or when the sink cannot fill
    /// up; otherwise workers may wait on it forever.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Join`] if the coordinator task did not complete, or
    /// the coordinator's own error.
    pub async fn finish(self) -> Result<PoolReport> {
        join_coordinator(self.coordinator).await
    }

    /// Drains every result until end-of-stream, then returns them with the
    /// pool's report.
    ///
    /// # Errors
    ///
    /// See [`finish`](Self::finish).
    pub async fn collect(self) -> Result<(Vec<R>, PoolReport)> {
        let Self {
            results,
            coordinator,
        } = self;

        let collected = results.drain().await;
        let report = join_coordinator(coordinator).await?;
        Ok((collected, report))
    }
}

async fn join_coordinator(coordinator: JoinHandle<Result<PoolReport>>) -> Result<PoolReport> {
    coordinator.await.map_err(|e| Error::Join {
        context: format!("fan-in coordinator: {e}"),
    })?
}

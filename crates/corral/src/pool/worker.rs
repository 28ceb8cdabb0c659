use crate::{SinkWriter, WorkQueue, WorkerExit, WorkerReport};
use core::{any::Any, fmt::Display, future::Future, panic::AssertUnwindSafe};
use futures::FutureExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Identifies a worker within its pool. Workers are numbered `1..=workers`.
pub type WorkerId = usize;

/// Worker task that drains a [`WorkQueue`] until end-of-stream.
///
/// Each pulled item is handed to `task`. Per-item failures are isolated: an
/// `Err` from the task is counted and logged and the worker moves on to the
/// next item. A panic inside the task, or a failed write to `output`, ends
/// the worker with [`WorkerExit::Faulted`].
///
/// The shutdown token is checked before every pull, never while a task is
/// running, so cancellation stops a worker between two items.
///
/// # Arguments
///
/// - `worker`: Identifier for this worker (used in reports and logs).
/// - `queue`: Shared work queue this worker pulls from.
/// - `output`: Result sink writer for the fan-in variant, `None` otherwise.
/// - `task`: Task function shared by every worker of the pool.
/// - `shutdown_token`: The pool's cancellation token.
pub(crate) async fn worker_loop<T, R, E, F, Fut>(
    worker: WorkerId,
    queue: WorkQueue<T>,
    output: Option<SinkWriter<R>>,
    task: Arc<F>,
    shutdown_token: CancellationToken,
) -> WorkerReport
where
    F: Fn(WorkerId, T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker} started");

    let mut report = WorkerReport::new(worker);

    loop {
        let next = tokio::select! {
            biased;
            () = shutdown_token.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Worker {worker} received shutdown signal");
                report.exit = WorkerExit::Cancelled;
                break;
            }
            next = queue.pop() => next,
        };

        let Some(item) = next else {
            break;
        };

        match AssertUnwindSafe(task(worker, item)).catch_unwind().await {
            Ok(Ok(result)) => {
                report.processed += 1;
                if let Some(output) = &output {
                    if let Err(e) = output.send(result).await {
                        #[cfg(feature = "tracing")]
                        tracing::error!("Worker {worker} failed to deliver result: {e}");
                        report.exit = WorkerExit::Faulted {
                            reason: e.to_string(),
                        };
                        break;
                    }
                }
            }
            Ok(Err(_e)) => {
                report.failed += 1;
                #[cfg(feature = "tracing")]
                tracing::warn!("Worker {worker} task failed: {_e}");
            }
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                #[cfg(feature = "tracing")]
                tracing::error!("Worker {worker} task panicked: {reason}");
                report.exit = WorkerExit::Faulted { reason };
                break;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(
        "Worker {worker} stopped ({} processed, {} failed)",
        report.processed,
        report.failed
    );

    report
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("task panicked: {message}")
}

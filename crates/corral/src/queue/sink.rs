use crate::{Result, WorkQueue};
use futures::{Stream, StreamExt};

/// Creates a bounded result sink and returns its writer and consumer halves.
///
/// Workers write through cloned [`SinkWriter`]s. Unlike a [`WorkQueue`],
/// the sink is never closed by the code that writes to it: only the fan-in
/// coordinator closes it, after every worker has exited (see
/// [`WorkerPool::start_fan_in`](crate::WorkerPool::start_fan_in)).
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) if
/// `capacity` is zero.
pub fn result_sink<R>(capacity: usize) -> Result<(SinkWriter<R>, ResultSink<R>)> {
    let queue = WorkQueue::labelled(capacity, "result sink")?;
    Ok((
        SinkWriter {
            queue: queue.clone(),
        },
        ResultSink { queue },
    ))
}

/// The producing half of a result sink, held by workers.
pub struct SinkWriter<R> {
    queue: WorkQueue<R>,
}

impl<R> Clone for SinkWriter<R> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<R> SinkWriter<R> {
    /// Hands `result` to the sink, waiting while the sink is full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`](crate::Error::Closed) if the sink has
    /// already been closed. Callers must treat this as fatal: it means the
    /// sink was closed while a worker could still write to it.
    pub async fn send(&self, result: R) -> Result<()> {
        self.queue.push(result).await
    }

    pub(crate) fn close(&self) -> Result<()> {
        self.queue.close()
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

/// The consuming half of a result sink.
///
/// Results arrive in the order workers wrote them, which is unrelated to the
/// order of the work items that produced them.
pub struct ResultSink<R> {
    queue: WorkQueue<R>,
}

impl<R> ResultSink<R> {
    /// Takes the next result, or `None` once the sink is closed and drained.
    pub async fn recv(&self) -> Option<R> {
        self.queue.pop().await
    }

    /// Takes results until end-of-stream.
    pub async fn drain(self) -> Vec<R>
    where
        R: Send,
    {
        self.into_stream().collect().await
    }

    pub fn into_stream(self) -> impl Stream<Item = R> + Send
    where
        R: Send,
    {
        self.queue.into_stream()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

use crate::{Error, Result};
use core::pin::pin;
use futures::Stream;
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::Notify;

/// A bounded, multi-producer, multi-consumer FIFO of work items.
///
/// The queue moves through three states: *open* (accepts items),
/// *closed-non-empty* (no further items may be added but unconsumed items
/// remain), and *closed-empty* (terminal). The closed flag is an explicit
/// field guarded by the same lock as the buffer, so every reader observes the
/// close, not just the first one.
///
/// Cloning a [`WorkQueue`] produces another handle to the same queue.
///
/// ## Features
/// - ✅ Backpressure: [`push`](Self::push) waits while the buffer is full
/// - ✅ Broadcast end-of-stream: every reader sees `None` after close+drain
/// - ✅ Cancel-safe [`pop`](Self::pop): a dropped read never loses an item
///
/// ## See Also
/// - [`result_sink`](crate::result_sink)
pub struct WorkQueue<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    capacity: usize,
    channel: &'static str,
    // Signalled when an item arrives or the queue closes.
    readable: Notify,
    // Signalled when a slot frees up or the queue closes.
    writable: Notify,
}

struct State<T> {
    buffer: VecDeque<T>,
    closed: bool,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> WorkQueue<T> {
    /// Creates an open queue holding at most `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `capacity` is zero.
    pub fn bounded(capacity: usize) -> Result<Self> {
        Self::labelled(capacity, "work queue")
    }

    pub(crate) fn labelled(capacity: usize, channel: &'static str) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfig {
                reason: format!("{channel} capacity must be greater than 0"),
            });
        }

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    buffer: VecDeque::with_capacity(capacity),
                    closed: false,
                }),
                capacity,
                channel,
                readable: Notify::new(),
                writable: Notify::new(),
            }),
        })
    }

    /// Appends `item`, waiting for a free slot if the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the queue was closed before the item
    /// could be inserted. The item is dropped; writing after close is a
    /// broken shutdown ordering, not a condition to retry.
    pub async fn push(&self, item: T) -> Result<()> {
        loop {
            let mut notified = pin!(self.shared.writable.notified());
            notified.as_mut().enable();

            {
                let mut state = self.shared.state.lock();
                if state.closed {
                    return Err(Error::Closed {
                        channel: self.shared.channel,
                    });
                }
                if state.buffer.len() < self.shared.capacity {
                    state.buffer.push_back(item);
                    drop(state);
                    self.shared.readable.notify_one();
                    return Ok(());
                }
            }

            notified.await;
        }
    }

    /// Takes the next item in FIFO order, waiting while the queue is open
    /// and empty.
    ///
    /// Returns `None` once the queue is closed and drained. From then on
    /// every call, from any handle, returns `None` immediately.
    pub async fn pop(&self) -> Option<T> {
        loop {
            let mut notified = pin!(self.shared.readable.notified());
            notified.as_mut().enable();

            {
                let mut state = self.shared.state.lock();
                if let Some(item) = state.buffer.pop_front() {
                    drop(state);
                    self.shared.writable.notify_one();
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Marks the queue closed and wakes every waiting reader and writer.
    ///
    /// Items already buffered stay available to readers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyClosed`] on a second call.
    pub fn close(&self) -> Result<()> {
        {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Err(Error::AlreadyClosed {
                    channel: self.shared.channel,
                });
            }
            state.closed = true;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("{} closed", self.shared.channel);

        self.shared.readable.notify_waiters();
        self.shared.writable.notify_waiters();
        Ok(())
    }

    /// Number of buffered, not yet consumed items.
    pub fn len(&self) -> usize {
        self.shared.state.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Adapts the consumer side of this handle into a [`Stream`] that ends
    /// at end-of-stream.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send
    where
        T: Send,
    {
        futures::stream::unfold(self, |queue| async move {
            let item = queue.pop().await?;
            Some((item, queue))
        })
    }
}

impl<T> core::fmt::Debug for WorkQueue<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("WorkQueue")
            .field("channel", &self.shared.channel)
            .field("len", &state.buffer.len())
            .field("capacity", &self.shared.capacity)
            .field("closed", &state.closed)
            .finish()
    }
}

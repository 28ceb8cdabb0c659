use crate::{Error, Result};

/// Sizing for a [`WorkerPool`](crate::WorkerPool).
///
/// Capacities default to the worker count. Work and result buffers are
/// independent: a pool that never produces results ignores
/// `result_capacity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of concurrent workers, identified as `1..=workers`.
    pub workers: usize,
    /// Maximum number of buffered work items.
    pub queue_capacity: usize,
    /// Maximum number of buffered results in the fan-in variant.
    pub result_capacity: usize,
}

impl PoolConfig {
    pub const fn new(workers: usize) -> Self {
        Self {
            workers,
            queue_capacity: workers,
            result_capacity: workers,
        }
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_result_capacity(mut self, capacity: usize) -> Self {
        self.result_capacity = capacity;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if any field is zero.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig {
                reason: "workers must be greater than 0".to_string(),
            });
        }
        if self.queue_capacity == 0 {
            return Err(Error::InvalidConfig {
                reason: "queue_capacity must be greater than 0".to_string(),
            });
        }
        if self.result_capacity == 0 {
            return Err(Error::InvalidConfig {
                reason: "result_capacity must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

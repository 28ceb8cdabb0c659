use parking_lot::Mutex;

/// A counter whose increments are serialized by a [`Mutex`].
///
/// Any number of concurrent [`increment`](Self::increment) calls on a shared
/// instance add up exactly.
#[derive(Debug, Default)]
pub struct Counter {
    count: Mutex<u64>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
        }
    }

    /// Adds one and returns the new count.
    pub fn increment(&self) -> u64 {
        let mut count = self.count.lock();
        *count += 1;
        *count
    }

    pub fn value(&self) -> u64 {
        *self.count.lock()
    }
}

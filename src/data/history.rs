//! Sliding window of classified status samples for the timeline.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tablewatch_types::HistorySample;

/// Default number of samples to keep (one hour at one sample per minute).
pub const DEFAULT_CAPACITY: usize = 60;

/// Fixed-capacity, oldest-first buffer of history samples.
///
/// Appending past capacity drops the oldest samples. Samples are never
/// reordered or changed after insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryBuffer {
    samples: VecDeque<HistorySample>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` samples.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a sample, evicting from the front while over capacity.
    pub fn push(&mut self, sample: HistorySample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Maximum number of samples kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate over samples, oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &HistorySample> + '_ {
        self.samples.iter()
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<HistorySample> {
        self.samples.back().copied()
    }

    /// Copy the samples out, oldest first.
    pub fn to_vec(&self) -> Vec<HistorySample> {
        self.samples.iter().copied().collect()
    }
}

impl<'a> IntoIterator for &'a HistoryBuffer {
    type Item = &'a HistorySample;
    type IntoIter = std::collections::vec_deque::Iter<'a, HistorySample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Shared handle to the history buffer.
///
/// The recorder appends through [`push`](Self::push); readers borrow the
/// buffer for the duration of a closure with [`with`](Self::with), so the
/// lock is never held past the end of one render.
#[derive(Debug, Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<HistoryBuffer>>,
}

impl SharedHistory {
    /// Create an empty shared history with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HistoryBuffer::new(capacity))),
        }
    }

    /// Append one sample.
    pub fn push(&self, sample: HistorySample) {
        self.inner.lock().push(sample);
    }

    /// Run `f` against a read-only view of the buffer.
    pub fn with<R>(&self, f: impl FnOnce(&HistoryBuffer) -> R) -> R {
        let buffer = self.inner.lock();
        f(&buffer)
    }

    /// Copy the current samples, oldest first.
    pub fn snapshot(&self) -> Vec<HistorySample> {
        self.with(HistoryBuffer::to_vec)
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for SharedHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

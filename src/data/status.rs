//! Shared table status with a single writer and many readers.

use std::sync::Arc;

use parking_lot::RwLock;
use tablewatch_types::StatusSnapshot;

/// Owner of the table status.
///
/// There is exactly one `StatusStore` per monitored stream and it is the only
/// way to change the status and it is not `Clone`. Everything else
/// reads through a [`StatusReader`] obtained from [`reader()`](Self::reader).
///
/// # Example
///
/// ```
/// use tablewatch::StatusStore;
///
/// let store = StatusStore::new();
/// let reader = store.reader();
///
/// store.commit(true, 1_000);
/// assert!(reader.read().available);
/// assert_eq!(reader.read().last_updated_ms, 1_000);
/// ```
#[derive(Debug, Default)]
pub struct StatusStore {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl StatusStore {
    /// Create a store holding a never-confirmed status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly decoded availability.
    ///
    /// `last_updated_ms` never moves backward: a timestamp older than the
    /// current one (wall clock stepped back) keeps the current timestamp.
    /// Returns the snapshot as committed.
    pub fn commit(&self, available: bool, timestamp_ms: u64) -> StatusSnapshot {
        let mut snapshot = self.inner.write();
        snapshot.available = available;
        snapshot.last_updated_ms = snapshot.last_updated_ms.max(timestamp_ms);
        *snapshot
    }

    /// Read the current status.
    pub fn read(&self) -> StatusSnapshot {
        *self.inner.read()
    }

    /// Get a read-only handle to the status.
    pub fn reader(&self) -> StatusReader {
        StatusReader {
            inner: self.inner.clone(),
        }
    }
}

/// Read-only handle to a [`StatusStore`].
#[derive(Debug, Clone)]
pub struct StatusReader {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl StatusReader {
    /// Read the current status as one consistent snapshot.
    pub fn read(&self) -> StatusSnapshot {
        *self.inner.read()
    }
}

//! Status snapshot - the latest confirmed availability of the table.

use core::time::Duration;

use crate::HistorySample;

/// The latest confirmed availability and when it was confirmed.
///
/// `last_updated_ms` is a Unix timestamp in milliseconds; `0` means the
/// status has never been confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSnapshot {
    /// Availability decoded from the last good frame.
    pub available: bool,
    /// When that frame was committed.
    pub last_updated_ms: u64,
}

impl StatusSnapshot {
    /// Create a snapshot.
    pub const fn new(available: bool, last_updated_ms: u64) -> Self {
        Self {
            available,
            last_updated_ms,
        }
    }

    /// Returns true if at least one frame has been committed.
    pub const fn is_confirmed(&self) -> bool {
        self.last_updated_ms != 0
    }

    /// Age of the snapshot at `now_ms`. A timestamp in the future has age zero.
    pub fn age(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.last_updated_ms))
    }

    /// Returns true if the snapshot is older than `staleness` at `now_ms`.
    pub fn is_stale(&self, now_ms: u64, staleness: Duration) -> bool {
        !self.is_confirmed() || self.age(now_ms) > staleness
    }

    /// Classify the snapshot at `now_ms`.
    ///
    /// `age > staleness` gives [`HistorySample::Unknown`]; otherwise the
    /// stored availability decides between `Available` and `Busy`.
    pub fn classify(&self, now_ms: u64, staleness: Duration) -> HistorySample {
        if self.is_stale(now_ms, staleness) {
            HistorySample::Unknown
        } else {
            HistorySample::from_available(self.available)
        }
    }
}

/// Current wall-clock time as Unix milliseconds.
#[cfg(feature = "std")]
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

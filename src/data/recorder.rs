//! Periodic sampling of the table status into the history.

use std::time::Duration;

use tablewatch_types::{current_timestamp_ms, HistorySample};
use tokio::sync::watch;
use tracing::debug;

use super::history::SharedHistory;
use super::status::StatusReader;

/// Longest accepted sampling period.
pub const MAX_SAMPLE_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Shortest accepted sampling period.
const MIN_SAMPLE_PERIOD: Duration = Duration::from_millis(1);

/// Samples the status store on a fixed period and records the result.
///
/// Each tick reads the current [`StatusSnapshot`](tablewatch_types::StatusSnapshot),
/// classifies it against the staleness threshold and appends the
/// classification to the shared history.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use tablewatch::{HistoryRecorder, SharedHistory, StatusStore};
///
/// # tokio_test::block_on(async {
/// let store = StatusStore::new();
/// let history = SharedHistory::new(60);
///
/// let recorder = HistoryRecorder::builder()
///     .period(Duration::from_secs(60))
///     .staleness(Duration::from_secs(180))
///     .build(store.reader(), history.clone());
///
/// let handle = recorder.start();
/// // ... later
/// handle.stop();
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    status: StatusReader,
    history: SharedHistory,
    period: Duration,
    staleness: Duration,
}

impl HistoryRecorder {
    /// Create a builder for configuring the recorder.
    pub fn builder() -> HistoryRecorderBuilder {
        HistoryRecorderBuilder::default()
    }

    /// Sampling period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Staleness threshold used for classification.
    pub fn staleness(&self) -> Duration {
        self.staleness
    }

    /// Take one sample at `now_ms` and append it to the history.
    pub fn sample_at(&self, now_ms: u64) -> HistorySample {
        let snapshot = self.status.read();
        let sample = snapshot.classify(now_ms, self.staleness);
        self.history.push(sample);
        sample
    }

    /// Take one sample now.
    pub fn sample_now(&self) -> HistorySample {
        self.sample_at(current_timestamp_ms())
    }

    /// Start sampling in a background task.
    ///
    /// The first sample is taken one period after start. Returns a handle
    /// that stops the task when dropped or when `stop()` is called.
    pub fn start(self) -> RecorderHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + self.period;
            let mut ticker = tokio::time::interval_at(start, self.period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let sample = self.sample_now();
                        debug!(state = %sample, "recorded history sample");
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        RecorderHandle { stop_tx }
    }
}

/// Builder for configuring a [`HistoryRecorder`].
#[derive(Debug, Default)]
pub struct HistoryRecorderBuilder {
    period: Option<Duration>,
    staleness: Option<Duration>,
}

impl HistoryRecorderBuilder {
    /// Set the sampling period.
    ///
    /// Defaults to one minute if not specified. Values are clamped to
    /// between one millisecond and [`MAX_SAMPLE_PERIOD`].
    pub fn period(mut self, period: Duration) -> Self {
        self.period = Some(period.clamp(MIN_SAMPLE_PERIOD, MAX_SAMPLE_PERIOD));
        self
    }

    /// Set the staleness threshold.
    ///
    /// Defaults to three minutes if not specified.
    pub fn staleness(mut self, staleness: Duration) -> Self {
        self.staleness = Some(staleness);
        self
    }

    /// Build the recorder over a status reader and a history.
    pub fn build(self, status: StatusReader, history: SharedHistory) -> HistoryRecorder {
        HistoryRecorder {
            status,
            history,
            period: self.period.unwrap_or(Duration::from_secs(60)),
            staleness: self.staleness.unwrap_or(Duration::from_secs(180)),
        }
    }
}

/// Handle for controlling background sampling.
///
/// Drop this handle to stop sampling, or call `stop()` explicitly.
#[derive(Debug)]
pub struct RecorderHandle {
    stop_tx: watch::Sender<bool>,
}

impl RecorderHandle {
    /// Stop background sampling.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }
}

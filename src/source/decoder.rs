//! Frame decoder for the `tableStatus` event stream.
//!
//! A frame is an `event:` line naming the watched event, any number of
//! `data:` lines and a terminating blank line:
//!
//! ```text
//! :ok                              <- comment, ignored
//! event: tableStatus               <- arms the decoder
//! data: {"data":"free","ttl":"60"} <- accumulated
//!                                  <- blank line, payload parsed
//! ```

use tablewatch_types::{AvailabilityEvent, DEFAULT_EVENT_NAME};
use tracing::{debug, warn};

use super::line::LineKind;

/// Default number of consecutive unrecognized lines tolerated.
pub const DEFAULT_BAD_LINE_CEILING: u32 = 1000;

/// Counts consecutive unrecognized lines.
///
/// Reset by every successfully decoded frame. Trips once when the count
/// first exceeds the ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadLineCounter {
    count: u32,
    ceiling: u32,
}

impl BadLineCounter {
    /// Create a counter that trips above `ceiling`.
    pub fn new(ceiling: u32) -> Self {
        Self { count: 0, ceiling }
    }

    /// Count one bad line. Returns true exactly when this line trips the breaker.
    pub fn record(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.count == self.ceiling.saturating_add(1)
    }

    /// Clear the count after a good frame.
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Current consecutive count.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Configured ceiling.
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }
}

impl Default for BadLineCounter {
    fn default() -> Self {
        Self::new(DEFAULT_BAD_LINE_CEILING)
    }
}

/// Outcome of feeding one line to the [`FrameDecoder`].
#[derive(Debug)]
pub enum Decoded {
    /// The line was consumed; no frame completed.
    Nothing,
    /// A frame for the watched event was decoded.
    Event(AvailabilityEvent),
    /// A frame completed but its payload did not parse. The frame is dropped.
    Malformed {
        error: serde_json::Error,
        raw: String,
    },
    /// The line was unrecognized and pushed the bad-line count over its ceiling.
    CircuitOpen { count: u32, ceiling: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    Idle,
    Armed,
}

/// Line-at-a-time decoder for availability frames.
#[derive(Debug)]
pub struct FrameDecoder {
    event_name: String,
    state: FrameState,
    buffer: String,
    bad_lines: BadLineCounter,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_NAME, DEFAULT_BAD_LINE_CEILING)
    }
}

impl FrameDecoder {
    /// Create a decoder for frames named `event_name`.
    pub fn new(event_name: impl Into<String>, bad_line_ceiling: u32) -> Self {
        Self {
            event_name: event_name.into(),
            state: FrameState::Idle,
            buffer: String::new(),
            bad_lines: BadLineCounter::new(bad_line_ceiling),
        }
    }

    /// Feed one line (without its terminator).
    pub fn decode_line(&mut self, line: &str) -> Decoded {
        match (self.state, LineKind::classify(line)) {
            (_, LineKind::Comment(_)) => Decoded::Nothing,
            (_, LineKind::Event(name)) => {
                self.buffer.clear();
                if name == self.event_name {
                    self.state = FrameState::Armed;
                } else {
                    debug!(event = name, "skipping event");
                    self.state = FrameState::Idle;
                }
                Decoded::Nothing
            }
            (FrameState::Armed, LineKind::Data(value)) => {
                if !self.buffer.is_empty() {
                    self.buffer.push('\n');
                }
                self.buffer.push_str(value);
                Decoded::Nothing
            }
            (FrameState::Idle, LineKind::Data(_)) => Decoded::Nothing,
            (FrameState::Armed, LineKind::Blank) => self.finish_frame(),
            (FrameState::Idle, LineKind::Blank) => Decoded::Nothing,
            (_, LineKind::Other(other)) => {
                warn!(
                    line = other,
                    bad_lines = self.bad_lines.count() + 1,
                    "unknown line received"
                );
                self.record_bad_line()
            }
        }
    }

    /// Count a line that was dropped before decoding, such as one over the
    /// length limit. Any half-received frame is abandoned.
    pub fn reject_line(&mut self, len: usize) -> Decoded {
        self.reset_frame();
        warn!(
            len,
            bad_lines = self.bad_lines.count() + 1,
            "line too long, dropped"
        );
        self.record_bad_line()
    }

    fn record_bad_line(&mut self) -> Decoded {
        if self.bad_lines.record() {
            Decoded::CircuitOpen {
                count: self.bad_lines.count(),
                ceiling: self.bad_lines.ceiling(),
            }
        } else {
            Decoded::Nothing
        }
    }

    fn finish_frame(&mut self) -> Decoded {
        self.state = FrameState::Idle;
        let raw = std::mem::take(&mut self.buffer);

        match serde_json::from_str::<AvailabilityEvent>(&raw) {
            Ok(event) => {
                self.bad_lines.reset();
                Decoded::Event(event)
            }
            Err(error) => {
                warn!(error = %error, data = %raw, "failed to parse event payload");
                Decoded::Malformed { error, raw }
            }
        }
    }

    /// Forget any half-received frame. The bad-line count is kept.
    pub fn reset_frame(&mut self) {
        self.state = FrameState::Idle;
        self.buffer.clear();
    }

    /// Clear the bad-line count without decoding a frame.
    pub fn reset_bad_lines(&mut self) {
        self.bad_lines.reset();
    }

    /// Returns true while a watched event's data is being collected.
    pub fn is_armed(&self) -> bool {
        self.state == FrameState::Armed
    }

    /// Consecutive unrecognized lines so far.
    pub fn bad_lines(&self) -> u32 {
        self.bad_lines.count()
    }

    /// Name of the watched event.
    pub fn event_name(&self) -> &str {
        &self.event_name
    }
}

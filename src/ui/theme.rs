//! Colors shared by the status page and the timeline.

use tablewatch_types::HistorySample;

/// Color theme for status output.
///
/// Values are CSS/SVG color names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Color for an available table.
    pub available: &'static str,
    /// Color for a busy table.
    pub busy: &'static str,
    /// Color for a stale or never-confirmed status.
    pub unknown: &'static str,
    /// Stroke color for timeline tick marks.
    pub tick: &'static str,
}

impl Theme {
    /// Green, red and blue cells with black ticks.
    pub const fn classic() -> Self {
        Self {
            available: "green",
            busy: "red",
            unknown: "blue",
            tick: "black",
        }
    }

    /// Get the color for a sample.
    pub fn status_color(&self, sample: HistorySample) -> &'static str {
        match sample {
            HistorySample::Available => self.available,
            HistorySample::Busy => self.busy,
            HistorySample::Unknown => self.unknown,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

//! Three-valued occupancy state recorded in the history.

/// Classification of one status sample.
///
/// `Unknown` means the last confirmation is older than the staleness
/// threshold (or there never was one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HistorySample {
    #[default]
    Unknown,
    Available,
    Busy,
}

impl HistorySample {
    /// Classify a trusted availability value.
    pub const fn from_available(available: bool) -> Self {
        if available {
            HistorySample::Available
        } else {
            HistorySample::Busy
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            HistorySample::Unknown => "Unknown",
            HistorySample::Available => "Available",
            HistorySample::Busy => "Busy",
        }
    }

    /// Returns true if the sample carries a trusted value.
    pub const fn is_known(&self) -> bool {
        !matches!(self, HistorySample::Unknown)
    }
}

impl core::fmt::Display for HistorySample {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

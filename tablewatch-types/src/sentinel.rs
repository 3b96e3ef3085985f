//! Mapping from the raw `data` payload to a boolean availability.

use alloc::string::String;

/// Which side of the comparison the sentinel token stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SentinelMode {
    /// `data == token` means available; anything else is busy.
    #[default]
    AvailableIfEqual,
    /// `data == token` means busy; anything else is available.
    BusyIfEqual,
}

/// Sentinel rule used to turn an event payload into availability.
///
/// The two conventions disagree on unexpected payloads: with
/// `AvailableIfEqual("free")` a payload of `"offline"` is busy, with
/// `BusyIfEqual("busy")` it is available.
///
/// # Example
///
/// ```rust
/// use tablewatch_types::{Sentinel, SentinelMode};
///
/// let free = Sentinel::default();
/// assert!(free.is_available("free"));
/// assert!(!free.is_available("busy"));
///
/// let busy = Sentinel::new("busy", SentinelMode::BusyIfEqual);
/// assert!(busy.is_available("offline"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Sentinel {
    /// Token compared against the payload.
    pub token: String,
    /// Meaning of a match.
    pub mode: SentinelMode,
}

impl Sentinel {
    /// Create a sentinel rule.
    pub fn new(token: impl Into<String>, mode: SentinelMode) -> Self {
        Self {
            token: token.into(),
            mode,
        }
    }

    /// Decide availability for a payload.
    pub fn is_available(&self, data: &str) -> bool {
        let matches = data == self.token;
        match self.mode {
            SentinelMode::AvailableIfEqual => matches,
            SentinelMode::BusyIfEqual => !matches,
        }
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::new("free", SentinelMode::AvailableIfEqual)
    }
}

//! Status page and JSON report.

use std::time::Duration;

use chrono::DateTime;
use serde::Serialize;
use tablewatch_types::{HistorySample, StatusSnapshot};

use super::theme::Theme;

/// Shown in place of a timestamp when no status was ever confirmed.
pub const NEVER: &str = "never";

/// What the status page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    /// Classified state after the staleness check.
    pub state: HistorySample,
    /// Headline text, e.g. `"Available"`.
    pub label: &'static str,
    /// Text color for the state.
    pub color: &'static str,
    /// Last confirmation in Unix milliseconds, `0` if never.
    pub last_updated_ms: u64,
    /// RFC 1123 rendering of `last_updated_ms`, or [`NEVER`].
    pub last_updated_display: String,
}

impl StatusView {
    /// Classify `snapshot` at `now_ms` and pick its label and color.
    pub fn build(
        snapshot: &StatusSnapshot,
        now_ms: u64,
        staleness: Duration,
        theme: &Theme,
    ) -> Self {
        let state = snapshot.classify(now_ms, staleness);
        let last_updated_display = if snapshot.is_confirmed() {
            format_timestamp(snapshot.last_updated_ms)
        } else {
            NEVER.to_string()
        };

        Self {
            state,
            label: state.label(),
            color: theme.status_color(state),
            last_updated_ms: snapshot.last_updated_ms,
            last_updated_display,
        }
    }
}

/// Format Unix milliseconds as an RFC 1123 date in GMT.
///
/// Out-of-range values fall back to [`NEVER`].
pub fn format_timestamp(timestamp_ms: u64) -> String {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_else(|| NEVER.to_string())
}

/// Render the HTML status page.
///
/// The page reloads itself every `refresh` and embeds the `/graph` timeline.
pub fn render_page(view: &StatusView, refresh: Duration) -> String {
    format!(
        concat!(
            "<html><head><title>{label}</title>",
            "<meta http-equiv=\"refresh\" content=\"{refresh}\"></head>",
            "<body><p style=\"font-family:arial;color:{color};font-size:120px\">{label}</p>",
            "Last updated {updated}<p><img src=\"/graph\"></body></html>"
        ),
        label = view.label,
        refresh = refresh.as_secs().max(1),
        color = view.color,
        updated = view.last_updated_display,
    )
}

/// Machine-readable status, served as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub state: HistorySample,
    pub label: &'static str,
    pub color: &'static str,
    pub last_updated_ms: u64,
    /// RFC 1123 in GMT, or `never`.
    pub last_updated: String,
    pub staleness_secs: u64,
    /// Oldest first.
    pub history: Vec<HistorySample>,
}

impl StatusReport {
    pub fn new(view: StatusView, staleness: Duration, history: Vec<HistorySample>) -> Self {
        Self {
            state: view.state,
            label: view.label,
            color: view.color,
            last_updated_ms: view.last_updated_ms,
            last_updated: view.last_updated_display,
            staleness_secs: staleness.as_secs(),
            history,
        }
    }
}

//! Rendering for the status page, the JSON report and the SVG timeline.

pub mod page;
pub mod theme;
pub mod timeline;

pub use page::{format_timestamp, render_page, StatusReport, StatusView};
pub use theme::Theme;
pub use timeline::{TimelineRenderer, SVG_CONTENT_TYPE};

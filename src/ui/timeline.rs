//! SVG timeline of the status history.

use tablewatch_types::HistorySample;

use super::theme::Theme;

/// Media type of rendered timelines.
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Default width of one sample cell in pixels.
pub const DEFAULT_CELL_WIDTH: u32 = 10;

/// Default height of the timeline in pixels.
pub const DEFAULT_CELL_HEIGHT: u32 = 30;

/// Every n-th cell gets a full-height tick.
const MAJOR_TICK_EVERY: usize = 5;

/// Renders history samples as a row of colored cells.
///
/// Each sample becomes a `cell_width` x `cell_height` rectangle, oldest on
/// the left, with a tick line on its left edge: full height on every fifth
/// cell, half height otherwise. Output depends only on the samples and the
/// renderer's settings.
///
/// # Example
///
/// ```
/// use tablewatch::{HistoryBuffer, TimelineRenderer};
/// use tablewatch_types::HistorySample;
///
/// let mut history = HistoryBuffer::new(60);
/// history.push(HistorySample::Available);
/// history.push(HistorySample::Busy);
///
/// let svg = TimelineRenderer::default().render(&history);
/// assert!(svg.contains(r#"width="20" height="30""#));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRenderer {
    cell_width: u32,
    cell_height: u32,
    theme: Theme,
}

impl Default for TimelineRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_WIDTH, DEFAULT_CELL_HEIGHT)
    }
}

impl TimelineRenderer {
    /// Create a renderer with the given cell size and the classic theme.
    pub fn new(cell_width: u32, cell_height: u32) -> Self {
        Self {
            cell_width,
            cell_height,
            theme: Theme::classic(),
        }
    }

    /// Use a different color theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Width of a timeline holding `len` samples.
    pub fn width_for(&self, len: usize) -> u64 {
        len as u64 * u64::from(self.cell_width)
    }

    /// Height of the tick line for the cell at `index`.
    pub fn tick_height(&self, index: usize) -> u32 {
        if index % MAJOR_TICK_EVERY == 0 {
            self.cell_height
        } else {
            self.cell_height / 2
        }
    }

    /// Render samples (oldest first) as an SVG document.
    pub fn render<'a, I>(&self, samples: I) -> String
    where
        I: IntoIterator<Item = &'a HistorySample>,
        I::IntoIter: ExactSizeIterator,
    {
        let samples = samples.into_iter();
        let mut output = String::new();

        output.push_str("<?xml version=\"1.0\"?>\n");
        output.push_str(&format!(
            "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\">\n",
            self.width_for(samples.len()),
            self.cell_height
        ));

        for (index, sample) in samples.enumerate() {
            let x = index as u64 * u64::from(self.cell_width);
            output.push_str(&format!(
                "<rect x=\"{}\" y=\"0\" width=\"{}\" height=\"{}\" style=\"fill:{}\" />\n",
                x,
                self.cell_width,
                self.cell_height,
                self.theme.status_color(*sample)
            ));
            output.push_str(&format!(
                "<line x1=\"{}\" y1=\"0\" x2=\"{}\" y2=\"{}\" style=\"stroke:{}\" />\n",
                x,
                x,
                self.tick_height(index),
                self.theme.tick
            ));
        }

        output.push_str("</svg>\n");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HistoryBuffer;
    use HistorySample::{Available, Busy, Unknown};

    fn buffer(samples: &[HistorySample]) -> HistoryBuffer {
        let mut h = HistoryBuffer::new(60);
        for &s in samples {
            h.push(s);
        }
        h
    }

    #[test]
    fn empty_history_renders_zero_width_document() {
        let svg = TimelineRenderer::default().render(&HistoryBuffer::new(60));
        assert!(svg.starts_with("<?xml version=\"1.0\"?>\n<svg width=\"0\" height=\"30\""));
        assert!(svg.ends_with("</svg>\n"));
        assert!(!svg.contains("<rect"));
        assert!(!svg.contains("<line"));
    }

    #[test]
    fn exact_output_for_three_samples() {
        let svg = TimelineRenderer::default().render(&buffer(&[Available, Busy, Unknown]));
        let expected = concat!(
            "<?xml version=\"1.0\"?>\n",
            "<svg width=\"30\" height=\"30\" xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\">\n",
            "<rect x=\"0\" y=\"0\" width=\"10\" height=\"30\" style=\"fill:green\" />\n",
            "<line x1=\"0\" y1=\"0\" x2=\"0\" y2=\"30\" style=\"stroke:black\" />\n",
            "<rect x=\"10\" y=\"0\" width=\"10\" height=\"30\" style=\"fill:red\" />\n",
            "<line x1=\"10\" y1=\"0\" x2=\"10\" y2=\"15\" style=\"stroke:black\" />\n",
            "<rect x=\"20\" y=\"0\" width=\"10\" height=\"30\" style=\"fill:blue\" />\n",
            "<line x1=\"20\" y1=\"0\" x2=\"20\" y2=\"15\" style=\"stroke:black\" />\n",
            "</svg>\n",
        );
        assert_eq!(svg, expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let history = buffer(&[Busy, Busy, Available, Unknown, Available, Busy, Busy]);
        let renderer = TimelineRenderer::default();
        assert_eq!(renderer.render(&history), renderer.render(&history));
    }

    #[test]
    fn width_scales_with_length() {
        let renderer = TimelineRenderer::new(7, 20);
        for len in [0usize, 1, 5, 60] {
            let history = buffer(&vec![Available; len]);
            let svg = renderer.render(&history);
            assert!(svg.contains(&format!("<svg width=\"{}\" height=\"20\"", len * 7)));
            assert_eq!(svg.matches("<rect").count(), len);
        }
    }

    #[test]
    fn major_tick_every_fifth_cell() {
        let renderer = TimelineRenderer::default();
        for i in 0..100 {
            let expected = if i % 5 == 0 { 30 } else { 15 };
            assert_eq!(renderer.tick_height(i), expected, "index {}", i);
        }

        let svg = renderer.render(&buffer(&[Available; 11]));
        assert!(svg.contains("<line x1=\"50\" y1=\"0\" x2=\"50\" y2=\"30\""));
        assert!(svg.contains("<line x1=\"60\" y1=\"0\" x2=\"60\" y2=\"15\""));
        assert!(svg.contains("<line x1=\"100\" y1=\"0\" x2=\"100\" y2=\"30\""));
    }

    #[test]
    fn renders_plain_slices() {
        let samples = [Busy, Available];
        let svg = TimelineRenderer::default().render(&samples);
        assert!(svg.contains("fill:red"));
        assert!(svg.contains("fill:green"));
    }
}

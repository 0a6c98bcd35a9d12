use serde::Serialize;

use crate::config::{Presentation, Visualization};

/// A render-ready series, oldest bucket first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Styling passed through to the chart on a full draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleConfig {
    pub visualization: Visualization,
    pub max_width: u32,
    pub fill_color: String,
    pub stroke_color: String,
    pub highlight_fill: String,
    pub highlight_stroke: String,
}

impl From<&Presentation> for StyleConfig {
    fn from(presentation: &Presentation) -> Self {
        StyleConfig {
            visualization: presentation.visualization,
            max_width: presentation.max_width,
            fill_color: presentation.fill_color.clone(),
            stroke_color: presentation.stroke_color.clone(),
            highlight_fill: presentation.highlight_fill.clone(),
            highlight_stroke: presentation.highlight_stroke.clone(),
        }
    }
}

/// The charting surface a session draws into.
///
/// The incremental primitives mirror the ledger one-to-one: `append_point`
/// follows a bucket append, `remove_oldest_point` its FIFO eviction, and
/// `update_point` a count change that becomes visible on the next `redraw`.
pub trait RenderSink {
    /// Full (re)draw of the series.
    fn render(&mut self, series: &Series, style: &StyleConfig);

    fn append_point(&mut self, count: u64, label: &str);

    fn remove_oldest_point(&mut self);

    fn update_point(&mut self, index: usize, count: u64);

    /// Flushes pending `update_point` mutations to the screen.
    fn redraw(&mut self);
}

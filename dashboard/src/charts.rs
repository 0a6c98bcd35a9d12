pub mod svg;

use maud::Markup;
use volume::{Series, StyleConfig, Visualization};

/// The points the browser sees, plus the last SVG drawn from them.
///
/// `points` can run ahead of `markup`: count updates land in `points` right
/// away but only show up once the next draw happens.
#[derive(Default)]
pub struct ChartState {
    pub points: Series,
    pub style: Option<StyleConfig>,
    pub markup: Option<Markup>,
    pub draws: u64,
}

impl ChartState {
    pub fn draw(&mut self) {
        if let Some(style) = &self.style {
            self.markup = Some(render_chart(&self.points, style));
            self.draws += 1;
        }
    }
}

pub fn render_chart(series: &Series, style: &StyleConfig) -> Markup {
    match style.visualization {
        Visualization::Bar => svg::render_bar_chart(series, style),
        Visualization::Line => svg::render_line_chart(series, style),
    }
}

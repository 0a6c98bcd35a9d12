use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tracing::warn;
use volume::{RenderSink, Series, StyleConfig};

use crate::charts::ChartState;

/// Draws the session's series into the shared chart state as SVG.
///
/// Appends and removals redraw immediately; count updates are held until
/// `redraw` so a burst of them costs a single draw.
pub struct SvgSink {
    chart: Arc<RwLock<ChartState>>,
}

impl SvgSink {
    pub fn new(chart: Arc<RwLock<ChartState>>) -> Self {
        SvgSink { chart }
    }

    fn chart(&self) -> RwLockWriteGuard<'_, ChartState> {
        self.chart.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RenderSink for SvgSink {
    fn render(&mut self, series: &Series, style: &StyleConfig) {
        let mut chart = self.chart();
        chart.points = series.clone();
        chart.style = Some(style.clone());
        chart.draw();
    }

    fn append_point(&mut self, count: u64, label: &str) {
        let mut chart = self.chart();
        chart.points.labels.push(label.to_owned());
        chart.points.counts.push(count);
        chart.draw();
    }

    fn remove_oldest_point(&mut self) {
        let mut chart = self.chart();
        if chart.points.is_empty() {
            return;
        }
        chart.points.labels.remove(0);
        chart.points.counts.remove(0);
        chart.draw();
    }

    fn update_point(&mut self, index: usize, count: u64) {
        let mut chart = self.chart();
        match chart.points.counts.get_mut(index) {
            Some(slot) => *slot = count,
            None => warn!(index, "Update for a point the chart doesn't have"),
        }
    }

    fn redraw(&mut self) {
        self.chart().draw();
    }
}

#[cfg(test)]
mod tests {
    use volume::Presentation;

    use super::*;

    fn sink() -> (SvgSink, Arc<RwLock<ChartState>>) {
        let chart = Arc::new(RwLock::new(ChartState::default()));
        (SvgSink::new(Arc::clone(&chart)), chart)
    }

    fn series() -> Series {
        Series {
            labels: vec!["1:00".to_owned(), "2:00".to_owned()],
            counts: vec![4, 1],
        }
    }

    #[test]
    fn updates_wait_for_redraw() {
        let (mut sink, chart) = sink();
        sink.render(&series(), &StyleConfig::from(&Presentation::default()));
        sink.update_point(1, 7);

        let state = chart.read().unwrap();
        assert_eq!(state.draws, 1);
        assert_eq!(state.points.counts, vec![4, 7]);
        assert!(!state.markup.as_ref().unwrap().0.contains("2:00: 7"));
        drop(state);

        sink.redraw();
        let state = chart.read().unwrap();
        assert_eq!(state.draws, 2);
        assert!(state.markup.as_ref().unwrap().0.contains("2:00: 7"));
    }

    #[test]
    fn shift_keeps_labels_and_counts_aligned() {
        let (mut sink, chart) = sink();
        sink.render(&series(), &StyleConfig::from(&Presentation::default()));
        sink.append_point(0, "3:00");
        sink.remove_oldest_point();

        let state = chart.read().unwrap();
        assert_eq!(state.points.labels, vec!["2:00", "3:00"]);
        assert_eq!(state.points.counts, vec![1, 0]);
        assert_eq!(state.draws, 3);
    }

    #[test]
    fn nothing_is_drawn_before_the_first_render() {
        let (mut sink, chart) = sink();
        sink.append_point(1, "1:00");
        sink.redraw();
        assert!(chart.read().unwrap().markup.is_none());
    }
}

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use volume::{Batch, EventSource, RawEvent, RenderSink, Series, SessionConfig, SourceError, StyleConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Render(Series),
    Append(u64, String),
    RemoveOldest,
    Update(usize, u64),
    Redraw,
}

/// Records every call and keeps a mirror of what the chart would show.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
    pub points: Vec<(String, u64)>,
}

impl RecordingSink {
    pub fn renders(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SinkCall::Render(_)))
            .count()
    }

    pub fn redraws(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SinkCall::Redraw))
            .count()
    }

    pub fn last_render(&self) -> Option<&Series> {
        self.calls.iter().rev().find_map(|c| match c {
            SinkCall::Render(series) => Some(series),
            _ => None,
        })
    }

    pub fn counts(&self) -> Vec<u64> {
        self.points.iter().map(|(_, count)| *count).collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl RenderSink for RecordingSink {
    fn render(&mut self, series: &Series, _style: &StyleConfig) {
        self.points = series
            .labels
            .iter()
            .cloned()
            .zip(series.counts.iter().copied())
            .collect();
        self.calls.push(SinkCall::Render(series.clone()));
    }

    fn append_point(&mut self, count: u64, label: &str) {
        self.points.push((label.to_owned(), count));
        self.calls.push(SinkCall::Append(count, label.to_owned()));
    }

    fn remove_oldest_point(&mut self) {
        if !self.points.is_empty() {
            self.points.remove(0);
        }
        self.calls.push(SinkCall::RemoveOldest);
    }

    fn update_point(&mut self, index: usize, count: u64) {
        if let Some(point) = self.points.get_mut(index) {
            point.1 = count;
        }
        self.calls.push(SinkCall::Update(index, count));
    }

    fn redraw(&mut self) {
        self.calls.push(SinkCall::Redraw);
    }
}

/// Serves a fixed initial batch, then queued live results (empty batches once
/// the queue runs dry).
#[derive(Default)]
pub struct ScriptedSource {
    initial: Mutex<Option<Result<Batch, SourceError>>>,
    updates: Mutex<VecDeque<Result<Batch, SourceError>>>,
    pub polled_since: Mutex<Vec<Option<String>>>,
    pub initial_fetches: Mutex<usize>,
}

impl ScriptedSource {
    pub fn new(initial: Result<Batch, SourceError>) -> Self {
        ScriptedSource {
            initial: Mutex::new(Some(initial)),
            ..Default::default()
        }
    }

    pub fn push_update(&self, update: Result<Batch, SourceError>) {
        self.updates.lock().unwrap().push_back(update);
    }
}

impl EventSource for ScriptedSource {
    async fn fetch_initial(&self, _query: &str) -> Result<Batch, SourceError> {
        *self.initial_fetches.lock().unwrap() += 1;
        self.initial
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Batch::default()))
    }

    async fn poll_updates(&self, _query: &str, since: Option<&str>) -> Result<Batch, SourceError> {
        self.polled_since
            .lock()
            .unwrap()
            .push(since.map(str::to_owned));
        self.updates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Batch::default()))
    }
}

pub fn config() -> SessionConfig {
    SessionConfig {
        target_url: Some("http://example.com/feed".to_owned()),
        ..SessionConfig::default()
    }
}

pub fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn post_at(ts: DateTime<Utc>) -> RawEvent {
    RawEvent::post(ts.to_rfc3339())
}

pub fn batch(events: Vec<RawEvent>, next_since: Option<&str>) -> Batch {
    Batch {
        entries: events,
        next_since: next_since.map(str::to_owned),
    }
}

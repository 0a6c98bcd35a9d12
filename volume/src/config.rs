//! Session configuration, loadable from a TOML file.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Amount of root items requested from the search API per call.
pub const DEFAULT_MAX_ITEMS: usize = 100;
/// Quiet period between a point mutation and the coalesced redraw, in ms.
pub const DEFAULT_CHART_UPDATE_DELAY_MS: u64 = 5000;
pub const DEFAULT_MAX_INTERVALS: usize = 10;
/// Year resolution never shows more than this many buckets.
pub const YEAR_WINDOW_LIMIT: usize = 3;
/// How often the host polls the live-update channel.
pub const DEFAULT_LIVE_POLL_INTERVAL_MS: u64 = 10_000;

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct SessionConfig {
    /// Source identifier. Nothing can be fetched without it.
    pub target_url: Option<String>,
    pub max_items_to_retrieve: usize,
    /// Render coalescing quiet period, in milliseconds.
    pub chart_update_delay: u64,
    /// Live-update poll interval, in milliseconds.
    pub live_poll_interval: u64,
    /// Offset from UTC used for anchor truncation and bucket labels.
    pub utc_offset_minutes: i32,
    pub presentation: Presentation,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            target_url: None,
            max_items_to_retrieve: DEFAULT_MAX_ITEMS,
            chart_update_delay: DEFAULT_CHART_UPDATE_DELAY_MS,
            live_poll_interval: DEFAULT_LIVE_POLL_INTERVAL_MS,
            utc_offset_minutes: 0,
            presentation: Presentation::default(),
        }
    }
}

impl SessionConfig {
    pub fn chart_update_delay(&self) -> Duration {
        Duration::from_millis(self.chart_update_delay)
    }

    pub fn live_poll_interval(&self) -> Duration {
        Duration::from_millis(self.live_poll_interval.max(1))
    }

    /// Falls back to UTC when the configured offset is out of range.
    pub fn time_zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Returns the configured target, ignoring blank values.
    pub fn target(&self) -> Option<&str> {
        self.target_url
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Upper bound on retained window length, never less than one bucket.
    pub fn max_window(&self) -> usize {
        self.presentation.max_intervals.max(1)
    }

    /// Lower bound used when trimming leading empty buckets, if trimming is enabled.
    pub fn min_window(&self) -> Option<usize> {
        self.presentation
            .min_intervals
            .map(|min| min.clamp(1, self.max_window()))
    }

    /// Search query for the configured target.
    pub fn query(&self) -> Option<String> {
        self.target().map(|target| {
            format!(
                "scope:{target} sortOrder:reverseChronological itemsPerPage:{} children:0",
                self.max_items_to_retrieve
            )
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Presentation {
    pub visualization: Visualization,
    pub max_intervals: usize,
    /// When set, leading empty buckets are trimmed down to this many after the
    /// initial batch is placed.
    pub min_intervals: Option<usize>,
    /// Maximum width of the chart container, in px.
    pub max_width: u32,
    pub fill_color: String,
    pub stroke_color: String,
    pub highlight_fill: String,
    pub highlight_stroke: String,
}

impl Default for Presentation {
    fn default() -> Self {
        Presentation {
            visualization: Visualization::Bar,
            max_intervals: DEFAULT_MAX_INTERVALS,
            min_intervals: None,
            max_width: 700,
            fill_color: "#D8D8D8".to_owned(),
            stroke_color: "#C0C0C0".to_owned(),
            highlight_fill: "#C0C0C0".to_owned(),
            highlight_stroke: "#C0C0C0".to_owned(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visualization {
    #[default]
    Bar,
    Line,
}

/// Loads a session config. Returns `SessionConfig::default()` if the file doesn't
/// exist; propagates other I/O and parse errors.
pub fn load(path: &Path) -> io::Result<SessionConfig> {
    match fs::read_to_string(path) {
        Ok(content) => parse(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(SessionConfig::default()),
        Err(e) => Err(e),
    }
}

pub fn parse(content: &str) -> io::Result<SessionConfig> {
    toml::from_str(content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

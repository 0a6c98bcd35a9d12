//! Picks a bucket granularity from the age distribution of a batch.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike};
use serde::Serialize;

use crate::classifier::ClassifiedEntry;
use crate::config::YEAR_WINDOW_LIMIT;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionKind {
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl ResolutionKind {
    /// Picks the finest tier whose threshold exceeds `avg` (seconds).
    pub fn for_average_age(avg: i64) -> Self {
        if avg < HOUR {
            ResolutionKind::Minute
        } else if avg < DAY {
            ResolutionKind::Hour
        } else if avg < WEEK {
            ResolutionKind::Day
        } else if avg < YEAR {
            ResolutionKind::Month
        } else {
            ResolutionKind::Year
        }
    }

    /// Bucket width in seconds. Months are a flat 30 days.
    pub fn interval(self) -> i64 {
        match self {
            ResolutionKind::Minute => MINUTE,
            ResolutionKind::Hour => HOUR,
            ResolutionKind::Day => DAY,
            ResolutionKind::Month => MONTH,
            ResolutionKind::Year => YEAR,
        }
    }

    /// Number of buckets the initial window holds for this granularity.
    pub fn window_size(self, max_window: usize) -> usize {
        match self {
            ResolutionKind::Year => max_window.min(YEAR_WINDOW_LIMIT),
            _ => max_window,
        }
    }

    /// Truncates `now` to the start of its minute/hour/day/month/year in `tz`.
    pub fn truncate<Tz: TimeZone>(self, now: &DateTime<Tz>) -> i64 {
        let local = now.naive_local();
        let date = local.date();
        let truncated = match self {
            ResolutionKind::Minute => date.and_hms_opt(local.hour(), local.minute(), 0),
            ResolutionKind::Hour => date.and_hms_opt(local.hour(), 0, 0),
            ResolutionKind::Day => date.and_hms_opt(0, 0, 0),
            ResolutionKind::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            ResolutionKind::Year => {
                NaiveDate::from_ymd_opt(date.year(), 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
            }
        };

        truncated
            .and_then(|naive| now.timezone().from_local_datetime(&naive).earliest())
            .map(|dt| dt.timestamp())
            // Only reachable for dates chrono cannot represent.
            .unwrap_or_else(|| now.timestamp())
    }
}

/// The granularity chosen for a session, anchored at its newest bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub kind: ResolutionKind,
    /// Bucket width in seconds.
    pub interval: i64,
    /// Start of the most recent bucket, epoch seconds.
    pub start: i64,
}

impl Resolution {
    pub fn new(kind: ResolutionKind, start: i64) -> Self {
        Resolution {
            kind,
            interval: kind.interval(),
            start,
        }
    }

    /// Chooses the resolution for `entries` as seen at `now`.
    ///
    /// Half the age of the oldest entry decides the tier; an empty batch
    /// selects minutes.
    pub fn select<Tz: TimeZone>(entries: &[ClassifiedEntry], now: &DateTime<Tz>) -> Self {
        let avg = average_age(entries, now.timestamp());
        let kind = ResolutionKind::for_average_age(avg);
        Resolution::new(kind, kind.truncate(now))
    }
}

fn average_age(entries: &[ClassifiedEntry], now: i64) -> i64 {
    entries
        .iter()
        .map(|entry| entry.timestamp)
        .min()
        .map(|oldest| (now - oldest) / 2)
        .unwrap_or(0)
}

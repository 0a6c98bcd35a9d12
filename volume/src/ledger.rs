//! The bounded, ordered window of buckets.

use std::collections::VecDeque;

use chrono::FixedOffset;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::LedgerError;
use crate::label::period_label;
use crate::resolution::Resolution;
use crate::sink::Series;

/// A single bucket covering `(start, start + interval]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    /// Epoch seconds.
    pub start: i64,
    pub count: u64,
    pub label: String,
}

impl Period {
    pub fn contains(&self, timestamp: i64, interval: i64) -> bool {
        timestamp > self.start && timestamp <= self.start + interval
    }
}

/// Buckets ordered oldest to newest, spaced exactly one interval apart.
///
/// The newest bucket always starts at the resolution's anchor, and the anchor
/// only moves forward.
#[derive(Debug, Clone)]
pub struct BucketLedger {
    resolution: Resolution,
    max_window: usize,
    tz: FixedOffset,
    periods: VecDeque<Period>,
}

impl BucketLedger {
    /// Lays out `window_size` empty buckets ending at `resolution.start`.
    pub fn initialize(
        resolution: Resolution,
        window_size: usize,
        max_window: usize,
        tz: FixedOffset,
    ) -> Self {
        let max_window = max_window.max(1);
        let window_size = window_size.clamp(1, max_window);
        let mut ledger = BucketLedger {
            resolution,
            max_window,
            tz,
            periods: VecDeque::with_capacity(max_window + 1),
        };
        for i in (0..window_size as i64).rev() {
            let start = resolution.start - i * resolution.interval;
            let label = ledger.label_for(start);
            ledger.periods.push_back(Period {
                start,
                count: 0,
                label,
            });
        }
        ledger
    }

    /// Current resolution; `start` tracks the newest bucket.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn interval(&self) -> i64 {
        self.resolution.interval
    }

    pub fn max_window(&self) -> usize {
        self.max_window
    }

    pub fn periods(&self) -> &VecDeque<Period> {
        &self.periods
    }

    #[cfg(test)]
    pub(crate) fn periods_mut(&mut self) -> &mut VecDeque<Period> {
        &mut self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn newest(&self) -> Option<&Period> {
        self.periods.back()
    }

    pub fn oldest(&self) -> Option<&Period> {
        self.periods.front()
    }

    /// Start of the bucket that would be appended next.
    pub fn next_start(&self) -> Result<i64, LedgerError> {
        self.newest()
            .map(|p| p.start + self.resolution.interval)
            .ok_or(LedgerError::Empty)
    }

    pub fn label_for(&self, start: i64) -> String {
        period_label(self.resolution.kind, start, &self.tz)
    }

    /// Pushes a new newest bucket one interval past the current one.
    ///
    /// Returns the evicted oldest bucket when the window was already full.
    pub fn append(&mut self, count: u64, label: String) -> Result<Option<Period>, LedgerError> {
        let start = self.next_start()?;
        self.periods.push_back(Period {
            start,
            count,
            label,
        });
        self.resolution.start = start;

        let dropped = if self.periods.len() > self.max_window {
            self.periods.pop_front()
        } else {
            None
        };
        if let Some(period) = &dropped {
            debug!(start = period.start, count = period.count, "Dropped oldest bucket");
        }

        self.validate()?;
        Ok(dropped)
    }

    /// Like [`append`](Self::append), deriving the label from the new start.
    pub fn append_next(&mut self, count: u64) -> Result<Option<Period>, LedgerError> {
        let label = self.label_for(self.next_start()?);
        self.append(count, label)
    }

    /// Drops leading empty buckets until a non-empty one leads or only
    /// `min_window` buckets remain. Returns how many were dropped.
    pub fn trim_leading_empty(&mut self, min_window: usize) -> usize {
        let min_window = min_window.max(1);
        let mut dropped = 0;
        while self.periods.len() > min_window
            && self.periods.front().is_some_and(|p| p.count == 0)
        {
            self.periods.pop_front();
            dropped += 1;
        }
        dropped
    }

    /// Counts `timestamp` into the bucket whose range holds it.
    ///
    /// Scans newest first since live entries almost always land at the leading
    /// edge. Returns the index of the incremented bucket, or `None` when no
    /// bucket covers the timestamp.
    pub fn increment_latest_matching(&mut self, timestamp: i64) -> Option<(usize, u64)> {
        let interval = self.resolution.interval;
        let (index, period) = self
            .periods
            .iter_mut()
            .enumerate()
            .rev()
            .find(|(_, p)| p.contains(timestamp, interval))?;
        period.count += 1;
        Some((index, period.count))
    }

    /// Checks ascending order, fixed spacing, window bound and anchor.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let interval = self.resolution.interval;
        let mut expected = None;
        for (index, period) in self.periods.iter().enumerate() {
            if let Some(expected) = expected
                && period.start != expected
            {
                error!(index, expected, found = period.start, "Bucket spacing violated");
                return Err(LedgerError::InvariantViolation {
                    index,
                    expected,
                    found: period.start,
                });
            }
            expected = Some(period.start + interval);
        }

        let newest = self.newest().ok_or(LedgerError::Empty)?;
        if newest.start != self.resolution.start || self.periods.len() > self.max_window {
            error!(
                anchor = self.resolution.start,
                newest = newest.start,
                len = self.periods.len(),
                "Window anchor or bound violated"
            );
            return Err(LedgerError::InvariantViolation {
                index: self.periods.len() - 1,
                expected: self.resolution.start,
                found: newest.start,
            });
        }
        Ok(())
    }

    /// Labels and counts, oldest first.
    pub fn series(&self) -> Series {
        let (labels, counts) = self
            .periods
            .iter()
            .map(|p| (p.label.clone(), p.count))
            .unzip();
        Series { labels, counts }
    }
}

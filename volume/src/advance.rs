//! Moves the window forward on wall-clock time, independent of data arrival.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::LedgerError;
use crate::ledger::BucketLedger;

/// One empty bucket opened by the timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub start: i64,
    pub label: String,
    /// Whether the oldest bucket was evicted to make room.
    pub evicted: bool,
}

/// Wakes at each bucket boundary after the newest bucket.
#[derive(Debug, Default)]
pub struct AdvanceTimer {
    next_boundary: Option<i64>,
    wake_at: Option<DateTime<Utc>>,
}

impl AdvanceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the next wake from the ledger's newest bucket.
    ///
    /// Wakes at the boundary itself, or one full interval from `now` if the
    /// boundary is not in the future.
    pub fn start(&mut self, ledger: &BucketLedger, now: DateTime<Utc>) -> Result<(), LedgerError> {
        let boundary = ledger.next_start()?;
        let interval = ledger.interval();
        let wake_at = if boundary > now.timestamp() {
            DateTime::from_timestamp(boundary, 0)
        } else {
            now.checked_add_signed(chrono::Duration::seconds(interval))
        };
        self.next_boundary = Some(boundary);
        self.wake_at = Some(wake_at.unwrap_or(DateTime::<Utc>::MAX_UTC));
        Ok(())
    }

    /// Cancels the outstanding wake. Idempotent.
    pub fn stop(&mut self) {
        self.next_boundary = None;
        self.wake_at = None;
    }

    pub fn wake_at(&self) -> Option<DateTime<Utc>> {
        self.wake_at
    }

    pub fn is_running(&self) -> bool {
        self.wake_at.is_some()
    }

    /// Handles a wake: opens an empty bucket at the pending boundary unless an
    /// entry already did, then reschedules from the newest bucket.
    ///
    /// Does nothing if the timer is stopped or not yet due.
    pub fn advance(
        &mut self,
        ledger: &mut BucketLedger,
        now: DateTime<Utc>,
    ) -> Result<Option<Advance>, LedgerError> {
        let (Some(boundary), Some(wake_at)) = (self.next_boundary, self.wake_at) else {
            return Ok(None);
        };
        if wake_at > now {
            return Ok(None);
        }

        let newest = ledger.newest().ok_or(LedgerError::Empty)?.start;
        let advance = if newest < boundary {
            let expected = ledger.next_start()?;
            if expected != boundary {
                return Err(LedgerError::InvariantViolation {
                    index: ledger.len(),
                    expected,
                    found: boundary,
                });
            }
            let label = ledger.label_for(boundary);
            let evicted = ledger.append(0, label.clone())?.is_some();
            debug!(start = boundary, evicted, "Advanced window");
            Some(Advance {
                start: boundary,
                label,
                evicted,
            })
        } else {
            None
        };

        self.start(ledger, now)?;
        Ok(advance)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Offset, Utc};

    use super::*;
    use crate::resolution::{Resolution, ResolutionKind};

    const T: i64 = 1_709_564_400;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn minutes(window: usize) -> BucketLedger {
        BucketLedger::initialize(
            Resolution::new(ResolutionKind::Minute, T),
            window,
            window,
            Utc.fix(),
        )
    }

    #[test]
    fn wakes_at_next_boundary() {
        let ledger = minutes(5);
        let mut timer = AdvanceTimer::new();
        timer.start(&ledger, at(T + 42)).unwrap();
        assert_eq!(timer.wake_at(), Some(at(T + 60)));
    }

    #[test]
    fn past_boundary_falls_back_to_full_interval() {
        let ledger = minutes(5);
        let mut timer = AdvanceTimer::new();
        timer.start(&ledger, at(T + 600)).unwrap();
        assert_eq!(timer.wake_at(), Some(at(T + 660)));
    }

    #[test]
    fn empty_buckets_open_on_each_crossing() {
        let mut ledger = minutes(5);
        let mut timer = AdvanceTimer::new();
        timer.start(&ledger, at(T + 1)).unwrap();

        for crossing in 1..=3 {
            let now = at(T + crossing * 60);
            let advance = timer.advance(&mut ledger, now).unwrap().unwrap();
            assert_eq!(advance.start, T + crossing * 60);
            assert!(advance.evicted);
            assert_eq!(timer.wake_at(), Some(at(T + (crossing + 1) * 60)));
        }
        assert_eq!(ledger.len(), 5);
        assert_eq!(ledger.newest().unwrap().start, T + 180);
        assert!(ledger.periods().iter().all(|p| p.count == 0));
    }

    #[test]
    fn skips_append_when_entries_already_advanced() {
        let mut ledger = minutes(5);
        let mut timer = AdvanceTimer::new();
        timer.start(&ledger, at(T + 1)).unwrap();
        ledger.append_next(1).unwrap();

        assert_eq!(timer.advance(&mut ledger, at(T + 60)).unwrap(), None);
        assert_eq!(ledger.newest().unwrap().start, T + 60);
        assert_eq!(timer.wake_at(), Some(at(T + 120)));
    }

    #[test]
    fn not_due_or_stopped_does_nothing() {
        let mut ledger = minutes(5);
        let mut timer = AdvanceTimer::new();
        timer.start(&ledger, at(T + 1)).unwrap();
        assert_eq!(timer.advance(&mut ledger, at(T + 59)).unwrap(), None);

        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.advance(&mut ledger, at(T + 600)).unwrap(), None);
        assert_eq!(ledger.newest().unwrap().start, T);
    }
}

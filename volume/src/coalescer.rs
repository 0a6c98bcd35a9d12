//! Debounces redraws so a burst of point updates costs one render.

use std::time::Duration;

use chrono::{DateTime, Utc};

pub struct RenderCoalescer {
    delay: chrono::Duration,
    due: Option<DateTime<Utc>>,
}

impl RenderCoalescer {
    pub fn new(delay: Duration) -> Self {
        RenderCoalescer {
            delay: chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::MAX),
            due: None,
        }
    }

    /// Arms the timer unless it is already pending. Returns true if newly armed.
    pub fn request(&mut self, now: DateTime<Utc>) -> bool {
        if self.due.is_some() {
            return false;
        }
        self.due = Some(now.checked_add_signed(self.delay).unwrap_or(DateTime::<Utc>::MAX_UTC));
        true
    }

    pub fn due(&self) -> Option<DateTime<Utc>> {
        self.due
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// Disarms and returns true if the quiet period has elapsed by `now`.
    pub fn fire(&mut self, now: DateTime<Utc>) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn requests_within_quiet_period_collapse() {
        let mut coalescer = RenderCoalescer::new(Duration::from_secs(5));
        assert!(coalescer.request(at(100)));
        assert!(!coalescer.request(at(101)));
        assert!(!coalescer.request(at(104)));
        assert_eq!(coalescer.due(), Some(at(105)));

        assert!(!coalescer.fire(at(104)));
        assert!(coalescer.fire(at(105)));
        assert!(!coalescer.fire(at(106)));
    }

    #[test]
    fn rearms_after_firing() {
        let mut coalescer = RenderCoalescer::new(Duration::from_secs(5));
        coalescer.request(at(100));
        coalescer.fire(at(105));
        assert!(coalescer.request(at(107)));
        assert_eq!(coalescer.due(), Some(at(112)));
    }

    #[test]
    fn cancel_clears_pending_redraw() {
        let mut coalescer = RenderCoalescer::new(Duration::from_secs(5));
        coalescer.request(at(100));
        coalescer.cancel();
        assert!(!coalescer.is_armed());
        assert!(!coalescer.fire(at(200)));
    }
}

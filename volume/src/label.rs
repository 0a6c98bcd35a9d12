use chrono::{DateTime, TimeZone};

use crate::resolution::ResolutionKind;

/// Display label for a bucket starting at `start` (epoch seconds).
///
/// Minutes and hours use a 12-hour clock, days show `Mon d`, months the short
/// month name, years the full year.
pub fn period_label<Tz: TimeZone>(kind: ResolutionKind, start: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(utc) = DateTime::from_timestamp(start, 0) else {
        return start.to_string();
    };
    let local = utc.with_timezone(tz);
    let pattern = match kind {
        ResolutionKind::Minute => "%-I:%M",
        ResolutionKind::Hour => "%-I:00",
        ResolutionKind::Day => "%b %-d",
        ResolutionKind::Month => "%b",
        ResolutionKind::Year => "%Y",
    };
    local.format(pattern).to_string()
}

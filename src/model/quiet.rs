//! Quiet-hours gate: evaluates whether a time of day falls inside any
//! configured suppression interval.
//!
//! Quiet hours silence the notification tone and blank the ad surface while
//! classes are in session. The gate is a pure predicate — every caller probes
//! it synchronously with the current time.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// One suppression interval, `HH:MM` to `HH:MM`, same day.
///
/// Entries with a missing or malformed endpoint are skipped rather than
/// rejected — a half-edited interval must never take the display down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeInterval {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl TimeInterval {
    /// Convenience constructor for tests and editors.
    #[must_use]
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        }
    }
}

/// Whether `now` falls inside any interval.
///
/// Matching is half-open: `start <= now < end`, so an `08:00`–`15:00`
/// interval releases the display exactly at 15:00. Intervals do not wrap
/// midnight; an entry with `start > end` never matches (known limitation,
/// kept from the source behavior).
#[must_use]
pub fn is_quiet(now: NaiveTime, intervals: &[TimeInterval]) -> bool {
    let now_minutes = now.hour() * 60 + now.minute();

    intervals.iter().any(|interval| {
        let (Some(start), Some(end)) = (interval.start.as_deref(), interval.end.as_deref()) else {
            return false;
        };
        let (Some(start), Some(end)) = (parse_minutes(start), parse_minutes(end)) else {
            return false;
        };
        start <= now_minutes && now_minutes < end
    })
}

/// `HH:MM` → minutes since midnight. `None` for anything unparseable.
fn parse_minutes(raw: &str) -> Option<u32> {
    let (hours, minutes) = raw.split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    Some(hours * 60 + minutes)
}

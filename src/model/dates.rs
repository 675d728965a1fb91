//! Pure date-window utilities: today key, offset dates, deadline countdown,
//! weekday and clock labels.
//!
//! Everything here is side-effect free except [`today`] / [`now_time`], which
//! read the local clock. All windowing and countdown math works on
//! [`NaiveDate`] values so the engine can pass synthetic dates in tests.

use std::fmt;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Fixed weekday table indexed with Sunday = 0, matching `Datelike::weekday()
/// .num_days_from_sunday()`.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

// ──────────────────── date keys ────────────────────

/// Calendar date serialized as `YYYY-MM-DD`.
///
/// The derived `Ord` is plain string comparison, which equals calendar order
/// for well-formed keys — the store compares and range-filters keys the same
/// way. Malformed keys are carried as-is; [`DateKey::date`] returns `None`
/// for them and callers must guard.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    /// Wrap a raw key without validating it.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse back to a calendar date. `None` for malformed keys.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").ok()
    }

    /// The raw `YYYY-MM-DD` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `MM-DD` suffix used in compact deadline cells, or the whole key when
    /// it is too short to split.
    #[must_use]
    pub fn month_day(&self) -> &str {
        self.0.get(5..).filter(|s| !s.is_empty()).unwrap_or(&self.0)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ──────────────────── clock access ────────────────────

/// Today's calendar date in local time.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local time of day.
#[must_use]
pub fn now_time() -> NaiveTime {
    Local::now().time()
}

// ──────────────────── windowing ────────────────────

/// The date `days` days from `base` (negative for past dates).
#[must_use]
pub fn offset(base: NaiveDate, days: i64) -> NaiveDate {
    base + Duration::days(days)
}

/// Signed whole days from `today` until `deadline`, midnight to midnight.
///
/// `0` = due today, negative = overdue. `None` for malformed keys.
#[must_use]
pub fn days_left(deadline: &DateKey, today: NaiveDate) -> Option<i64> {
    deadline.date().map(|d| (d - today).num_days())
}

/// Whether the date falls on Saturday or Sunday.
#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday().num_days_from_sunday(), 0 | 6)
}

// ──────────────────── labels ────────────────────

/// Weekday label from the fixed table.
#[must_use]
pub fn weekday_label(date: NaiveDate) -> &'static str {
    WEEKDAY_LABELS[date.weekday().num_days_from_sunday() as usize]
}

/// Header date label, e.g. `8/6`.
#[must_use]
pub fn month_day_label(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// Schedule column label, e.g. `08/06 (Wed)`.
#[must_use]
pub fn column_date_label(date: NaiveDate) -> String {
    format!(
        "{:02}/{:02} ({})",
        date.month(),
        date.day(),
        weekday_label(date)
    )
}

/// Header clock label, e.g. `09:41`.
#[must_use]
pub fn clock_label(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_key_roundtrip() {
        let key = DateKey::from(date(2024, 1, 9));
        assert_eq!(key.as_str(), "2024-01-09");
        assert_eq!(key.date(), Some(date(2024, 1, 9)));
    }

    #[test]
    fn date_key_order_is_calendar_order() {
        let a = DateKey::new("2024-01-09");
        let b = DateKey::new("2024-01-10");
        let c = DateKey::new("2024-02-01");
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn malformed_key_parses_to_none() {
        assert_eq!(DateKey::new("not-a-date").date(), None);
        assert_eq!(DateKey::new("").date(), None);
        assert_eq!(DateKey::new("2024-13-40").date(), None);
    }

    #[test]
    fn month_day_suffix() {
        assert_eq!(DateKey::new("2024-01-09").month_day(), "01-09");
        assert_eq!(DateKey::new("bad").month_day(), "bad");
    }

    #[test]
    fn days_left_countdown() {
        let deadline = DateKey::new("2024-01-01");
        assert_eq!(days_left(&deadline, date(2023, 12, 30)), Some(2));
        assert_eq!(days_left(&deadline, date(2024, 1, 1)), Some(0));
        assert_eq!(days_left(&deadline, date(2024, 1, 2)), Some(-1));
    }

    #[test]
    fn days_left_malformed_is_none() {
        assert_eq!(days_left(&DateKey::new("soon"), date(2024, 1, 1)), None);
    }

    #[test]
    fn offset_crosses_month_boundary() {
        assert_eq!(offset(date(2024, 1, 30), 3), date(2024, 2, 2));
        assert_eq!(offset(date(2024, 3, 1), -5), date(2024, 2, 25));
    }

    #[test]
    fn weekend_detection() {
        // 2024-01-06 is a Saturday, 2024-01-07 a Sunday, 2024-01-08 a Monday.
        assert!(is_weekend(date(2024, 1, 6)));
        assert!(is_weekend(date(2024, 1, 7)));
        assert!(!is_weekend(date(2024, 1, 8)));
    }

    #[test]
    fn weekday_labels_match_table() {
        assert_eq!(weekday_label(date(2024, 1, 7)), "Sun");
        assert_eq!(weekday_label(date(2024, 1, 8)), "Mon");
        assert_eq!(weekday_label(date(2024, 1, 12)), "Fri");
    }

    #[test]
    fn display_labels() {
        assert_eq!(month_day_label(date(2024, 1, 9)), "1/9");
        assert_eq!(column_date_label(date(2024, 1, 9)), "01/09 (Tue)");
        assert_eq!(
            clock_label(NaiveTime::from_hms_opt(9, 5, 0).unwrap()),
            "09:05"
        );
    }
}

//! The reconciled view model and the store document schemas it is built from.
//!
//! There is exactly one live [`ViewModel`] per process. The reconciler is its
//! only writer; every other component reads it by reference, and a cloned
//! snapshot is published for out-of-engine readers (the editing dashboard).

#![allow(missing_docs)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::dates::DateKey;
use crate::model::quiet::TimeInterval;

/// Placeholder shown before the first settings delivery.
pub const LOADING_SCHOOL_NAME: &str = "Loading…";

/// Fallback when the settings document is missing or carries no name.
pub const DEFAULT_SCHOOL_NAME: &str = "School Name";

/// Ads shown per cycle — enforced by the editing side; the rotation scheduler
/// itself tolerates any length.
pub const MAX_ADS: usize = 5;

// ──────────────────── items ────────────────────

/// One row in a day's schedule column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleItem {
    pub time: String,
    pub content: String,
    /// Editor metadata; carried through untouched, never filters projection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_start: Option<DateKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_end: Option<DateKey>,
}

/// One notice line for today.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeItem {
    pub text: String,
    pub is_highlight: bool,
}

/// One assignment row. The projected list is always sorted by `deadline`
/// ascending and windowed to `deadline >= today - 5 days`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentItem {
    pub deadline: DateKey,
    pub subject: String,
    pub task: String,
}

/// One rotating ad entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdItem {
    pub id: String,
    /// Store field `type`; currently always `"image"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub duration_sec: Option<u64>,
}

impl AdItem {
    /// Display duration in seconds; unset or zero falls back to `default`.
    #[must_use]
    pub fn duration_secs(&self, default: u64) -> u64 {
        self.duration_sec.filter(|s| *s > 0).unwrap_or(default)
    }
}

// ──────────────────── view model ────────────────────

/// The single reconciled in-memory representation of all displayable content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub school_name: String,
    pub class_name: String,
    pub date_today: DateKey,
    pub weekly_schedules: BTreeMap<DateKey, Vec<ScheduleItem>>,
    pub notices: Vec<NoticeItem>,
    pub assignments: Vec<AssignmentItem>,
    pub ads: Vec<AdItem>,
    pub quiet_hours: Vec<TimeInterval>,
}

impl ViewModel {
    /// Pre-load placeholder state for the given day.
    #[must_use]
    pub fn placeholder(today: DateKey) -> Self {
        Self {
            school_name: LOADING_SCHOOL_NAME.to_string(),
            class_name: String::new(),
            date_today: today,
            weekly_schedules: BTreeMap::new(),
            notices: Vec::new(),
            assignments: Vec::new(),
            ads: Vec::new(),
            quiet_hours: Vec::new(),
        }
    }
}

// ──────────────────── store documents ────────────────────

/// The settings document (`config/display_settings` in the store).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDoc {
    pub school_name: String,
    pub class_name: String,
    pub ads: Vec<AdItem>,
    pub quiet_hours: Vec<TimeInterval>,
}

/// One date-keyed daily document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyDoc {
    pub date: DateKey,
    pub schedules: Vec<ScheduleItem>,
    pub notices: Vec<NoticeItem>,
    pub assignments: Vec<AssignmentItem>,
}

//! Renderer: stateless projection of the view model into display sections.
//!
//! [`render`] has no side effects and no ordering dependency on the ad or
//! scroll machinery — it only produces a [`DisplayFrame`]; the engine loop
//! applies it to the surface and then kicks the downstream restarts.

use serde::{Deserialize, Serialize};

use crate::model::dates::{self, DateKey};
use crate::model::view::{AdItem, ViewModel};
use chrono::NaiveDate;

/// Weekday columns shown, starting from today and skipping weekends.
pub const SCHEDULE_COLUMNS: usize = 3;

/// Assignments stay listed until this many days past their deadline.
pub const ASSIGNMENT_WINDOW_DAYS: i64 = 5;

/// Empty-state messages — not errors, explicit content.
pub const NO_SCHEDULE: &str = "No schedule";
pub const NO_NOTICES: &str = "No notices today";
pub const NO_ASSIGNMENTS: &str = "Nothing due";
pub const AD_PLACEHOLDER: &str = "No ads configured";

/// Marker prepended to highlighted notices.
pub const HIGHLIGHT_MARKER: &str = "[Important] ";

// ──────────────────── frame sections ────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct HeaderSection {
    pub date_label: String,
    pub weekday_label: String,
    pub class_name: String,
}

/// One schedule entry projected for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ScheduleEntry {
    pub time: String,
    pub content: String,
}

/// One weekday column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ScheduleColumn {
    pub date: DateKey,
    pub label: String,
    pub is_today: bool,
    /// Empty means the column shows [`NO_SCHEDULE`].
    pub entries: Vec<ScheduleEntry>,
}

/// One projected notice line, highlight marker already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct NoticeLine {
    pub text: String,
    pub is_highlight: bool,
}

/// Deadline proximity buckets driving row styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadlineBucket {
    /// Deadline has passed.
    Overdue,
    /// Due today.
    DueToday,
    /// Due within three days.
    Urgent,
    /// Further out (or deadline unparseable).
    Normal,
}

/// One projected assignment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct AssignmentRow {
    pub deadline: DateKey,
    /// Compact `MM-DD` cell.
    pub due_label: String,
    /// Countdown text, e.g. `2 days left`.
    pub days_label: String,
    pub bucket: DeadlineBucket,
    pub subject: String,
    pub task: String,
}

/// The ad surface content: first ad, or the placeholder when none exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct AdSurface {
    pub current: Option<AdItem>,
}

/// A complete projection of the view model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct DisplayFrame {
    pub header: HeaderSection,
    pub schedule_columns: Vec<ScheduleColumn>,
    pub notices: Vec<NoticeLine>,
    pub assignments: Vec<AssignmentRow>,
    pub ad: AdSurface,
}

// ──────────────────── projection ────────────────────

/// Project the view model for the given day. Idempotent.
#[must_use]
pub fn render(view: &ViewModel, today: NaiveDate) -> DisplayFrame {
    DisplayFrame {
        header: HeaderSection {
            date_label: dates::month_day_label(today),
            weekday_label: dates::weekday_label(today).to_string(),
            class_name: view.class_name.clone(),
        },
        schedule_columns: schedule_columns(view, today),
        notices: notice_lines(view),
        assignments: assignment_rows(view, today),
        ad: AdSurface {
            current: view.ads.first().cloned(),
        },
    }
}

/// Exactly [`SCHEDULE_COLUMNS`] weekday columns starting from today,
/// advancing the day offset past Saturdays and Sundays.
fn schedule_columns(view: &ViewModel, today: NaiveDate) -> Vec<ScheduleColumn> {
    let mut columns = Vec::with_capacity(SCHEDULE_COLUMNS);
    let mut day_offset = 0_i64;

    while columns.len() < SCHEDULE_COLUMNS {
        let date = dates::offset(today, day_offset);
        if dates::is_weekend(date) {
            day_offset += 1;
            continue;
        }

        let key = DateKey::from(date);
        let entries = view
            .weekly_schedules
            .get(&key)
            .map(|items| {
                items
                    .iter()
                    .map(|item| ScheduleEntry {
                        time: item.time.clone(),
                        content: item.content.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        columns.push(ScheduleColumn {
            date: key,
            label: dates::column_date_label(date),
            is_today: day_offset == 0,
            entries,
        });
        day_offset += 1;
    }

    columns
}

fn notice_lines(view: &ViewModel) -> Vec<NoticeLine> {
    view.notices
        .iter()
        .map(|item| NoticeLine {
            text: if item.is_highlight {
                format!("{HIGHLIGHT_MARKER}{}", item.text)
            } else {
                item.text.clone()
            },
            is_highlight: item.is_highlight,
        })
        .collect()
}

/// Rows with `deadline >= today - 5 days`, in the model's deadline order.
fn assignment_rows(view: &ViewModel, today: NaiveDate) -> Vec<AssignmentRow> {
    let cutoff = DateKey::from(dates::offset(today, -ASSIGNMENT_WINDOW_DAYS));

    view.assignments
        .iter()
        .filter(|item| item.deadline >= cutoff)
        .map(|item| {
            let (bucket, days_label) = deadline_bucket(&item.deadline, today);
            AssignmentRow {
                due_label: item.deadline.month_day().to_string(),
                deadline: item.deadline.clone(),
                days_label,
                bucket,
                subject: item.subject.clone(),
                task: item.task.clone(),
            }
        })
        .collect()
}

fn deadline_bucket(deadline: &DateKey, today: NaiveDate) -> (DeadlineBucket, String) {
    match dates::days_left(deadline, today) {
        Some(0) => (DeadlineBucket::DueToday, "Due today".to_string()),
        Some(days) if days < 0 => (DeadlineBucket::Overdue, "Overdue".to_string()),
        Some(days) if days <= 3 => (DeadlineBucket::Urgent, format!("{days} days left")),
        Some(days) => (DeadlineBucket::Normal, format!("{days} days left")),
        None => (DeadlineBucket::Normal, "—".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::view::{AssignmentItem, NoticeItem, ScheduleItem};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_view(today: NaiveDate) -> ViewModel {
        ViewModel::placeholder(DateKey::from(today))
    }

    #[test]
    fn renders_three_columns_skipping_weekend() {
        // 2024-01-12 is a Friday; columns should be Fri, Mon, Tue.
        let today = date(2024, 1, 12);
        let frame = render(&base_view(today), today);

        assert_eq!(frame.schedule_columns.len(), SCHEDULE_COLUMNS);
        let keys: Vec<&str> = frame
            .schedule_columns
            .iter()
            .map(|c| c.date.as_str())
            .collect();
        assert_eq!(keys, vec!["2024-01-12", "2024-01-15", "2024-01-16"]);
        assert!(frame.schedule_columns[0].is_today);
        assert!(!frame.schedule_columns[1].is_today);
    }

    #[test]
    fn saturday_start_produces_weekday_columns_only() {
        // 2024-01-13 is a Saturday; first column must be Monday.
        let today = date(2024, 1, 13);
        let frame = render(&base_view(today), today);
        let keys: Vec<&str> = frame
            .schedule_columns
            .iter()
            .map(|c| c.date.as_str())
            .collect();
        assert_eq!(keys, vec!["2024-01-15", "2024-01-16", "2024-01-17"]);
        assert!(frame.schedule_columns.iter().all(|c| !c.is_today));
    }

    #[test]
    fn column_picks_up_schedule_entries() {
        let today = date(2024, 1, 9); // Tuesday
        let mut view = base_view(today);
        view.weekly_schedules.insert(
            DateKey::new("2024-01-09"),
            vec![ScheduleItem {
                time: "1st".to_string(),
                content: "Math".to_string(),
                ..Default::default()
            }],
        );

        let frame = render(&view, today);
        assert_eq!(frame.schedule_columns[0].entries.len(), 1);
        assert_eq!(frame.schedule_columns[0].entries[0].content, "Math");
        assert!(frame.schedule_columns[1].entries.is_empty());
    }

    #[test]
    fn highlight_notices_get_marker() {
        let today = date(2024, 1, 9);
        let mut view = base_view(today);
        view.notices = vec![
            NoticeItem {
                text: "Gym clothes".to_string(),
                is_highlight: true,
            },
            NoticeItem {
                text: "Library day".to_string(),
                is_highlight: false,
            },
        ];

        let frame = render(&view, today);
        assert!(frame.notices[0].text.starts_with(HIGHLIGHT_MARKER));
        assert_eq!(frame.notices[1].text, "Library day");
    }

    #[test]
    fn assignments_are_windowed_and_bucketed() {
        let today = date(2024, 1, 10);
        let mut view = base_view(today);
        view.assignments = vec![
            AssignmentItem {
                deadline: DateKey::new("2024-01-01"), // 9 days past — outside window
                subject: "Old".to_string(),
                task: "gone".to_string(),
            },
            AssignmentItem {
                deadline: DateKey::new("2024-01-08"), // overdue, inside window
                subject: "Sci".to_string(),
                task: "report".to_string(),
            },
            AssignmentItem {
                deadline: DateKey::new("2024-01-10"),
                subject: "Eng".to_string(),
                task: "essay".to_string(),
            },
            AssignmentItem {
                deadline: DateKey::new("2024-01-12"),
                subject: "Math".to_string(),
                task: "drill".to_string(),
            },
            AssignmentItem {
                deadline: DateKey::new("2024-01-20"),
                subject: "Art".to_string(),
                task: "sketch".to_string(),
            },
        ];

        let frame = render(&view, today);
        let buckets: Vec<DeadlineBucket> = frame.assignments.iter().map(|r| r.bucket).collect();
        assert_eq!(
            buckets,
            vec![
                DeadlineBucket::Overdue,
                DeadlineBucket::DueToday,
                DeadlineBucket::Urgent,
                DeadlineBucket::Normal,
            ]
        );
        assert_eq!(frame.assignments[0].days_label, "Overdue");
        assert_eq!(frame.assignments[1].days_label, "Due today");
        assert_eq!(frame.assignments[2].days_label, "2 days left");
        assert_eq!(frame.assignments[3].due_label, "01-20");
    }

    #[test]
    fn malformed_deadline_renders_normal_bucket() {
        let today = date(2024, 1, 10);
        let mut view = base_view(today);
        view.assignments = vec![AssignmentItem {
            deadline: DateKey::new("sometime"),
            subject: "???".to_string(),
            task: "???".to_string(),
        }];

        let frame = render(&view, today);
        assert_eq!(frame.assignments.len(), 1);
        assert_eq!(frame.assignments[0].bucket, DeadlineBucket::Normal);
        assert_eq!(frame.assignments[0].days_label, "—");
    }

    #[test]
    fn ad_surface_carries_first_ad_or_none() {
        let today = date(2024, 1, 9);
        let mut view = base_view(today);
        assert!(render(&view, today).ad.current.is_none());

        view.ads = vec![
            AdItem {
                id: "ad_1".to_string(),
                url: "ads/a.png".to_string(),
                ..Default::default()
            },
            AdItem {
                id: "ad_2".to_string(),
                url: "ads/b.png".to_string(),
                ..Default::default()
            },
        ];
        let frame = render(&view, today);
        assert_eq!(frame.ad.current.as_ref().unwrap().id, "ad_1");
    }

    #[test]
    fn render_is_idempotent() {
        let today = date(2024, 1, 9);
        let view = base_view(today);
        assert_eq!(render(&view, today), render(&view, today));
    }
}

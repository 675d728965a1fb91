//! View-model reconciler: merges the settings feed and the daily-data feed
//! into the single shared view model.
//!
//! Each delivery is applied in full before any downstream effect fires, so
//! side-effect components never observe a partially-updated model. The
//! reconciler also owns the initial-load lifecycle: side effects stay
//! suppressed until both feeds have delivered once and a settle delay has
//! passed.
//!
//! Deliveries are deliberately not deduplicated — a byte-identical snapshot
//! still reports `changed` and triggers the full downstream pass. Restart
//! frequency is observable behavior (scrollers, ad cycle); see DESIGN.md.

use crate::feed::{DailyDelivery, SettingsDelivery};
use crate::model::dates::DateKey;
use crate::model::view::{DEFAULT_SCHOOL_NAME, ViewModel};

/// Per-feed load progress. Transitions exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedLoadState {
    Loading,
    Loaded,
}

/// What the engine must do after a delivery was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Content was updated: re-render and run the downstream pass.
    pub changed: bool,
    /// Initial load was still active when the delivery arrived: banner and
    /// tone stay suppressed (the render itself is not).
    pub suppress_effects: bool,
    /// Settings content changed: restart the ad rotation from index zero.
    pub restart_ads: bool,
    /// Both feeds have now delivered at least once while initial load is
    /// active: (re)schedule the settle timer.
    pub schedule_settle: bool,
}

/// The single writer of the shared [`ViewModel`].
#[derive(Debug)]
pub struct Reconciler {
    view: ViewModel,
    settings_state: FeedLoadState,
    daily_state: FeedLoadState,
    initial_load: bool,
}

impl Reconciler {
    /// Start with placeholder content for the given day.
    ///
    /// `today` is captured once per session; the daily windowing rules use
    /// it, matching the subscription's own fixed range start.
    #[must_use]
    pub fn new(today: DateKey) -> Self {
        Self {
            view: ViewModel::placeholder(today),
            settings_state: FeedLoadState::Loading,
            daily_state: FeedLoadState::Loading,
            initial_load: true,
        }
    }

    /// Read-only view of the current model.
    #[must_use]
    pub const fn view(&self) -> &ViewModel {
        &self.view
    }

    /// Whether the startup suppression phase is still active.
    #[must_use]
    pub const fn initial_load(&self) -> bool {
        self.initial_load
    }

    #[must_use]
    pub const fn settings_state(&self) -> FeedLoadState {
        self.settings_state
    }

    #[must_use]
    pub const fn daily_state(&self) -> FeedLoadState {
        self.daily_state
    }

    /// Apply a settings feed delivery.
    ///
    /// Snapshots overwrite name/class/ads/quiet-hours atomically; an absent
    /// document resets them to defaults. Errors retain previous content.
    /// Every delivery kind — snapshot, absent, or error — advances the feed
    /// to `Loaded`.
    pub fn apply_settings(&mut self, delivery: SettingsDelivery) -> ReconcileOutcome {
        let suppress = self.initial_load;
        let changed = match delivery {
            SettingsDelivery::Snapshot(doc) => {
                self.view.school_name = if doc.school_name.is_empty() {
                    DEFAULT_SCHOOL_NAME.to_string()
                } else {
                    doc.school_name
                };
                self.view.class_name = doc.class_name;
                self.view.ads = doc.ads;
                self.view.quiet_hours = doc.quiet_hours;
                true
            }
            SettingsDelivery::Absent => {
                self.view.school_name = DEFAULT_SCHOOL_NAME.to_string();
                self.view.class_name.clear();
                self.view.ads.clear();
                self.view.quiet_hours.clear();
                true
            }
            SettingsDelivery::Failed(_) => false,
        };
        self.settings_state = FeedLoadState::Loaded;

        ReconcileOutcome {
            changed,
            suppress_effects: suppress,
            restart_ads: changed,
            schedule_settle: self.settle_due(),
        }
    }

    /// Apply a daily-data feed delivery.
    ///
    /// A snapshot fully rebuilds schedules/notices/assignments from the
    /// delivered set — never an incremental patch. Errors retain previous
    /// content. Both advance the feed to `Loaded`.
    pub fn apply_daily(&mut self, delivery: DailyDelivery) -> ReconcileOutcome {
        let suppress = self.initial_load;
        let changed = match delivery {
            DailyDelivery::Snapshot(docs) => {
                let today = self.view.date_today.clone();
                self.view.weekly_schedules.clear();
                self.view.notices.clear();
                self.view.assignments.clear();

                for doc in docs {
                    // Schedules: today onward only.
                    if doc.date >= today && !doc.schedules.is_empty() {
                        self.view.weekly_schedules.insert(doc.date.clone(), doc.schedules);
                    }
                    // Notices: today's document only (at most one is today).
                    if doc.date == today {
                        self.view.notices = doc.notices;
                    }
                    // Assignments: collected from every date; the renderer
                    // windows them.
                    self.view.assignments.extend(doc.assignments);
                }

                // Calendar-date order; the stable sort keeps delivery order
                // within one deadline.
                self.view.assignments.sort_by(|a, b| a.deadline.cmp(&b.deadline));
                true
            }
            DailyDelivery::Failed(_) => false,
        };
        self.daily_state = FeedLoadState::Loaded;

        ReconcileOutcome {
            changed,
            suppress_effects: suppress,
            restart_ads: false,
            schedule_settle: self.settle_due(),
        }
    }

    /// The settle timer elapsed. Returns true on the one real transition.
    pub fn settle_elapsed(&mut self) -> bool {
        if self.initial_load {
            self.initial_load = false;
            true
        } else {
            false
        }
    }

    /// Whether the settle timer should be (re)scheduled after a delivery.
    ///
    /// True on every delivery once both feeds are loaded while initial load
    /// is still active: bursts inside the settle window push the flip out
    /// instead of stacking timers.
    fn settle_due(&self) -> bool {
        self.initial_load
            && self.settings_state == FeedLoadState::Loaded
            && self.daily_state == FeedLoadState::Loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::view::{
        AdItem, AssignmentItem, DailyDoc, LOADING_SCHOOL_NAME, NoticeItem, ScheduleItem,
        SettingsDoc,
    };

    fn key(raw: &str) -> DateKey {
        DateKey::new(raw)
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(key("2024-01-09"))
    }

    fn settings_snapshot(name: &str) -> SettingsDelivery {
        SettingsDelivery::Snapshot(Box::new(SettingsDoc {
            school_name: name.to_string(),
            class_name: "1-A".to_string(),
            ads: vec![AdItem {
                id: "ad_1".to_string(),
                ..Default::default()
            }],
            quiet_hours: Vec::new(),
        }))
    }

    fn daily_doc(date: &str) -> DailyDoc {
        DailyDoc {
            date: key(date),
            ..Default::default()
        }
    }

    #[test]
    fn settings_snapshot_overwrites_atomically() {
        let mut r = reconciler();
        let outcome = r.apply_settings(settings_snapshot("GN Tech"));
        assert!(outcome.changed);
        assert!(outcome.restart_ads);
        assert_eq!(r.view().school_name, "GN Tech");
        assert_eq!(r.view().class_name, "1-A");
        assert_eq!(r.view().ads.len(), 1);
    }

    #[test]
    fn empty_school_name_falls_back() {
        let mut r = reconciler();
        r.apply_settings(settings_snapshot(""));
        assert_eq!(r.view().school_name, DEFAULT_SCHOOL_NAME);
    }

    #[test]
    fn absent_settings_resets_to_defaults() {
        let mut r = reconciler();
        r.apply_settings(settings_snapshot("GN Tech"));
        let outcome = r.apply_settings(SettingsDelivery::Absent);
        assert!(outcome.changed);
        assert!(outcome.restart_ads);
        assert_eq!(r.view().school_name, DEFAULT_SCHOOL_NAME);
        assert!(r.view().class_name.is_empty());
        assert!(r.view().ads.is_empty());
    }

    #[test]
    fn failed_settings_retains_previous_content() {
        let mut r = reconciler();
        r.apply_settings(settings_snapshot("GN Tech"));
        let outcome = r.apply_settings(SettingsDelivery::Failed("boom".to_string()));
        assert!(!outcome.changed);
        assert!(!outcome.restart_ads);
        assert_eq!(r.view().school_name, "GN Tech");
        assert_eq!(r.settings_state(), FeedLoadState::Loaded);
    }

    #[test]
    fn daily_rebuild_windows_schedules_and_notices() {
        let mut r = reconciler();

        let mut yesterday = daily_doc("2024-01-08");
        yesterday.schedules = vec![ScheduleItem::default()];
        yesterday.notices = vec![NoticeItem {
            text: "old".to_string(),
            is_highlight: false,
        }];

        let mut today = daily_doc("2024-01-09");
        today.schedules = vec![ScheduleItem {
            time: "1st".to_string(),
            content: "Math".to_string(),
            ..Default::default()
        }];
        today.notices = vec![NoticeItem {
            text: "today".to_string(),
            is_highlight: false,
        }];

        let mut tomorrow = daily_doc("2024-01-10");
        tomorrow.schedules = vec![ScheduleItem::default()];

        let outcome =
            r.apply_daily(DailyDelivery::Snapshot(vec![yesterday, today, tomorrow]));
        assert!(outcome.changed);
        assert!(!outcome.restart_ads);

        // Schedules: today onward only; yesterday's dropped.
        assert!(!r.view().weekly_schedules.contains_key(&key("2024-01-08")));
        assert!(r.view().weekly_schedules.contains_key(&key("2024-01-09")));
        assert!(r.view().weekly_schedules.contains_key(&key("2024-01-10")));

        // Notices: today's document only.
        assert_eq!(r.view().notices.len(), 1);
        assert_eq!(r.view().notices[0].text, "today");
    }

    #[test]
    fn daily_rebuild_collects_and_sorts_assignments() {
        let mut r = reconciler();

        let mut past = daily_doc("2024-01-05");
        past.assignments = vec![AssignmentItem {
            deadline: key("2024-01-20"),
            subject: "Art".to_string(),
            task: "sketch".to_string(),
        }];
        let mut today = daily_doc("2024-01-09");
        today.assignments = vec![
            AssignmentItem {
                deadline: key("2024-01-10"),
                subject: "Eng".to_string(),
                task: "essay".to_string(),
            },
            AssignmentItem {
                deadline: key("2024-01-06"),
                subject: "Sci".to_string(),
                task: "report".to_string(),
            },
        ];

        r.apply_daily(DailyDelivery::Snapshot(vec![past, today]));
        let deadlines: Vec<&str> = r
            .view()
            .assignments
            .iter()
            .map(|a| a.deadline.as_str())
            .collect();
        assert_eq!(deadlines, vec!["2024-01-06", "2024-01-10", "2024-01-20"]);
    }

    #[test]
    fn daily_rebuild_is_full_replacement() {
        let mut r = reconciler();
        let mut first = daily_doc("2024-01-09");
        first.assignments = vec![AssignmentItem {
            deadline: key("2024-01-10"),
            ..Default::default()
        }];
        r.apply_daily(DailyDelivery::Snapshot(vec![first]));
        assert_eq!(r.view().assignments.len(), 1);

        // Second delivery without assignments wipes the previous ones.
        r.apply_daily(DailyDelivery::Snapshot(vec![daily_doc("2024-01-09")]));
        assert!(r.view().assignments.is_empty());
    }

    #[test]
    fn failed_daily_retains_previous_content() {
        let mut r = reconciler();
        let mut doc = daily_doc("2024-01-09");
        doc.notices = vec![NoticeItem {
            text: "keep me".to_string(),
            is_highlight: false,
        }];
        r.apply_daily(DailyDelivery::Snapshot(vec![doc]));

        let outcome = r.apply_daily(DailyDelivery::Failed("offline".to_string()));
        assert!(!outcome.changed);
        assert_eq!(r.view().notices[0].text, "keep me");
        assert_eq!(r.daily_state(), FeedLoadState::Loaded);
    }

    #[test]
    fn initial_load_lifecycle() {
        let mut r = reconciler();
        assert!(r.initial_load());

        let first = r.apply_settings(settings_snapshot("GN Tech"));
        assert!(first.suppress_effects);
        assert!(!first.schedule_settle); // only one feed loaded

        let second = r.apply_daily(DailyDelivery::Snapshot(vec![]));
        assert!(second.suppress_effects);
        assert!(second.schedule_settle);

        // A burst delivery inside the settle window reschedules.
        let burst = r.apply_settings(settings_snapshot("GN Tech"));
        assert!(burst.suppress_effects);
        assert!(burst.schedule_settle);

        assert!(r.settle_elapsed());
        assert!(!r.initial_load());
        // The transition happens exactly once.
        assert!(!r.settle_elapsed());

        let later = r.apply_settings(settings_snapshot("GN Tech"));
        assert!(!later.suppress_effects);
        assert!(!later.schedule_settle);
    }

    #[test]
    fn errors_count_toward_initial_load() {
        let mut r = reconciler();
        r.apply_settings(SettingsDelivery::Failed("x".to_string()));
        let outcome = r.apply_daily(DailyDelivery::Failed("y".to_string()));
        assert!(outcome.schedule_settle);
        assert!(r.initial_load()); // still true until the settle timer fires
        assert!(r.settle_elapsed());
    }

    #[test]
    fn placeholder_view_before_any_delivery() {
        let r = reconciler();
        assert_eq!(r.view().school_name, LOADING_SCHOOL_NAME);
        assert_eq!(r.settings_state(), FeedLoadState::Loading);
        assert_eq!(r.daily_state(), FeedLoadState::Loading);
    }
}

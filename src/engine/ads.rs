//! Ad rotation scheduler: cycles the ad list with per-item durations, gated
//! by quiet hours.
//!
//! The scheduler owns `current_index` and at most one pending timer. A quiet
//! tick blanks the surface and re-checks later without advancing the index,
//! so the rotation resumes where it left off when class ends. Any settings
//! change restarts the cycle from index zero — the engine cancels the pending
//! timer first, so no two cycles ever overlap.

use std::time::Duration;

use crate::core::config::TimingConfig;
use crate::engine::timers::TaskId;
use crate::model::view::AdItem;

/// What a display tick decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdTick {
    /// No ads: stay idle with no timer.
    Idle,
    /// Quiet hours: blank the surface, re-check later, index unchanged.
    Quiet { recheck_after: Duration },
    /// Show `ads[index]` and tick again after its duration.
    Show { index: usize, next_after: Duration },
}

/// Rotation state: the next index to show plus the pending tick handle.
#[derive(Debug, Default)]
pub struct AdRotation {
    current_index: usize,
    timer: Option<TaskId>,
}

impl AdRotation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending tick handle, if any. The engine owns scheduling; this just
    /// records the handle so restarts can cancel it.
    #[must_use]
    pub const fn timer(&self) -> Option<TaskId> {
        self.timer
    }

    pub fn set_timer(&mut self, id: Option<TaskId>) {
        self.timer = id;
    }

    /// Restart the cycle from the first ad.
    pub fn reset(&mut self) {
        self.current_index = 0;
    }

    /// Decide the next display action and advance the index when showing.
    pub fn tick(&mut self, ads: &[AdItem], quiet: bool, timing: &TimingConfig) -> AdTick {
        if quiet {
            return AdTick::Quiet {
                recheck_after: timing.ad_quiet_poll(),
            };
        }
        if ads.is_empty() {
            return AdTick::Idle;
        }

        // Index can point past the end if the list shrank since the last
        // settings restart; wrap instead of panicking.
        let index = self.current_index % ads.len();
        self.current_index = (index + 1) % ads.len();

        AdTick::Show {
            index,
            next_after: Duration::from_secs(
                ads[index].duration_secs(timing.ad_default_duration_secs),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(id: &str, duration_sec: Option<u64>) -> AdItem {
        AdItem {
            id: id.to_string(),
            kind: "image".to_string(),
            url: format!("ads/{id}.png"),
            duration_sec,
        }
    }

    fn timing() -> TimingConfig {
        TimingConfig::default()
    }

    #[test]
    fn empty_list_is_idle() {
        let mut rotation = AdRotation::new();
        assert_eq!(rotation.tick(&[], false, &timing()), AdTick::Idle);
    }

    #[test]
    fn cycles_indices_with_per_ad_dwell() {
        let ads = vec![ad("a", Some(5)), ad("b", Some(10))];
        let mut rotation = AdRotation::new();

        let expected = [
            (0, Duration::from_secs(5)),
            (1, Duration::from_secs(10)),
            (0, Duration::from_secs(5)),
            (1, Duration::from_secs(10)),
        ];
        for (index, next_after) in expected {
            assert_eq!(
                rotation.tick(&ads, false, &timing()),
                AdTick::Show { index, next_after }
            );
        }
    }

    #[test]
    fn unset_duration_falls_back_to_default() {
        let ads = vec![ad("a", None)];
        let mut rotation = AdRotation::new();
        assert_eq!(
            rotation.tick(&ads, false, &timing()),
            AdTick::Show {
                index: 0,
                next_after: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn quiet_tick_does_not_advance_index() {
        let ads = vec![ad("a", Some(5)), ad("b", Some(5))];
        let mut rotation = AdRotation::new();

        assert!(matches!(
            rotation.tick(&ads, false, &timing()),
            AdTick::Show { index: 0, .. }
        ));
        // Two quiet polls in a row: index frozen at 1.
        for _ in 0..2 {
            assert_eq!(
                rotation.tick(&ads, true, &timing()),
                AdTick::Quiet {
                    recheck_after: Duration::from_secs(60),
                }
            );
        }
        assert!(matches!(
            rotation.tick(&ads, false, &timing()),
            AdTick::Show { index: 1, .. }
        ));
    }

    #[test]
    fn reset_restarts_from_zero() {
        let ads = vec![ad("a", Some(5)), ad("b", Some(5))];
        let mut rotation = AdRotation::new();
        rotation.tick(&ads, false, &timing());
        rotation.reset();
        assert!(matches!(
            rotation.tick(&ads, false, &timing()),
            AdTick::Show { index: 0, .. }
        ));
    }

    #[test]
    fn shrunk_list_wraps_instead_of_panicking() {
        let mut rotation = AdRotation::new();
        let three = vec![ad("a", Some(5)), ad("b", Some(5)), ad("c", Some(5))];
        rotation.tick(&three, false, &timing());
        rotation.tick(&three, false, &timing()); // next index = 2

        let one = vec![ad("a", Some(5))];
        assert!(matches!(
            rotation.tick(&one, false, &timing()),
            AdTick::Show { index: 0, .. }
        ));
    }
}

//! Auto-scroll engine: one independent scroller state machine per scrollable
//! panel.
//!
//! Each scroller waits a start delay, measures overflow, then ping-pongs the
//! panel between its edges — downward at base speed, upward at 1.5×, with a
//! dwell at each edge. Panels without overflow re-measure on a slow poll
//! instead of animating. User interaction pauses the scroller immediately and
//! resumes it a cooldown after the *last* interaction; a new interaction
//! resets the cooldown rather than stacking timers.
//!
//! Scrollers never outlive their panel: a global restart after every render
//! pass destroys the registry (cancelling every pending task) and rebuilds it
//! against the freshly rendered panels.

use std::collections::HashMap;
use std::time::Instant;

use crate::core::config::TimingConfig;
use crate::engine::TimerTask;
use crate::engine::timers::{TaskId, TimerQueue};
use crate::surface::{DisplaySurface, PanelId};

/// Timer task kinds owned by one scroller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTask {
    /// Initial delay after creation before the first measurement.
    Start,
    /// Slow re-measure while the panel has no overflow.
    Recheck,
    /// One animation frame.
    Frame,
    /// Dwell at an edge before resuming in the flipped direction.
    Dwell,
    /// End of the user-interaction cooldown.
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollDirection {
    Down,
    Up,
}

impl ScrollDirection {
    const fn sign(self) -> f64 {
        match self {
            Self::Down => 1.0,
            Self::Up => -1.0,
        }
    }
}

/// Per-panel state machine.
#[derive(Debug)]
struct Scroller {
    direction: ScrollDirection,
    user_paused: bool,
    last_frame: Option<Instant>,
    /// The single pending motion task (Start/Recheck/Frame/Dwell).
    motion_timer: Option<TaskId>,
    /// The pending cooldown task, separate so motion cancellation cannot
    /// swallow a resume.
    resume_timer: Option<TaskId>,
}

impl Scroller {
    const fn new() -> Self {
        Self {
            direction: ScrollDirection::Down,
            user_paused: false,
            last_frame: None,
            motion_timer: None,
            resume_timer: None,
        }
    }

    fn cancel_all(&mut self, timers: &mut TimerQueue<TimerTask>) {
        if let Some(id) = self.motion_timer.take() {
            timers.cancel(id);
        }
        if let Some(id) = self.resume_timer.take() {
            timers.cancel(id);
        }
    }
}

/// Registry of live scrollers, keyed by panel.
#[derive(Debug, Default)]
pub struct ScrollEngine {
    scrollers: HashMap<PanelId, Scroller>,
}

impl ScrollEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live scrollers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scrollers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scrollers.is_empty()
    }

    /// Destroy every scroller and recreate one per panel, each with a fresh
    /// start delay.
    pub fn restart(
        &mut self,
        panels: &[PanelId],
        timers: &mut TimerQueue<TimerTask>,
        timing: &TimingConfig,
        now: Instant,
    ) {
        self.destroy_all(timers);
        for &panel in panels {
            let mut scroller = Scroller::new();
            scroller.motion_timer = Some(timers.schedule(
                now,
                timing.scroll_start_delay(),
                TimerTask::Scroll(panel, ScrollTask::Start),
            ));
            self.scrollers.insert(panel, scroller);
        }
    }

    /// Cancel all pending tasks and drop every scroller.
    pub fn destroy_all(&mut self, timers: &mut TimerQueue<TimerTask>) {
        for (_, mut scroller) in self.scrollers.drain() {
            scroller.cancel_all(timers);
        }
    }

    /// User interaction on a panel: pause immediately, restart the cooldown.
    pub fn on_interaction(
        &mut self,
        panel: PanelId,
        timers: &mut TimerQueue<TimerTask>,
        timing: &TimingConfig,
        now: Instant,
    ) {
        let Some(scroller) = self.scrollers.get_mut(&panel) else {
            return;
        };
        scroller.user_paused = true;
        if let Some(id) = scroller.motion_timer.take() {
            timers.cancel(id);
        }
        if let Some(id) = scroller.resume_timer.take() {
            timers.cancel(id);
        }
        scroller.resume_timer = Some(timers.schedule(
            now,
            timing.scroll_cooldown(),
            TimerTask::Scroll(panel, ScrollTask::Resume),
        ));
    }

    /// Dispatch a fired scroll task for `panel`.
    ///
    /// Stale tasks for destroyed panels are ignored (restart cancels them,
    /// but a task already popped in the same loop turn can still arrive).
    pub fn on_task(
        &mut self,
        panel: PanelId,
        task: ScrollTask,
        surface: &mut dyn DisplaySurface,
        timers: &mut TimerQueue<TimerTask>,
        timing: &TimingConfig,
        now: Instant,
    ) {
        let Some(scroller) = self.scrollers.get_mut(&panel) else {
            return;
        };

        match task {
            ScrollTask::Start | ScrollTask::Recheck | ScrollTask::Dwell => {
                scroller.motion_timer = None;
                Self::check_and_scroll(scroller, panel, surface, timers, timing, now);
            }
            ScrollTask::Frame => {
                scroller.motion_timer = None;
                Self::step(scroller, panel, surface, timers, timing, now);
            }
            ScrollTask::Resume => {
                scroller.resume_timer = None;
                scroller.user_paused = false;
                Self::check_and_scroll(scroller, panel, surface, timers, timing, now);
            }
        }
    }

    /// Measure overflow and either begin animating or fall back to the slow
    /// re-measure poll. Never touches the scroll offset.
    fn check_and_scroll(
        scroller: &mut Scroller,
        panel: PanelId,
        surface: &dyn DisplaySurface,
        timers: &mut TimerQueue<TimerTask>,
        timing: &TimingConfig,
        now: Instant,
    ) {
        if scroller.user_paused {
            return;
        }

        let overflow = surface.metrics(panel).map_or(0.0, |m| m.overflow());
        if overflow <= timing.scroll_min_overflow_px {
            scroller.motion_timer = Some(timers.schedule(
                now,
                timing.scroll_recheck(),
                TimerTask::Scroll(panel, ScrollTask::Recheck),
            ));
            return;
        }

        scroller.last_frame = Some(now);
        scroller.motion_timer = Some(timers.schedule(
            now,
            timing.frame_interval(),
            TimerTask::Scroll(panel, ScrollTask::Frame),
        ));
    }

    /// One animation frame: advance the offset, clamp and flip at edges.
    fn step(
        scroller: &mut Scroller,
        panel: PanelId,
        surface: &mut dyn DisplaySurface,
        timers: &mut TimerQueue<TimerTask>,
        timing: &TimingConfig,
        now: Instant,
    ) {
        if scroller.user_paused {
            return;
        }

        let Some(metrics) = surface.metrics(panel) else {
            scroller.motion_timer = Some(timers.schedule(
                now,
                timing.scroll_recheck(),
                TimerTask::Scroll(panel, ScrollTask::Recheck),
            ));
            return;
        };
        let overflow = metrics.overflow();
        if overflow <= timing.scroll_min_overflow_px {
            scroller.motion_timer = Some(timers.schedule(
                now,
                timing.scroll_recheck(),
                TimerTask::Scroll(panel, ScrollTask::Recheck),
            ));
            return;
        }

        let dt = scroller
            .last_frame
            .map_or(0.0, |t| now.saturating_duration_since(t).as_secs_f64());
        scroller.last_frame = Some(now);

        // The reverse (upward) leg runs faster so fresh content returns to
        // the top quickly.
        let speed = match scroller.direction {
            ScrollDirection::Down => timing.scroll_speed_px_per_sec,
            ScrollDirection::Up => timing.scroll_speed_px_per_sec * timing.scroll_reverse_factor,
        };
        let next = surface.scroll_top(panel) + speed * dt * scroller.direction.sign();

        let at_bottom = scroller.direction == ScrollDirection::Down && next >= overflow;
        let at_top = scroller.direction == ScrollDirection::Up && next <= 0.0;

        if at_bottom || at_top {
            surface.set_scroll_top(panel, if at_bottom { overflow } else { 0.0 });
            scroller.direction = if at_bottom {
                ScrollDirection::Up
            } else {
                ScrollDirection::Down
            };
            scroller.motion_timer = Some(timers.schedule(
                now,
                timing.scroll_dwell(),
                TimerTask::Scroll(panel, ScrollTask::Dwell),
            ));
        } else {
            surface.set_scroll_top(panel, next);
            scroller.motion_timer = Some(timers.schedule(
                now,
                timing.frame_interval(),
                TimerTask::Scroll(panel, ScrollTask::Frame),
            ));
        }
    }
}

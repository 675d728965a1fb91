//! The signage engine: a single-threaded event loop reconciling realtime
//! feeds into the view model and driving the presentation machinery.
//!
//! Architecture: one engine thread owns every piece of mutable state (view
//! model, load flags, timer queue, scroller registry, ad rotation, banner
//! timer). Feed adapters and the embedding process communicate exclusively
//! through a bounded [`EngineEvent`] channel; the loop body is
//! `recv_deadline(next timer)`, so the only suspension points are the channel
//! wait and timer expiry. A delivery is always applied in full — load-state
//! flip included — before any derived side effect runs.
//!
//! Downstream ordering per content delivery: publish snapshot → render →
//! apply frame → ad restart (settings only) → banner/tone → scroller
//! restart. The renderer never depends on the ad or scroll machinery.

pub mod ads;
pub mod notify;
pub mod reconciler;
pub mod render;
pub mod scroll;
pub mod timers;

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::RwLock;

use crate::core::config::SignageConfig;
use crate::core::errors::Result;
use crate::engine::ads::{AdRotation, AdTick};
use crate::engine::notify::{GestureOutcome, Notifier, ToneOutcome};
use crate::engine::reconciler::{ReconcileOutcome, Reconciler};
use crate::engine::scroll::{ScrollEngine, ScrollTask};
use crate::engine::timers::{TaskId, TimerQueue};
use crate::feed::{DAILY_FEED, DailyDelivery, RealtimeStore, SETTINGS_FEED, SettingsDelivery};
use crate::logger::{ActivityEvent, ActivityLoggerHandle};
use crate::model::dates::{self, DateKey};
use crate::model::quiet;
use crate::model::view::ViewModel;
use crate::surface::{AudioSink, DisplaySurface, PanelId};

/// Bounded capacity of the engine event channel. Feed threads block briefly
/// when the engine is mid-pass; interaction bursts beyond this are absorbed
/// by the senders.
const EVENT_CHANNEL_CAP: usize = 64;

// ──────────────────── events and timers ────────────────────

/// Everything that can wake the engine loop.
#[derive(Debug)]
pub enum EngineEvent {
    /// Settings feed delivery.
    Settings(SettingsDelivery),
    /// Daily-data feed delivery.
    Daily(DailyDelivery),
    /// User interaction (pointer-down, touch-start, wheel) on a panel.
    Interaction(PanelId),
    /// User gesture that may unlock audio.
    Gesture,
    /// Viewport geometry changed; scrollers rebuild after a debounce.
    Resized,
    /// External edit committed: re-render and restart ads + scrollers.
    ForceRefresh,
    /// Stop the loop.
    Shutdown,
}

/// Scheduled task kinds owned by the engine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Initial-load settle delay elapsed.
    SettleInitialLoad,
    /// Update banner auto-hide.
    BannerHide,
    /// Next ad rotation tick.
    AdTick,
    /// Header clock refresh.
    ClockTick,
    /// Resize debounce elapsed.
    ResizeSettle,
    /// A scroller task for one panel.
    Scroll(PanelId, ScrollTask),
}

// ──────────────────── handle ────────────────────

/// Cloneable handle for the embedding layer: event injection plus read
/// access to the published view-model snapshot.
#[derive(Clone)]
pub struct EngineHandle {
    events: Sender<EngineEvent>,
    snapshot: Arc<RwLock<ViewModel>>,
}

impl EngineHandle {
    /// Clone of the latest published view model.
    #[must_use]
    pub fn view(&self) -> ViewModel {
        self.snapshot.read().clone()
    }

    /// Report a user interaction on a panel. Returns false once the engine
    /// is gone.
    pub fn interaction(&self, panel: PanelId) -> bool {
        self.send(EngineEvent::Interaction(panel))
    }

    /// Report a user gesture (audio unlock opportunity).
    pub fn gesture(&self) -> bool {
        self.send(EngineEvent::Gesture)
    }

    /// Report a viewport resize.
    pub fn resized(&self) -> bool {
        self.send(EngineEvent::Resized)
    }

    /// Force a render + ad + scroller restart after an external edit.
    pub fn force_refresh(&self) -> bool {
        self.send(EngineEvent::ForceRefresh)
    }

    /// Request loop shutdown.
    pub fn shutdown(&self) -> bool {
        self.send(EngineEvent::Shutdown)
    }

    fn send(&self, event: EngineEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

// ──────────────────── engine ────────────────────

/// The presentation engine. Construct, grab a [`EngineHandle`], then `run`.
pub struct SignageEngine {
    config: SignageConfig,
    surface: Box<dyn DisplaySurface>,
    audio: Box<dyn AudioSink>,
    logger: ActivityLoggerHandle,
    events_tx: Sender<EngineEvent>,
    events_rx: Receiver<EngineEvent>,
    snapshot: Arc<RwLock<ViewModel>>,
    timers: TimerQueue<TimerTask>,
    reconciler: Reconciler,
    ads: AdRotation,
    scroll: ScrollEngine,
    notifier: Notifier,
    settle_timer: Option<TaskId>,
    resize_timer: Option<TaskId>,
    start_time: Instant,
}

impl SignageEngine {
    /// Build an engine against injected surface and audio implementations.
    #[must_use]
    pub fn new(
        config: SignageConfig,
        surface: Box<dyn DisplaySurface>,
        audio: Box<dyn AudioSink>,
        logger: ActivityLoggerHandle,
    ) -> Self {
        let (events_tx, events_rx) = bounded(EVENT_CHANNEL_CAP);
        let today = DateKey::from(dates::today());
        let reconciler = Reconciler::new(today);
        let snapshot = Arc::new(RwLock::new(reconciler.view().clone()));

        Self {
            config,
            surface,
            audio,
            logger,
            events_tx,
            events_rx,
            snapshot,
            timers: TimerQueue::new(),
            reconciler,
            ads: AdRotation::new(),
            scroll: ScrollEngine::new(),
            notifier: Notifier::new(),
            settle_timer: None,
            resize_timer: None,
            start_time: Instant::now(),
        }
    }

    /// Handle for feed-independent event injection and snapshot reads.
    #[must_use]
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            events: self.events_tx.clone(),
            snapshot: Arc::clone(&self.snapshot),
        }
    }

    /// Subscribe to both feeds and run the loop until shutdown.
    pub fn run(&mut self, store: &dyn RealtimeStore) -> Result<()> {
        self.start_time = Instant::now();
        let config_hash = self.config.stable_hash().unwrap_or_default();
        self.logger.send(ActivityEvent::DisplayStarted {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config_hash,
        });

        // Initial placeholder frame + clock before any data arrives.
        let now = Instant::now();
        self.surface
            .set_clock(&dates::clock_label(dates::now_time()));
        self.timers
            .schedule(now, self.config.timing.clock_tick(), TimerTask::ClockTick);
        let frame = render::render(self.reconciler.view(), dates::today());
        self.surface.apply_frame(&frame);

        // Daily range start matches the assignment display window.
        let range_start =
            DateKey::from(dates::offset(dates::today(), -render::ASSIGNMENT_WINDOW_DAYS));
        let _settings_sub = store.subscribe_settings(self.events_tx.clone())?;
        let _daily_sub = store.subscribe_daily(range_start, self.events_tx.clone())?;

        loop {
            let now = Instant::now();
            while let Some((_, task)) = self.timers.pop_due(now) {
                self.on_timer(task, now);
            }

            let event = match self.timers.next_deadline() {
                Some(deadline) => match self.events_rx.recv_deadline(deadline) {
                    Ok(event) => Some(event),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match self.events_rx.recv() {
                    Ok(event) => Some(event),
                    Err(_) => break,
                },
            };

            if let Some(event) = event
                && !self.on_event(event)
            {
                break;
            }
        }

        self.scroll.destroy_all(&mut self.timers);
        self.logger.send(ActivityEvent::DisplayStopped {
            reason: "shutdown requested".to_string(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        });
        Ok(())
    }

    // ──────────────────── event dispatch ────────────────────

    /// Handle one event; returns false to stop the loop.
    fn on_event(&mut self, event: EngineEvent) -> bool {
        let now = Instant::now();
        match event {
            EngineEvent::Settings(delivery) => {
                match &delivery {
                    SettingsDelivery::Snapshot(_) => {
                        self.logger.send(ActivityEvent::FeedDelivered {
                            feed: SETTINGS_FEED,
                            documents: 1,
                        });
                    }
                    SettingsDelivery::Absent => {
                        self.logger
                            .send(ActivityEvent::FeedAbsent { feed: SETTINGS_FEED });
                    }
                    SettingsDelivery::Failed(message) => {
                        self.logger.send(ActivityEvent::FeedError {
                            feed: SETTINGS_FEED,
                            message: message.clone(),
                        });
                    }
                }
                let outcome = self.reconciler.apply_settings(delivery);
                self.after_reconcile(outcome, now);
            }
            EngineEvent::Daily(delivery) => {
                match &delivery {
                    DailyDelivery::Snapshot(docs) => {
                        self.logger.send(ActivityEvent::FeedDelivered {
                            feed: DAILY_FEED,
                            documents: docs.len(),
                        });
                    }
                    DailyDelivery::Failed(message) => {
                        self.logger.send(ActivityEvent::FeedError {
                            feed: DAILY_FEED,
                            message: message.clone(),
                        });
                    }
                }
                let outcome = self.reconciler.apply_daily(delivery);
                self.after_reconcile(outcome, now);
            }
            EngineEvent::Interaction(panel) => {
                self.scroll
                    .on_interaction(panel, &mut self.timers, &self.config.timing, now);
            }
            EngineEvent::Gesture => match self.notifier.on_gesture(self.audio.as_mut()) {
                GestureOutcome::Unlocked { chirp_error } => {
                    self.logger.send(ActivityEvent::AudioUnlocked);
                    if let Some(message) = chirp_error {
                        self.logger.send(ActivityEvent::AudioError { message });
                    }
                }
                GestureOutcome::AlreadyUnlocked | GestureOutcome::StillLocked => {}
            },
            EngineEvent::Resized => {
                if let Some(id) = self.resize_timer.take() {
                    self.timers.cancel(id);
                }
                self.resize_timer = Some(self.timers.schedule(
                    now,
                    self.config.timing.resize_debounce(),
                    TimerTask::ResizeSettle,
                ));
            }
            EngineEvent::ForceRefresh => {
                let frame = render::render(self.reconciler.view(), dates::today());
                self.surface.apply_frame(&frame);
                self.surface.set_ad_quiet(self.current_quiet());
                self.restart_ads(now);
                self.restart_scrollers(now);
            }
            EngineEvent::Shutdown => return false,
        }
        true
    }

    fn on_timer(&mut self, task: TimerTask, now: Instant) {
        match task {
            TimerTask::SettleInitialLoad => {
                self.settle_timer = None;
                if self.reconciler.settle_elapsed() {
                    self.logger.send(ActivityEvent::InitialLoadComplete);
                }
            }
            TimerTask::BannerHide => {
                self.notifier.on_banner_timeout(self.surface.as_mut());
            }
            TimerTask::AdTick => {
                self.ads.set_timer(None);
                self.ad_tick(now);
            }
            TimerTask::ClockTick => {
                self.surface
                    .set_clock(&dates::clock_label(dates::now_time()));
                self.timers
                    .schedule(now, self.config.timing.clock_tick(), TimerTask::ClockTick);
            }
            TimerTask::ResizeSettle => {
                self.resize_timer = None;
                self.restart_scrollers(now);
            }
            TimerTask::Scroll(panel, scroll_task) => {
                self.scroll.on_task(
                    panel,
                    scroll_task,
                    self.surface.as_mut(),
                    &mut self.timers,
                    &self.config.timing,
                    now,
                );
            }
        }
    }

    // ──────────────────── delivery downstream ────────────────────

    /// The full downstream pass after a delivery was applied. Runs only when
    /// the reconciler reported a content change; errors settle the load
    /// state without touching the display.
    fn after_reconcile(&mut self, outcome: ReconcileOutcome, now: Instant) {
        if outcome.schedule_settle {
            if let Some(id) = self.settle_timer.take() {
                self.timers.cancel(id);
            }
            self.settle_timer = Some(self.timers.schedule(
                now,
                self.config.timing.settle(),
                TimerTask::SettleInitialLoad,
            ));
        }

        if !outcome.changed {
            return;
        }

        *self.snapshot.write() = self.reconciler.view().clone();

        let frame = render::render(self.reconciler.view(), dates::today());
        self.surface.apply_frame(&frame);

        let quiet = self.current_quiet();
        if outcome.restart_ads {
            self.surface.set_ad_quiet(quiet);
            self.restart_ads(now);
        }

        let suppress = outcome.suppress_effects || !self.config.notifications.enabled;
        let notify_outcome = self.notifier.on_update(
            suppress,
            quiet,
            self.config.notifications.audio,
            self.audio.as_mut(),
            self.surface.as_mut(),
            &mut self.timers,
            &self.config.timing,
            now,
        );
        if notify_outcome.banner {
            self.logger.send(ActivityEvent::UpdateNotified {
                audible: notify_outcome.tone == ToneOutcome::Played,
            });
        }
        if let ToneOutcome::Failed(message) = notify_outcome.tone {
            self.logger.send(ActivityEvent::AudioError { message });
        }

        self.restart_scrollers(now);
    }

    fn current_quiet(&self) -> bool {
        quiet::is_quiet(dates::now_time(), &self.reconciler.view().quiet_hours)
    }

    /// Cancel the pending cycle and start over from the first ad.
    fn restart_ads(&mut self, now: Instant) {
        if let Some(id) = self.ads.timer() {
            self.timers.cancel(id);
            self.ads.set_timer(None);
        }
        self.ads.reset();

        let count = self.reconciler.view().ads.len();
        self.logger.send(ActivityEvent::AdsRestarted { count });
        if count == 0 {
            return; // idle, no timer
        }
        self.ad_tick(now);
    }

    /// One ad display tick: consult the gate, show or blank, reschedule.
    fn ad_tick(&mut self, now: Instant) {
        let (ad_list, quiet) = {
            let view = self.reconciler.view();
            (
                view.ads.clone(),
                quiet::is_quiet(dates::now_time(), &view.quiet_hours),
            )
        };

        match self.ads.tick(&ad_list, quiet, &self.config.timing) {
            AdTick::Idle => self.ads.set_timer(None),
            AdTick::Quiet { recheck_after } => {
                self.surface.set_ad_quiet(true);
                let id = self.timers.schedule(now, recheck_after, TimerTask::AdTick);
                self.ads.set_timer(Some(id));
            }
            AdTick::Show { index, next_after } => {
                self.surface.set_ad_quiet(false);
                self.surface.show_ad(&ad_list[index]);
                self.logger.send(ActivityEvent::AdShown {
                    index,
                    id: ad_list[index].id.clone(),
                });
                let id = self.timers.schedule(now, next_after, TimerTask::AdTick);
                self.ads.set_timer(Some(id));
            }
        }
    }

    /// Destroy every scroller and rebuild against the current panels.
    fn restart_scrollers(&mut self, now: Instant) {
        let panels = self.surface.panels();
        self.scroll
            .restart(&panels, &mut self.timers, &self.config.timing, now);
        self.logger.send(ActivityEvent::ScrollersRestarted {
            panels: panels.len(),
        });
    }
}

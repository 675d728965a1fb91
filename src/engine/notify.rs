//! Notification subsystem: transient update banner plus a two-tone chime.
//!
//! The banner fires on every content update once initial load has settled,
//! regardless of audio or quiet-hours state. The tone additionally requires
//! an unlocked audio sink and a not-quiet clock. During initial load neither
//! is produced. Audio failures degrade to visual-only — playback can never
//! take the display down.

use std::time::Instant;

use crate::core::config::TimingConfig;
use crate::engine::TimerTask;
use crate::engine::timers::{TaskId, TimerQueue};
use crate::surface::{AudioSink, AudioState, DisplaySurface, ToneSpec};

/// Banner text shown on content updates.
pub const UPDATE_BANNER_TEXT: &str = "Content updated";

/// What happened to the tone on one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToneOutcome {
    /// Suppressed, quiet, locked, or audio disabled.
    NotAttempted,
    Played,
    Failed(String),
}

/// Result of one update pass, for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub banner: bool,
    pub tone: ToneOutcome,
}

/// Result of a user gesture routed to the audio sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    AlreadyUnlocked,
    /// Freshly unlocked; carries the confirmation chirp failure, if any.
    Unlocked { chirp_error: Option<String> },
    StillLocked,
}

/// Banner timer owner and audio gatekeeper.
#[derive(Debug, Default)]
pub struct Notifier {
    banner_timer: Option<TaskId>,
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// React to a content update.
    ///
    /// `suppress` is the initial-load flag at delivery time; `audio_allowed`
    /// is the config switch; `quiet` comes from the quiet-hours gate.
    pub fn on_update(
        &mut self,
        suppress: bool,
        quiet: bool,
        audio_allowed: bool,
        audio: &mut dyn AudioSink,
        surface: &mut dyn DisplaySurface,
        timers: &mut TimerQueue<TimerTask>,
        timing: &TimingConfig,
        now: Instant,
    ) -> NotifyOutcome {
        if suppress {
            return NotifyOutcome {
                banner: false,
                tone: ToneOutcome::NotAttempted,
            };
        }

        // Banner always; re-triggering restarts the hide timer.
        if let Some(id) = self.banner_timer.take() {
            timers.cancel(id);
        }
        surface.show_banner(UPDATE_BANNER_TEXT);
        self.banner_timer = Some(timers.schedule(now, timing.banner_hide(), TimerTask::BannerHide));

        let tone = if audio_allowed && !quiet && audio.state() == AudioState::Unlocked {
            match audio.play(&ToneSpec::notification()) {
                Ok(()) => ToneOutcome::Played,
                Err(e) => ToneOutcome::Failed(e.to_string()),
            }
        } else {
            ToneOutcome::NotAttempted
        };

        NotifyOutcome { banner: true, tone }
    }

    /// The banner hide timer fired.
    pub fn on_banner_timeout(&mut self, surface: &mut dyn DisplaySurface) {
        self.banner_timer = None;
        surface.hide_banner();
    }

    /// A user gesture arrived: try to unlock audio, chirp on success.
    pub fn on_gesture(&mut self, audio: &mut dyn AudioSink) -> GestureOutcome {
        if audio.state() == AudioState::Unlocked {
            return GestureOutcome::AlreadyUnlocked;
        }
        match audio.unlock() {
            AudioState::Unlocked => GestureOutcome::Unlocked {
                chirp_error: audio.play(&ToneSpec::chirp()).err().map(|e| e.to_string()),
            },
            AudioState::Locked => GestureOutcome::StillLocked,
        }
    }
}

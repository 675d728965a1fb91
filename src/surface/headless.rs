//! Recording surface and audio doubles.
//!
//! Used by the test suites and by embedders (the editing dashboard renders
//! its preview from the recorded state instead of a screen). All state lives
//! behind a shared handle so tests can inspect it while the engine owns the
//! boxed surface.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::errors::{Result, SignageError};
use crate::engine::render::DisplayFrame;
use crate::model::view::AdItem;
use crate::surface::{AudioSink, AudioState, DisplaySurface, PanelId, PanelMetrics, ToneSpec};

// ──────────────────── display ────────────────────

/// Everything the headless surface has been told to show.
#[derive(Debug, Default)]
pub struct SurfaceState {
    pub frames: Vec<DisplayFrame>,
    pub clock: String,
    /// Ids of ads shown, in display order.
    pub ads_shown: Vec<String>,
    pub ad_quiet: bool,
    pub banner_visible: bool,
    pub banner_text: String,
    /// Times the banner was (re)shown.
    pub banner_shows: usize,
    /// Injected geometry per panel; panels without an entry report `None`.
    pub metrics: HashMap<PanelId, PanelMetrics>,
    pub scroll_tops: HashMap<PanelId, f64>,
}

impl SurfaceState {
    /// Panels implied by the most recent frame.
    #[must_use]
    pub fn frame_panels(&self) -> Vec<PanelId> {
        let Some(frame) = self.frames.last() else {
            return Vec::new();
        };
        let mut panels: Vec<PanelId> = (0..frame.schedule_columns.len())
            .map(PanelId::ScheduleColumn)
            .collect();
        panels.push(PanelId::NoticeList);
        panels.push(PanelId::AssignmentTable);
        panels
    }
}

/// A [`DisplaySurface`] that records everything into shared state.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl HeadlessSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle for inspection after the surface moved into the engine.
    #[must_use]
    pub fn state(&self) -> Arc<Mutex<SurfaceState>> {
        Arc::clone(&self.state)
    }

    /// Inject geometry for a panel (tests control overflow through this).
    pub fn set_metrics(&self, panel: PanelId, metrics: PanelMetrics) {
        self.state.lock().metrics.insert(panel, metrics);
    }
}

impl DisplaySurface for HeadlessSurface {
    fn apply_frame(&mut self, frame: &DisplayFrame) {
        self.state.lock().frames.push(frame.clone());
    }

    fn set_clock(&mut self, label: &str) {
        self.state.lock().clock = label.to_string();
    }

    fn show_ad(&mut self, ad: &AdItem) {
        self.state.lock().ads_shown.push(ad.id.clone());
    }

    fn set_ad_quiet(&mut self, quiet: bool) {
        self.state.lock().ad_quiet = quiet;
    }

    fn show_banner(&mut self, text: &str) {
        let mut state = self.state.lock();
        state.banner_visible = true;
        state.banner_text = text.to_string();
        state.banner_shows += 1;
    }

    fn hide_banner(&mut self) {
        self.state.lock().banner_visible = false;
    }

    fn panels(&self) -> Vec<PanelId> {
        self.state.lock().frame_panels()
    }

    fn metrics(&self, panel: PanelId) -> Option<PanelMetrics> {
        self.state.lock().metrics.get(&panel).copied()
    }

    fn scroll_top(&self, panel: PanelId) -> f64 {
        self.state
            .lock()
            .scroll_tops
            .get(&panel)
            .copied()
            .unwrap_or(0.0)
    }

    fn set_scroll_top(&mut self, panel: PanelId, offset: f64) {
        self.state.lock().scroll_tops.insert(panel, offset);
    }
}

// ──────────────────── audio ────────────────────

/// An [`AudioSink`] that records plays instead of producing sound.
#[derive(Debug)]
pub struct RecordingAudio {
    state: AudioState,
    /// When true, `unlock()` leaves the sink locked (browser refused to
    /// resume the context).
    pub refuse_unlock: bool,
    /// When true, `play()` fails (AudioUnavailable path).
    pub fail_playback: bool,
    plays: Arc<Mutex<Vec<ToneSpec>>>,
}

impl Default for RecordingAudio {
    fn default() -> Self {
        Self {
            state: AudioState::Locked,
            refuse_unlock: false,
            fail_playback: false,
            plays: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl RecordingAudio {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start unlocked (e.g. kiosk environments that need no gesture).
    #[must_use]
    pub fn unlocked() -> Self {
        Self {
            state: AudioState::Unlocked,
            ..Self::default()
        }
    }

    /// Shared handle to the recorded plays.
    #[must_use]
    pub fn plays(&self) -> Arc<Mutex<Vec<ToneSpec>>> {
        Arc::clone(&self.plays)
    }
}

impl AudioSink for RecordingAudio {
    fn state(&self) -> AudioState {
        self.state
    }

    fn unlock(&mut self) -> AudioState {
        if !self.refuse_unlock {
            self.state = AudioState::Unlocked;
        }
        self.state
    }

    fn play(&mut self, tone: &ToneSpec) -> Result<()> {
        if self.fail_playback {
            return Err(SignageError::Audio {
                details: "playback refused".to_string(),
            });
        }
        self.plays.lock().push(tone.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::render;
    use crate::model::dates::DateKey;
    use crate::model::view::ViewModel;
    use chrono::NaiveDate;

    #[test]
    fn records_frames_and_derives_panels() {
        let mut surface = HeadlessSurface::new();
        let state = surface.state();
        assert!(surface.panels().is_empty());

        let today = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let view = ViewModel::placeholder(DateKey::from(today));
        surface.apply_frame(&render::render(&view, today));

        assert_eq!(state.lock().frames.len(), 1);
        let panels = surface.panels();
        assert_eq!(panels.len(), 5); // 3 columns + notices + assignments
        assert!(panels.contains(&PanelId::NoticeList));
    }

    #[test]
    fn banner_show_counts_retriggers() {
        let mut surface = HeadlessSurface::new();
        let state = surface.state();
        surface.show_banner("updated");
        surface.show_banner("updated");
        surface.hide_banner();
        let s = state.lock();
        assert_eq!(s.banner_shows, 2);
        assert!(!s.banner_visible);
    }

    #[test]
    fn recording_audio_lock_lifecycle() {
        let mut audio = RecordingAudio::new();
        assert_eq!(audio.state(), AudioState::Locked);
        assert_eq!(audio.unlock(), AudioState::Unlocked);

        let mut stubborn = RecordingAudio {
            refuse_unlock: true,
            ..RecordingAudio::new()
        };
        assert_eq!(stubborn.unlock(), AudioState::Locked);
    }

    #[test]
    fn recording_audio_captures_and_fails() {
        let mut audio = RecordingAudio::unlocked();
        let plays = audio.plays();
        audio.play(&ToneSpec::notification()).unwrap();
        assert_eq!(plays.lock().len(), 1);

        audio.fail_playback = true;
        let err = audio.play(&ToneSpec::chirp()).unwrap_err();
        assert_eq!(err.code(), "CSD-3101");
        assert_eq!(plays.lock().len(), 1);
    }
}

//! Display and audio surface abstractions.
//!
//! The engine never touches a real screen or speaker: it drives a
//! [`DisplaySurface`] and an [`AudioSink`], both injected at construction.
//! Production builds plug in a real renderer (the `csd` binary ships a
//! terminal one); tests plug in the recording doubles from
//! [`headless`](crate::surface::headless).

pub mod console;
pub mod headless;

use serde::{Deserialize, Serialize};

use crate::core::errors::Result;
use crate::engine::render::DisplayFrame;
use crate::model::view::AdItem;

// ──────────────────── panels ────────────────────

/// One scrollable region of the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PanelId {
    /// Weekday schedule column by position (0 = today's column).
    ScheduleColumn(usize),
    /// The notice list.
    NoticeList,
    /// The assignment table wrapper.
    AssignmentTable,
}

impl PanelId {
    /// Short stable label for logs.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::ScheduleColumn(i) => format!("schedule[{i}]"),
            Self::NoticeList => "notices".to_string(),
            Self::AssignmentTable => "assignments".to_string(),
        }
    }
}

/// Measured geometry of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelMetrics {
    pub content_height: f64,
    pub visible_height: f64,
}

impl PanelMetrics {
    /// Scrollable excess; negative when content fits with room to spare.
    #[must_use]
    pub fn overflow(&self) -> f64 {
        self.content_height - self.visible_height
    }
}

// ──────────────────── display surface ────────────────────

/// The rendering target the engine projects onto.
///
/// Implementations must be idempotent per call: applying the same frame or
/// banner twice is harmless. All calls arrive on the engine thread.
pub trait DisplaySurface: Send {
    /// Replace all section content with a freshly rendered frame.
    fn apply_frame(&mut self, frame: &DisplayFrame);

    /// Update the header clock label.
    fn set_clock(&mut self, label: &str);

    /// Show one ad on the ad surface.
    fn show_ad(&mut self, ad: &AdItem);

    /// Blank (true) or restore (false) the ad surface for quiet hours.
    fn set_ad_quiet(&mut self, quiet: bool);

    /// Show the transient update banner.
    fn show_banner(&mut self, text: &str);

    /// Hide the update banner.
    fn hide_banner(&mut self);

    /// Scrollable panels present in the last applied frame.
    fn panels(&self) -> Vec<PanelId>;

    /// Current geometry of a panel; `None` once the panel is gone.
    fn metrics(&self, panel: PanelId) -> Option<PanelMetrics>;

    /// Current scroll offset of a panel in pixels.
    fn scroll_top(&self, panel: PanelId) -> f64;

    /// Set a panel's scroll offset. Implementations clamp as they see fit;
    /// the engine already clamps to `[0, overflow]`.
    fn set_scroll_top(&mut self, panel: PanelId, offset: f64);
}

// ──────────────────── audio ────────────────────

/// Whether the audio output has been primed by a user gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    Locked,
    Unlocked,
}

/// One oscillator frequency step inside a tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneSegment {
    pub frequency_hz: f64,
    /// Offset from tone start when this frequency takes effect.
    pub at_secs: f64,
}

/// A short synthesized tone: frequency steps plus a gain envelope that decays
/// exponentially from `gain` to `fade_to` over `duration_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneSpec {
    pub segments: Vec<ToneSegment>,
    pub gain: f64,
    pub fade_to: f64,
    pub duration_secs: f64,
}

impl ToneSpec {
    /// The two-tone content-update chime.
    #[must_use]
    pub fn notification() -> Self {
        Self {
            segments: vec![
                ToneSegment {
                    frequency_hz: 830.0,
                    at_secs: 0.0,
                },
                ToneSegment {
                    frequency_hz: 1_046.0,
                    at_secs: 0.15,
                },
            ],
            gain: 0.3,
            fade_to: 0.01,
            duration_secs: 0.3,
        }
    }

    /// Short confirmation chirp played when audio unlocks.
    #[must_use]
    pub fn chirp() -> Self {
        Self {
            segments: vec![ToneSegment {
                frequency_hz: 523.0,
                at_secs: 0.0,
            }],
            gain: 0.2,
            fade_to: 0.01,
            duration_secs: 0.15,
        }
    }
}

/// The audio output the engine plays tones through.
///
/// Starts [`AudioState::Locked`]; a user gesture routed through the engine
/// calls [`AudioSink::unlock`]. Implementations that need no priming may
/// unlock unconditionally.
pub trait AudioSink: Send {
    /// Current lock state.
    fn state(&self) -> AudioState;

    /// Attempt to unlock after a user gesture; returns the resulting state.
    fn unlock(&mut self) -> AudioState;

    /// Play a tone. Errors degrade the caller to visual-only.
    fn play(&mut self, tone: &ToneSpec) -> Result<()>;
}

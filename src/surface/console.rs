//! Terminal reference surface for the `csd` binary.
//!
//! Stands in for the kiosk screen on a headless box: frames print as text
//! sections, the banner and ads print as marked lines, and the notification
//! tone degrades to the terminal bell. Panel geometry is synthesized from
//! line counts so the auto-scroll engine still runs against real overflow
//! numbers.

use std::collections::HashMap;
use std::io::Write;

use crate::core::errors::{Result, SignageError};
use crate::engine::render::{self, DisplayFrame};
use crate::model::view::AdItem;
use crate::surface::{AudioSink, AudioState, DisplaySurface, PanelId, PanelMetrics, ToneSpec};

/// Synthesized row height for overflow math.
const LINE_HEIGHT_PX: f64 = 18.0;

/// Synthesized visible panel height.
const PANEL_VIEW_PX: f64 = 180.0;

/// Text surface writing sections to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    last_frame: Option<DisplayFrame>,
    scroll_tops: HashMap<PanelId, f64>,
    clock: String,
    ad_quiet: bool,
}

impl ConsoleSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn print_frame(&self, frame: &DisplayFrame) {
        let mut out = String::new();
        out.push_str("──────────────────────────────────────────────\n");
        out.push_str(&format!(
            " {} ({})  {}  {}\n",
            frame.header.date_label, frame.header.weekday_label, self.clock, frame.header.class_name
        ));

        for column in &frame.schedule_columns {
            let marker = if column.is_today { "*" } else { " " };
            out.push_str(&format!("{marker}{}\n", column.label));
            if column.entries.is_empty() {
                out.push_str(&format!("   {}\n", render::NO_SCHEDULE));
            }
            for entry in &column.entries {
                out.push_str(&format!("   {:<8} {}\n", entry.time, entry.content));
            }
        }

        out.push_str(" Notices:\n");
        if frame.notices.is_empty() {
            out.push_str(&format!("   {}\n", render::NO_NOTICES));
        }
        for notice in &frame.notices {
            out.push_str(&format!("   - {}\n", notice.text));
        }

        out.push_str(" Assignments:\n");
        if frame.assignments.is_empty() {
            out.push_str(&format!("   {}\n", render::NO_ASSIGNMENTS));
        }
        for row in &frame.assignments {
            out.push_str(&format!(
                "   {:<6} {:<12} {:<10} {}\n",
                row.due_label, row.days_label, row.subject, row.task
            ));
        }

        match &frame.ad.current {
            Some(ad) => out.push_str(&format!(" Ad surface: {} ({})\n", ad.id, ad.url)),
            None => out.push_str(&format!(" Ad surface: {}\n", render::AD_PLACEHOLDER)),
        }

        print!("{out}");
        let _ = std::io::stdout().flush();
    }

    fn panel_rows(&self, panel: PanelId) -> Option<usize> {
        let frame = self.last_frame.as_ref()?;
        let rows = match panel {
            PanelId::ScheduleColumn(i) => frame.schedule_columns.get(i)?.entries.len(),
            PanelId::NoticeList => frame.notices.len(),
            PanelId::AssignmentTable => frame.assignments.len(),
        };
        Some(rows.max(1)) // empty-state message still occupies a row
    }
}

impl DisplaySurface for ConsoleSurface {
    fn apply_frame(&mut self, frame: &DisplayFrame) {
        self.print_frame(frame);
        self.last_frame = Some(frame.clone());
    }

    fn set_clock(&mut self, label: &str) {
        self.clock = label.to_string();
    }

    fn show_ad(&mut self, ad: &AdItem) {
        println!(" [ad] {} ({})", ad.id, ad.url);
    }

    fn set_ad_quiet(&mut self, quiet: bool) {
        if quiet != self.ad_quiet {
            self.ad_quiet = quiet;
            println!(
                " [ad] {}",
                if quiet { "hidden (quiet hours)" } else { "visible" }
            );
        }
    }

    fn show_banner(&mut self, text: &str) {
        println!(" *** {text} ***");
    }

    fn hide_banner(&mut self) {
        // Nothing to erase on a scrolling terminal.
    }

    fn panels(&self) -> Vec<PanelId> {
        let Some(frame) = self.last_frame.as_ref() else {
            return Vec::new();
        };
        let mut panels: Vec<PanelId> = (0..frame.schedule_columns.len())
            .map(PanelId::ScheduleColumn)
            .collect();
        panels.push(PanelId::NoticeList);
        panels.push(PanelId::AssignmentTable);
        panels
    }

    #[allow(clippy::cast_precision_loss)]
    fn metrics(&self, panel: PanelId) -> Option<PanelMetrics> {
        self.panel_rows(panel).map(|rows| PanelMetrics {
            content_height: rows as f64 * LINE_HEIGHT_PX,
            visible_height: PANEL_VIEW_PX,
        })
    }

    fn scroll_top(&self, panel: PanelId) -> f64 {
        self.scroll_tops.get(&panel).copied().unwrap_or(0.0)
    }

    fn set_scroll_top(&mut self, panel: PanelId, offset: f64) {
        // Tracked for the scroll engine; a scrolling terminal has no
        // viewport to move.
        self.scroll_tops.insert(panel, offset);
    }
}

/// Terminal-bell audio: the tone degrades to BEL.
#[derive(Debug, Default)]
pub struct TerminalBell {
    unlocked: bool,
}

impl TerminalBell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for TerminalBell {
    fn state(&self) -> AudioState {
        if self.unlocked {
            AudioState::Unlocked
        } else {
            AudioState::Locked
        }
    }

    fn unlock(&mut self) -> AudioState {
        self.unlocked = true;
        AudioState::Unlocked
    }

    fn play(&mut self, _tone: &ToneSpec) -> Result<()> {
        let mut out = std::io::stdout();
        out.write_all(b"\x07")
            .and_then(|()| out.flush())
            .map_err(|e| SignageError::Audio {
                details: e.to_string(),
            })
    }
}

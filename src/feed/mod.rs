//! Realtime feed abstractions.
//!
//! The engine consumes two independent subscriptions: the settings document
//! and the date-ranged daily-data collection. Each delivery is a *full*
//! snapshot (or an explicit absent/error signal) — adapters never patch.
//! Adapters run on their own threads and push [`EngineEvent`]s into the
//! engine channel; they hold no engine state.

pub mod json_dir;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::Sender;

use crate::core::errors::Result;
use crate::engine::EngineEvent;
use crate::model::dates::DateKey;
use crate::model::view::{DailyDoc, SettingsDoc};

/// Stable feed names for logs and errors.
pub const SETTINGS_FEED: &str = "settings";
pub const DAILY_FEED: &str = "daily";

/// How many daily documents a subscription delivers at most.
pub const DAILY_QUERY_LIMIT: usize = 10;

// ──────────────────── deliveries ────────────────────

/// One settings feed delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsDelivery {
    /// The document exists; full snapshot.
    Snapshot(Box<SettingsDoc>),
    /// The document does not exist.
    Absent,
    /// The subscription failed; previous content is retained downstream.
    Failed(String),
}

/// One daily-data feed delivery: the full matching set, date ascending,
/// truncated to [`DAILY_QUERY_LIMIT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyDelivery {
    Snapshot(Vec<DailyDoc>),
    Failed(String),
}

// ──────────────────── store seam ────────────────────

/// A realtime document store the engine can subscribe to.
///
/// Implementations deliver an initial snapshot promptly after subscribing
/// and a fresh snapshot whenever content changes. Delivery errors are sent
/// as `Failed` deliveries, never panics — the display must outlive its
/// store.
pub trait RealtimeStore: Send + Sync {
    /// Subscribe to the settings document.
    fn subscribe_settings(&self, events: Sender<EngineEvent>) -> Result<Subscription>;

    /// Subscribe to daily documents with `date >= range_start`, date
    /// ascending, limited to [`DAILY_QUERY_LIMIT`].
    fn subscribe_daily(
        &self,
        range_start: DateKey,
        events: Sender<EngineEvent>,
    ) -> Result<Subscription>;
}

/// Handle to one live subscription; dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wrap a polling thread. `stop` is checked by the thread each cycle.
    #[must_use]
    pub fn new(stop: Arc<AtomicBool>, join: JoinHandle<()>) -> Self {
        Self {
            stop,
            join: Some(join),
        }
    }

    /// A subscription with nothing to tear down (in-process test stores).
    #[must_use]
    pub fn detached() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            join: None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

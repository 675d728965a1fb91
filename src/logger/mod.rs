//! Structured activity logging.
//!
//! A dedicated logger thread owns the JSONL writer; every other thread sends
//! [`ActivityEvent`] values through a bounded crossbeam channel. Sends are
//! non-blocking — the engine loop is never stalled by logging back-pressure;
//! overflow increments a dropped-events counter instead.

pub mod jsonl;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use serde::Serialize;

use crate::core::errors::{Result, SignageError};
use crate::logger::jsonl::{JsonlConfig, JsonlWriter};

/// Default bounded channel capacity for log events.
const CHANNEL_CAPACITY: usize = 1024;

// ──────────────────── events ────────────────────

/// Events recorded by the display process.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityEvent {
    DisplayStarted {
        version: String,
        config_hash: String,
    },
    DisplayStopped {
        reason: String,
        uptime_secs: u64,
    },
    FeedDelivered {
        feed: &'static str,
        documents: usize,
    },
    FeedAbsent {
        feed: &'static str,
    },
    FeedError {
        feed: &'static str,
        message: String,
    },
    InitialLoadComplete,
    UpdateNotified {
        audible: bool,
    },
    AdShown {
        index: usize,
        id: String,
    },
    AdsRestarted {
        count: usize,
    },
    ScrollersRestarted {
        panels: usize,
    },
    AudioUnlocked,
    AudioError {
        message: String,
    },
    Error {
        code: String,
        message: String,
    },
    /// Sentinel requesting graceful shutdown of the logger thread. Never
    /// written to the log.
    Shutdown,
}

// ──────────────────── handle ────────────────────

/// Thread-safe, cheaply-cloneable handle for sending log events.
#[derive(Clone)]
pub struct ActivityLoggerHandle {
    tx: Sender<ActivityEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl ActivityLoggerHandle {
    /// Send an event to the logger thread. Non-blocking; a full channel
    /// drops the event and counts it.
    pub fn send(&self, event: ActivityEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
        }
        // Disconnected is fine during shutdown.
    }

    /// Number of events dropped due to channel back-pressure.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Request graceful shutdown of the logger thread.
    pub fn shutdown(&self) {
        let _ = self.tx.send(ActivityEvent::Shutdown);
    }
}

// ──────────────────── spawn ────────────────────

/// Spawn the logger thread and return a handle plus its join handle.
pub fn spawn_logger(
    config: JsonlConfig,
) -> Result<(ActivityLoggerHandle, thread::JoinHandle<()>)> {
    let (tx, rx) = bounded::<ActivityEvent>(CHANNEL_CAPACITY);
    let dropped = Arc::new(AtomicU64::new(0));
    let dropped_clone = Arc::clone(&dropped);

    let handle = ActivityLoggerHandle {
        tx,
        dropped_events: dropped,
    };

    let join = thread::Builder::new()
        .name("csd-logger".to_string())
        .spawn(move || logger_thread_main(&rx, config, &dropped_clone))
        .map_err(|e| SignageError::Runtime {
            details: format!("failed to spawn logger thread: {e}"),
        })?;

    Ok((handle, join))
}

fn logger_thread_main(rx: &Receiver<ActivityEvent>, config: JsonlConfig, dropped: &AtomicU64) {
    let mut writer = JsonlWriter::open(config);

    while let Ok(event) = rx.recv() {
        let d = dropped.swap(0, Ordering::Relaxed);
        if d > 0 {
            writer.write_event(&ActivityEvent::Error {
                code: "CSD-3900".to_string(),
                message: format!("{d} log events dropped due to back-pressure"),
            });
        }

        if matches!(event, ActivityEvent::Shutdown) {
            writer.flush();
            return;
        }
        writer.write_event(&event);
    }

    // All senders dropped without a Shutdown sentinel.
    writer.flush();
}

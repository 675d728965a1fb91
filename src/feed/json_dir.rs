//! File-backed reference store: a directory of JSON documents polled for
//! changes.
//!
//! Layout mirrors the remote store one file per document:
//!
//! ```text
//! <store_dir>/settings.json          the settings document
//! <store_dir>/daily/2024-01-09.json  one daily document per date
//! ```
//!
//! Each subscription runs on its own polling thread. A delivery is pushed on
//! the first poll and again whenever the raw content fingerprint changes, so
//! downstream sees the same snapshot-on-change cadence a realtime backend
//! provides. Read or parse failures become `Failed` deliveries — the watcher
//! thread itself never dies.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::core::errors::{Result, SignageError};
use crate::engine::EngineEvent;
use crate::feed::{
    DAILY_QUERY_LIMIT, DailyDelivery, RealtimeStore, SettingsDelivery, Subscription,
};
use crate::model::dates::DateKey;
use crate::model::view::{DailyDoc, SettingsDoc};

/// Settings document file name inside the store directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Subdirectory holding the date-keyed daily documents.
pub const DAILY_DIR: &str = "daily";

/// Polling file-backed store adapter.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
    poll_interval: Duration,
}

impl JsonDirStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            poll_interval,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RealtimeStore for JsonDirStore {
    fn subscribe_settings(&self, events: Sender<EngineEvent>) -> Result<Subscription> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_inner = Arc::clone(&stop);
        let path = self.dir.join(SETTINGS_FILE);
        let poll = self.poll_interval;

        let join = thread::Builder::new()
            .name("csd-feed-settings".to_string())
            .spawn(move || settings_thread_main(&path, poll, &stop_inner, &events))
            .map_err(|source| SignageError::Runtime {
                details: format!("failed to spawn settings feed thread: {source}"),
            })?;

        Ok(Subscription::new(stop, join))
    }

    fn subscribe_daily(
        &self,
        range_start: DateKey,
        events: Sender<EngineEvent>,
    ) -> Result<Subscription> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_inner = Arc::clone(&stop);
        let dir = self.dir.join(DAILY_DIR);
        let poll = self.poll_interval;

        let join = thread::Builder::new()
            .name("csd-feed-daily".to_string())
            .spawn(move || daily_thread_main(&dir, &range_start, poll, &stop_inner, &events))
            .map_err(|source| SignageError::Runtime {
                details: format!("failed to spawn daily feed thread: {source}"),
            })?;

        Ok(Subscription::new(stop, join))
    }
}

// ──────────────────── settings watcher ────────────────────

/// Poll-state fingerprint: raw file content, `None` while absent, or the
/// error text while unreadable. A delivery goes out whenever it changes.
#[derive(PartialEq)]
enum Fingerprint {
    Content(String),
    Absent,
    Error(String),
}

fn settings_thread_main(
    path: &Path,
    poll: Duration,
    stop: &AtomicBool,
    events: &Sender<EngineEvent>,
) {
    let mut last: Option<Fingerprint> = None;

    while !stop.load(Ordering::Relaxed) {
        let fingerprint = match fs::read_to_string(path) {
            Ok(raw) => Fingerprint::Content(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Fingerprint::Absent,
            Err(e) => Fingerprint::Error(e.to_string()),
        };

        if last.as_ref() != Some(&fingerprint) {
            let delivery = match &fingerprint {
                Fingerprint::Content(raw) => match serde_json::from_str::<SettingsDoc>(raw) {
                    Ok(doc) => SettingsDelivery::Snapshot(Box::new(doc)),
                    Err(e) => SettingsDelivery::Failed(e.to_string()),
                },
                Fingerprint::Absent => SettingsDelivery::Absent,
                Fingerprint::Error(e) => SettingsDelivery::Failed(e.clone()),
            };
            if events.send(EngineEvent::Settings(delivery)).is_err() {
                return; // engine gone
            }
            last = Some(fingerprint);
        }

        thread::sleep(poll);
    }
}

// ──────────────────── daily watcher ────────────────────

fn daily_thread_main(
    dir: &Path,
    range_start: &DateKey,
    poll: Duration,
    stop: &AtomicBool,
    events: &Sender<EngineEvent>,
) {
    let mut last: Option<Fingerprint> = None;

    while !stop.load(Ordering::Relaxed) {
        let fingerprint = match read_daily_raw(dir, range_start) {
            Ok(raw) => Fingerprint::Content(raw),
            Err(e) => Fingerprint::Error(e.to_string()),
        };

        if last.as_ref() != Some(&fingerprint) {
            let delivery = match &fingerprint {
                Fingerprint::Content(raw) => parse_daily_set(raw),
                Fingerprint::Error(e) => DailyDelivery::Failed(e.clone()),
                // A vanished directory reads as an empty set upstream.
                Fingerprint::Absent => DailyDelivery::Snapshot(Vec::new()),
            };
            if events.send(EngineEvent::Daily(delivery)).is_err() {
                return;
            }
            last = Some(fingerprint);
        }

        thread::sleep(poll);
    }
}

/// Concatenate the raw contents of every matching file, in file-name
/// (= date) order. A missing directory reads as an empty set.
fn read_daily_raw(dir: &Path, range_start: &DateKey) -> Result<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => return Err(SignageError::io(dir, e)),
    };

    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SignageError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(stem) = name.strip_suffix(".json") else {
            continue;
        };
        // The range filter compares keys as strings, like the store query.
        if DateKey::new(stem) >= *range_start {
            names.push(name);
        }
    }
    names.sort();
    names.truncate(DAILY_QUERY_LIMIT);

    let mut raw = String::new();
    for name in names {
        let path = dir.join(&name);
        let content = fs::read_to_string(&path).map_err(|e| SignageError::io(&path, e))?;
        raw.push_str(&content);
        raw.push('\n');
    }
    Ok(raw)
}

/// Parse the concatenated set. One malformed document fails the whole
/// delivery; downstream retains previous content.
fn parse_daily_set(raw: &str) -> DailyDelivery {
    let mut docs: Vec<DailyDoc> = Vec::new();
    let de = serde_json::Deserializer::from_str(raw);
    for doc in de.into_iter::<DailyDoc>() {
        match doc {
            Ok(doc) => docs.push(doc),
            Err(e) => return DailyDelivery::Failed(e.to_string()),
        }
    }
    docs.sort_by(|a, b| a.date.cmp(&b.date));
    DailyDelivery::Snapshot(docs)
}

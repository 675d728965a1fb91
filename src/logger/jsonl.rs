//! Append-only JSONL activity log with size-based rotation.
//!
//! One line per event, timestamped at write time. All IO errors degrade to
//! stderr warnings; logging must never take the display down.

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::logger::ActivityEvent;

/// JSONL writer configuration.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    /// Log file path; `None` disables the sink entirely.
    pub path: Option<PathBuf>,
    /// Rotate to `<path>.1` once the file exceeds this size.
    pub max_size_bytes: u64,
    /// Flush after this many buffered entries.
    pub flush_every: usize,
}

impl Default for JsonlConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_size_bytes: 50 * 1024 * 1024,
            flush_every: 16,
        }
    }
}

/// One serialized log line.
#[derive(Serialize)]
struct LogLine<'a> {
    ts: String,
    #[serde(flatten)]
    event: &'a ActivityEvent,
}

/// The writer owned by the logger thread.
pub struct JsonlWriter {
    config: JsonlConfig,
    file: Option<BufWriter<File>>,
    unflushed: usize,
    warned: bool,
}

impl JsonlWriter {
    /// Open (or create) the log file. Failures disable the sink with one
    /// stderr warning.
    #[must_use]
    pub fn open(config: JsonlConfig) -> Self {
        let mut writer = Self {
            config,
            file: None,
            unflushed: 0,
            warned: false,
        };
        writer.reopen();
        writer
    }

    /// Append one event line.
    pub fn write_event(&mut self, event: &ActivityEvent) {
        if self.config.path.is_none() {
            return;
        }
        self.maybe_rotate();

        let line = LogLine {
            ts: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            event,
        };
        let Ok(json) = serde_json::to_string(&line) else {
            return;
        };

        if let Some(file) = self.file.as_mut() {
            if writeln!(file, "{json}").is_err() {
                self.warn("write failed");
                self.file = None;
                return;
            }
            self.unflushed += 1;
            if self.unflushed >= self.config.flush_every {
                self.flush();
            }
        }
    }

    /// Flush buffered lines to disk.
    pub fn flush(&mut self) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.flush();
        }
        self.unflushed = 0;
    }

    fn reopen(&mut self) {
        let Some(path) = self.config.path.clone() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => self.file = Some(BufWriter::new(file)),
            Err(e) => self.warn(&format!("cannot open {}: {e}", path.display())),
        }
    }

    fn maybe_rotate(&mut self) {
        let Some(path) = self.config.path.clone() else {
            return;
        };
        let size = fs::metadata(&path).map_or(0, |m| m.len());
        if size < self.config.max_size_bytes {
            return;
        }

        self.flush();
        self.file = None;
        let rotated = path.with_extension("jsonl.1");
        if let Err(e) = fs::rename(&path, &rotated) {
            self.warn(&format!("rotation failed: {e}"));
        }
        self.reopen();
    }

    fn warn(&mut self, message: &str) {
        if !self.warned {
            eprintln!("[CSD-LOG] {message}; activity logging degraded");
            self.warned = true;
        }
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let mut writer = JsonlWriter::open(JsonlConfig {
            path: Some(path.clone()),
            ..JsonlConfig::default()
        });

        writer.write_event(&ActivityEvent::InitialLoadComplete);
        writer.write_event(&ActivityEvent::AdShown {
            index: 0,
            id: "ad_1".to_string(),
        });
        writer.flush();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        let first: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(first["type"], "initial_load_complete");
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("log.jsonl");
        let mut writer = JsonlWriter::open(JsonlConfig {
            path: Some(path.clone()),
            ..JsonlConfig::default()
        });
        writer.write_event(&ActivityEvent::InitialLoadComplete);
        writer.flush();
        assert!(path.exists());
    }

    #[test]
    fn rotates_past_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let mut writer = JsonlWriter::open(JsonlConfig {
            path: Some(path.clone()),
            max_size_bytes: 64,
            flush_every: 1,
        });

        for i in 0..20 {
            writer.write_event(&ActivityEvent::AdShown {
                index: i,
                id: format!("ad_{i}"),
            });
        }
        writer.flush();

        assert!(path.with_extension("jsonl.1").exists());
        assert!(path.exists());
    }

    #[test]
    fn none_path_is_a_noop() {
        let mut writer = JsonlWriter::open(JsonlConfig::default());
        writer.write_event(&ActivityEvent::InitialLoadComplete);
        writer.flush();
    }
}

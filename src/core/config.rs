//! Configuration system: TOML file + env var overrides + smart defaults.
//!
//! Defaults reproduce the display's shipped timing behavior; a config file is
//! only needed to point at a store directory or tune timings on slow panels.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SignageError};

/// Full signage configuration model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignageConfig {
    pub timing: TimingConfig,
    pub feed: FeedConfig,
    pub notifications: NotificationsConfig,
    pub paths: PathsConfig,
}

/// Timing knobs for every scheduled behavior in the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay after the second feed's first delivery before the initial-load
    /// flag clears.
    pub settle_ms: u64,
    /// Update banner auto-hide delay.
    pub banner_secs: u64,
    /// Fallback ad display duration when an ad carries none.
    pub ad_default_duration_secs: u64,
    /// Re-check cadence while quiet hours keep the ad surface blanked.
    pub ad_quiet_poll_secs: u64,
    /// Delay between scroller creation and its first overflow measurement.
    pub scroll_start_delay_ms: u64,
    /// Re-measure cadence while a panel has no overflow.
    pub scroll_recheck_ms: u64,
    /// Dwell at either scroll edge before reversing.
    pub scroll_dwell_ms: u64,
    /// Resume delay after the last user interaction.
    pub scroll_cooldown_ms: u64,
    /// Downward scroll speed; the upward leg runs `scroll_reverse_factor`
    /// times this.
    pub scroll_speed_px_per_sec: f64,
    pub scroll_reverse_factor: f64,
    /// Overflow at or below this many pixels is treated as "nothing to
    /// scroll".
    pub scroll_min_overflow_px: f64,
    /// Animation frame cadence.
    pub frame_interval_ms: u64,
    /// Debounce for viewport resize before scrollers are rebuilt.
    pub resize_debounce_ms: u64,
    /// Header clock refresh cadence.
    pub clock_tick_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 1_000,
            banner_secs: 3,
            ad_default_duration_secs: 5,
            ad_quiet_poll_secs: 60,
            scroll_start_delay_ms: 2_000,
            scroll_recheck_ms: 3_000,
            scroll_dwell_ms: 2_500,
            scroll_cooldown_ms: 5_000,
            scroll_speed_px_per_sec: 25.0,
            scroll_reverse_factor: 1.5,
            scroll_min_overflow_px: 3.0,
            frame_interval_ms: 33,
            resize_debounce_ms: 250,
            clock_tick_ms: 1_000,
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    #[must_use]
    pub const fn banner_hide(&self) -> Duration {
        Duration::from_secs(self.banner_secs)
    }

    #[must_use]
    pub const fn ad_quiet_poll(&self) -> Duration {
        Duration::from_secs(self.ad_quiet_poll_secs)
    }

    #[must_use]
    pub const fn scroll_start_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_start_delay_ms)
    }

    #[must_use]
    pub const fn scroll_recheck(&self) -> Duration {
        Duration::from_millis(self.scroll_recheck_ms)
    }

    #[must_use]
    pub const fn scroll_dwell(&self) -> Duration {
        Duration::from_millis(self.scroll_dwell_ms)
    }

    #[must_use]
    pub const fn scroll_cooldown(&self) -> Duration {
        Duration::from_millis(self.scroll_cooldown_ms)
    }

    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    #[must_use]
    pub const fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    #[must_use]
    pub const fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }
}

/// Store adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeedConfig {
    /// Directory the file-backed store adapter watches.
    pub store_dir: PathBuf,
    /// Poll cadence of the file-backed adapter.
    pub poll_interval_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            store_dir: data_dir().join("store"),
            poll_interval_ms: 1_000,
        }
    }
}

impl FeedConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Banner/audio switches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Master switch for banner + tone on content updates.
    pub enabled: bool,
    /// Allow the notification tone at all (banner is unaffected).
    pub audio: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            audio: true,
        }
    }
}

/// Filesystem paths used by csd.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub jsonl_log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!("[CSD-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        Self {
            config_file: home_dir.join(".config").join("csd").join("config.toml"),
            jsonl_log: data_dir().join("activity.jsonl"),
        }
    }
}

fn data_dir() -> PathBuf {
    let home_dir = env::var_os("HOME").map_or_else(|| PathBuf::from("/tmp"), PathBuf::from);
    home_dir.join(".local").join("share").join("csd")
}

impl SignageConfig {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from the default
    /// path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| SignageError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(SignageError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(|key| env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for logging/telemetry.
    ///
    /// FNV-1a over the canonical JSON, stable across processes and Rust
    /// releases.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // timing
        set_env_u64(&mut lookup, "CSD_TIMING_SETTLE_MS", &mut self.timing.settle_ms)?;
        set_env_u64(
            &mut lookup,
            "CSD_TIMING_BANNER_SECS",
            &mut self.timing.banner_secs,
        )?;
        set_env_u64(
            &mut lookup,
            "CSD_TIMING_AD_DEFAULT_DURATION_SECS",
            &mut self.timing.ad_default_duration_secs,
        )?;
        set_env_u64(
            &mut lookup,
            "CSD_TIMING_AD_QUIET_POLL_SECS",
            &mut self.timing.ad_quiet_poll_secs,
        )?;
        set_env_u64(
            &mut lookup,
            "CSD_TIMING_SCROLL_START_DELAY_MS",
            &mut self.timing.scroll_start_delay_ms,
        )?;
        set_env_u64(
            &mut lookup,
            "CSD_TIMING_SCROLL_RECHECK_MS",
            &mut self.timing.scroll_recheck_ms,
        )?;
        set_env_u64(
            &mut lookup,
            "CSD_TIMING_SCROLL_DWELL_MS",
            &mut self.timing.scroll_dwell_ms,
        )?;
        set_env_u64(
            &mut lookup,
            "CSD_TIMING_SCROLL_COOLDOWN_MS",
            &mut self.timing.scroll_cooldown_ms,
        )?;
        set_env_f64(
            &mut lookup,
            "CSD_TIMING_SCROLL_SPEED_PX_PER_SEC",
            &mut self.timing.scroll_speed_px_per_sec,
        )?;
        set_env_f64(
            &mut lookup,
            "CSD_TIMING_SCROLL_REVERSE_FACTOR",
            &mut self.timing.scroll_reverse_factor,
        )?;
        set_env_u64(
            &mut lookup,
            "CSD_TIMING_FRAME_INTERVAL_MS",
            &mut self.timing.frame_interval_ms,
        )?;

        // feed
        if let Some(raw) = lookup("CSD_FEED_STORE_DIR") {
            self.feed.store_dir = PathBuf::from(raw);
        }
        set_env_u64(
            &mut lookup,
            "CSD_FEED_POLL_INTERVAL_MS",
            &mut self.feed.poll_interval_ms,
        )?;

        // notifications
        set_env_bool(
            &mut lookup,
            "CSD_NOTIFICATIONS_ENABLED",
            &mut self.notifications.enabled,
        )?;
        set_env_bool(
            &mut lookup,
            "CSD_NOTIFICATIONS_AUDIO",
            &mut self.notifications.audio,
        )?;

        // paths
        if let Some(raw) = lookup("CSD_PATHS_JSONL_LOG") {
            self.paths.jsonl_log = PathBuf::from(raw);
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.timing.scroll_speed_px_per_sec <= 0.0 {
            return Err(SignageError::InvalidConfig {
                details: format!(
                    "timing.scroll_speed_px_per_sec must be > 0, got {}",
                    self.timing.scroll_speed_px_per_sec
                ),
            });
        }
        if self.timing.scroll_reverse_factor <= 0.0 {
            return Err(SignageError::InvalidConfig {
                details: format!(
                    "timing.scroll_reverse_factor must be > 0, got {}",
                    self.timing.scroll_reverse_factor
                ),
            });
        }
        if self.timing.scroll_min_overflow_px < 0.0 {
            return Err(SignageError::InvalidConfig {
                details: "timing.scroll_min_overflow_px must be >= 0".to_string(),
            });
        }
        if self.timing.frame_interval_ms == 0 {
            return Err(SignageError::InvalidConfig {
                details: "timing.frame_interval_ms must be >= 1".to_string(),
            });
        }
        if self.timing.clock_tick_ms == 0 {
            return Err(SignageError::InvalidConfig {
                details: "timing.clock_tick_ms must be >= 1".to_string(),
            });
        }
        if self.feed.poll_interval_ms == 0 {
            return Err(SignageError::InvalidConfig {
                details: "feed.poll_interval_ms must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

// ──────────────────── env parsing helpers ────────────────────

fn set_env_u64<F>(lookup: &mut F, key: &'static str, target: &mut u64) -> Result<()>
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| SignageError::InvalidConfig {
                details: format!("{key} must be an unsigned integer, got {raw:?}"),
            })?;
    }
    Ok(())
}

fn set_env_f64<F>(lookup: &mut F, key: &'static str, target: &mut f64) -> Result<()>
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| SignageError::InvalidConfig {
                details: format!("{key} must be a number, got {raw:?}"),
            })?;
    }
    Ok(())
}

fn set_env_bool<F>(lookup: &mut F, key: &'static str, target: &mut bool) -> Result<()>
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *target = match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                return Err(SignageError::InvalidConfig {
                    details: format!("{key} must be a boolean, got {raw:?}"),
                });
            }
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_shipped_timings() {
        let cfg = SignageConfig::default();
        assert_eq!(cfg.timing.settle_ms, 1_000);
        assert_eq!(cfg.timing.banner_secs, 3);
        assert_eq!(cfg.timing.ad_default_duration_secs, 5);
        assert_eq!(cfg.timing.ad_quiet_poll_secs, 60);
        assert_eq!(cfg.timing.scroll_start_delay_ms, 2_000);
        assert_eq!(cfg.timing.scroll_recheck_ms, 3_000);
        assert_eq!(cfg.timing.scroll_dwell_ms, 2_500);
        assert_eq!(cfg.timing.scroll_cooldown_ms, 5_000);
        assert!((cfg.timing.scroll_speed_px_per_sec - 25.0).abs() < f64::EPSILON);
        assert!((cfg.timing.scroll_reverse_factor - 1.5).abs() < f64::EPSILON);
        assert!((cfg.timing.scroll_min_overflow_px - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = SignageConfig::default();
        let raw = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SignageConfig = toml::from_str(&raw).unwrap();
        assert_eq!(cfg, parsed);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let parsed: SignageConfig = toml::from_str("[timing]\nsettle_ms = 250\n").unwrap();
        assert_eq!(parsed.timing.settle_ms, 250);
        assert_eq!(parsed.timing.banner_secs, 3);
        assert!(parsed.notifications.enabled);
    }

    #[test]
    fn load_explicit_missing_path_is_error() {
        let err = SignageConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert_eq!(err.code(), "CSD-1002");
    }

    #[test]
    fn load_explicit_path_parses_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "[feed]\npoll_interval_ms = 250").unwrap();

        let cfg = SignageConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.feed.poll_interval_ms, 250);
        assert_eq!(cfg.paths.config_file, path);
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = SignageConfig::default();
        cfg.apply_env_overrides_from(|key| match key {
            "CSD_TIMING_SETTLE_MS" => Some("50".to_string()),
            "CSD_NOTIFICATIONS_AUDIO" => Some("off".to_string()),
            "CSD_FEED_STORE_DIR" => Some("/srv/signage".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.timing.settle_ms, 50);
        assert!(!cfg.notifications.audio);
        assert_eq!(cfg.feed.store_dir, PathBuf::from("/srv/signage"));
    }

    #[test]
    fn env_override_rejects_garbage() {
        let mut cfg = SignageConfig::default();
        let err = cfg
            .apply_env_overrides_from(|key| {
                (key == "CSD_TIMING_SETTLE_MS").then(|| "soon".to_string())
            })
            .unwrap_err();
        assert_eq!(err.code(), "CSD-1001");
    }

    #[test]
    fn validate_rejects_zero_speed() {
        let mut cfg = SignageConfig::default();
        cfg.timing.scroll_speed_px_per_sec = 0.0;
        assert_eq!(cfg.validate().unwrap_err().code(), "CSD-1001");
    }

    #[test]
    fn validate_rejects_zero_frame_interval() {
        let mut cfg = SignageConfig::default();
        cfg.timing.frame_interval_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn stable_hash_changes_with_content() {
        let a = SignageConfig::default();
        let mut b = SignageConfig::default();
        b.timing.settle_ms = 42;
        assert_ne!(a.stable_hash().unwrap(), b.stable_hash().unwrap());
        assert_eq!(a.stable_hash().unwrap(), SignageConfig::default().stable_hash().unwrap());
    }
}

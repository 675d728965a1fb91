//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use classroom_signage::prelude::*;
//! ```

// Core
pub use crate::core::config::SignageConfig;
pub use crate::core::errors::{Result, SignageError};

// Model
pub use crate::model::dates::DateKey;
pub use crate::model::quiet::{TimeInterval, is_quiet};
pub use crate::model::view::{
    AdItem, AssignmentItem, DailyDoc, NoticeItem, ScheduleItem, SettingsDoc, ViewModel,
};

// Engine
pub use crate::engine::render::{DeadlineBucket, DisplayFrame, render};
pub use crate::engine::{EngineEvent, EngineHandle, SignageEngine};

// Feeds
pub use crate::feed::json_dir::JsonDirStore;
pub use crate::feed::{DailyDelivery, RealtimeStore, SettingsDelivery, Subscription};

// Surfaces
pub use crate::surface::{AudioSink, AudioState, DisplaySurface, PanelId, PanelMetrics, ToneSpec};

// Logging
pub use crate::logger::{ActivityEvent, ActivityLoggerHandle, spawn_logger};

#![forbid(unsafe_code)]

//! classroom_signage (csd) — realtime content synchronization and autonomous
//! presentation engine for unattended classroom displays.
//!
//! The engine:
//! 1. **Reconciles** two independently-updating realtime feeds (settings,
//!    daily data) into one consistent view model, without flicker or
//!    duplicate side effects
//! 2. **Projects** a rolling date window into display sections (schedule
//!    columns, notices, deadline-bucketed assignments)
//! 3. **Animates** overflowing panels with interaction-aware auto-scroll
//! 4. **Rotates** ads and gates audio/banner notifications behind
//!    configurable quiet hours
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use classroom_signage::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use classroom_signage::core::config::SignageConfig;
//! use classroom_signage::engine::SignageEngine;
//! ```

pub mod prelude;

pub mod core;
pub mod engine;
pub mod feed;
pub mod logger;
pub mod model;
#[cfg(feature = "daemon")]
pub mod signals;
pub mod surface;

// src/watch/mod.rs

//! Filesystem-facing side of watching.
//!
//! This module is responsible for:
//! - Expanding input path patterns into concrete paths (`globset`).
//! - Finding the style sources inside a directory.
//! - Wiring up one non-recursive `notify` subscription per watched
//!   directory and turning its events into raw change notifications.
//!
//! It does **not** debounce or decide when to recompile; that is the
//! engine's job.

pub mod matcher;
pub mod patterns;
pub mod watcher;

pub use matcher::{match_files, SuffixFilter};
pub use patterns::{expand_pattern, is_glob};
pub use watcher::{events_for, translate_event, NotifyBackend, WatchBackend};

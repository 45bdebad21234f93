// src/config/mod.rs

//! Settings loading and validation for lesswatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a settings file from disk (`loader.rs`).
//! - Validate suffixes, timings and the compiler command (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve_settings};
pub use model::{CompilerSection, RawSettingsFile, Settings, WatchSection};
pub use validate::validate_settings;

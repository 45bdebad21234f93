#![allow(dead_code)]

use lesswatch::config::{RawSettingsFile, Settings};
use lesswatch::types::MatchMode;

/// Builder for `Settings` to simplify test setup.
///
/// Timings default to short values so watch tests finish quickly.
pub struct SettingsBuilder {
    raw: RawSettingsFile,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        let mut raw = RawSettingsFile::default();
        raw.watch.settle_ms = 20;
        raw.watch.cooldown_ms = 200;
        Self { raw }
    }

    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.raw.watch.match_mode = mode;
        self
    }

    pub fn timings(mut self, settle_ms: u64, cooldown_ms: u64) -> Self {
        self.raw.watch.settle_ms = settle_ms;
        self.raw.watch.cooldown_ms = cooldown_ms;
        self
    }

    pub fn suffix(mut self, suffix: &str, output_extension: &str) -> Self {
        self.raw.watch.source_suffix = suffix.to_string();
        self.raw.watch.output_extension = output_extension.to_string();
        self
    }

    pub fn build(self) -> Settings {
        Settings::try_from(self.raw).expect("Failed to build valid settings from builder")
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

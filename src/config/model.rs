// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::MatchMode;

/// Settings file as read from TOML, before validation.
///
/// ```toml
/// [watch]
/// source_suffix = ".less"
/// output_extension = "css"
/// match_mode = "recursive"
/// settle_ms = 100
/// cooldown_ms = 1000
///
/// [compiler]
/// program = "lessc"
/// args = []
/// include_path_flag = "--include-path"
/// compress = true
/// compress_flag = "--compress"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettingsFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub compiler: CompilerSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Suffix that marks a file as a style source.
    #[serde(default = "default_source_suffix")]
    pub source_suffix: String,

    /// Extension swapped in for compiled outputs (without the dot).
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    #[serde(default)]
    pub match_mode: MatchMode,

    /// Delay between a raw notification and its debounce check.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Quiet period after a recompile trigger fires.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

fn default_source_suffix() -> String {
    ".less".to_string()
}

fn default_output_extension() -> String {
    "css".to_string()
}

fn default_settle_ms() -> u64 {
    100
}

fn default_cooldown_ms() -> u64 {
    1000
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            source_suffix: default_source_suffix(),
            output_extension: default_output_extension(),
            match_mode: MatchMode::default(),
            settle_ms: default_settle_ms(),
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

/// `[compiler]` section: the external program used to compile one source.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerSection {
    #[serde(default = "default_program")]
    pub program: String,

    /// Extra arguments placed before the include path and the stdin marker.
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_include_path_flag")]
    pub include_path_flag: String,

    /// Emit minified output.
    #[serde(default = "default_compress")]
    pub compress: bool,

    /// Flag passed to the program when `compress` is set.
    #[serde(default = "default_compress_flag")]
    pub compress_flag: String,
}

fn default_program() -> String {
    "lessc".to_string()
}

fn default_include_path_flag() -> String {
    "--include-path".to_string()
}

fn default_compress() -> bool {
    true
}

fn default_compress_flag() -> String {
    "--compress".to_string()
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            include_path_flag: default_include_path_flag(),
            compress: default_compress(),
            compress_flag: default_compress_flag(),
        }
    }
}

/// Validated settings.
///
/// Only constructible through `TryFrom<RawSettingsFile>` (see
/// `config::validate`), so holders can rely on the invariants checked there.
#[derive(Debug, Clone)]
pub struct Settings {
    watch: WatchSection,
    compiler: CompilerSection,
}

impl Settings {
    pub(crate) fn new_unchecked(watch: WatchSection, compiler: CompilerSection) -> Self {
        Self { watch, compiler }
    }

    pub fn source_suffix(&self) -> &str {
        &self.watch.source_suffix
    }

    pub fn output_extension(&self) -> &str {
        &self.watch.output_extension
    }

    pub fn match_mode(&self) -> MatchMode {
        self.watch.match_mode
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.watch.settle_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.watch.cooldown_ms)
    }

    pub fn compiler(&self) -> &CompilerSection {
        &self.compiler
    }

    /// Override the match mode (e.g. from `--shallow`).
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.watch.match_mode = mode;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new_unchecked(WatchSection::default(), CompilerSection::default())
    }
}

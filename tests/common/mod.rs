#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lesswatch::config::Settings;
use lesswatch::engine::Orchestrator;
use lesswatch::fs::RealFileSystem;

pub use lesswatch_test_utils::fakes::SYNTAX_ERROR;
pub use lesswatch_test_utils::{
    init_tracing, wait_until, with_timeout, FakeBackend, FakeCompiler, RecordingLogger,
    SettingsBuilder,
};

/// Write `contents` to `dir/rel`, creating parent directories.
pub fn write(dir: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Orchestrator over the real filesystem with fake compiler and logger.
pub fn orchestrator(settings: Settings, compiler: &FakeCompiler, logger: &RecordingLogger) -> Orchestrator {
    Orchestrator::new(
        settings,
        Arc::new(RealFileSystem),
        Arc::new(compiler.clone()),
        Arc::new(logger.clone()),
    )
}

pub fn pattern(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use lesswatch::compile::{CompileFuture, StyleCompiler};
use lesswatch::engine::{TargetId, WatchEvent};
use lesswatch::errors::{LesswatchError, Result};
use lesswatch::logging::{Logger, MessageType};
use lesswatch::watch::WatchBackend;

/// Marker that makes [`FakeCompiler`] reject a source.
pub const SYNTAX_ERROR: &str = "@@syntax-error@@";

/// A deterministic in-process compiler that:
/// - records every include directory it was called with
/// - returns `/* compiled */` followed by the trimmed source
/// - fails for sources containing [`SYNTAX_ERROR`]
#[derive(Debug, Default, Clone)]
pub struct FakeCompiler {
    calls: Arc<Mutex<Vec<PathBuf>>>,
    delay: Option<Duration>,
}

impl FakeCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every compile.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn expected_output(source: &str) -> String {
        format!("/* compiled */ {}", source.trim())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl StyleCompiler for FakeCompiler {
    fn compile<'a>(&'a self, source: &'a str, include_dir: &'a Path) -> CompileFuture<'a> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(include_dir.to_path_buf());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if source.contains(SYNTAX_ERROR) {
                anyhow::bail!("ParseError: unrecognised input");
            }
            Ok(Self::expected_output(source))
        })
    }
}

/// Logger that keeps every message for later assertions.
#[derive(Debug, Default, Clone)]
pub struct RecordingLogger {
    messages: Arc<Mutex<Vec<(String, MessageType)>>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, MessageType)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn of_kind(&self, kind: MessageType) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(_, k)| *k == kind)
            .map(|(m, _)| m)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().unwrap().is_empty()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, message: &str, kind: MessageType) {
        self.messages.lock().unwrap().push((message.to_string(), kind));
    }
}

/// Watch backend that installs nothing and lets tests inject changes.
#[derive(Debug, Default)]
pub struct FakeBackend {
    attached: Vec<(PathBuf, TargetId, mpsc::UnboundedSender<WatchEvent>)>,
    refuse: Vec<PathBuf>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `attach` fail for `dir`.
    pub fn refuse(mut self, dir: impl Into<PathBuf>) -> Self {
        self.refuse.push(dir.into());
        self
    }

    pub fn attached_dirs(&self) -> Vec<PathBuf> {
        self.attached.iter().map(|(d, _, _)| d.clone()).collect()
    }

    /// Simulate an OS notification for the directory `dir`.
    pub fn notify(&self, dir: &Path, filename: Option<&str>) -> bool {
        self.attached
            .iter()
            .filter(|(d, _, _)| d == dir)
            .map(|(_, target, tx)| {
                tx.send(WatchEvent::Changed {
                    target: *target,
                    kind: lesswatch::engine::ChangeKind::Change,
                    filename: filename.map(str::to_string),
                })
                .is_ok()
            })
            .fold(false, |acc, ok| acc || ok)
    }
}

impl WatchBackend for FakeBackend {
    fn attach(
        &mut self,
        dir: &Path,
        target: TargetId,
        events: mpsc::UnboundedSender<WatchEvent>,
    ) -> Result<()> {
        if self.refuse.iter().any(|d| d == dir) {
            return Err(LesswatchError::WatchAttach {
                path: dir.to_path_buf(),
                source: notify::Error::generic("inotify watch limit reached"),
            });
        }
        self.attached.push((dir.to_path_buf(), target, events));
        Ok(())
    }
}

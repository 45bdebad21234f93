// src/engine/orchestrator.rs

//! Resolving input patterns into watch targets.
//!
//! For every pattern, in input order: expand it, keep the existing
//! directories, compile each one once and (in continuous mode) attach an OS
//! watch feeding the [`WatchRuntime`]. A failing pattern or directory is
//! logged and counted; it never stops the others. Targets are processed
//! strictly one after another.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::compile::{output_path_for, FolderCompiler, StyleCompiler};
use crate::config::Settings;
use crate::errors::{LesswatchError, Result};
use crate::fs::{EntryKind, FileSystem};
use crate::logging::{Logger, MessageType};
use crate::watch::matcher::SuffixFilter;
use crate::watch::patterns::expand_pattern;
use crate::watch::watcher::WatchBackend;

use super::runtime::WatchRuntime;
use super::{TargetId, TargetState, WatchEvent};

/// Whether targets keep being watched after their initial compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Continuous,
    /// Compile each target once and install no watch.
    OneShot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub id: TargetId,
    pub dir: PathBuf,
    pub state: TargetState,
}

/// Outcome of processing all input patterns.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Every directory that was resolved, in processing order.
    pub targets: Vec<WatchTarget>,
    /// Failed patterns, paths and targets.
    pub failures: usize,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.state != TargetState::Failed)
            .count()
    }

    pub fn watching(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.state == TargetState::Watching)
            .count()
    }

    /// True when something failed and nothing succeeded.
    pub fn all_failed(&self) -> bool {
        self.failures > 0 && self.succeeded() == 0
    }
}

/// Result of [`Orchestrator::start`].
#[derive(Debug)]
pub struct Session {
    pub summary: RunSummary,
    runtime: Option<WatchRuntime>,
}

impl Session {
    /// The runtime to drive, present only in continuous mode with at least
    /// one watched target.
    pub fn into_runtime(self) -> Option<WatchRuntime> {
        self.runtime
    }

    pub fn runtime(&self) -> Option<&WatchRuntime> {
        self.runtime.as_ref()
    }
}

#[derive(Debug)]
pub struct Orchestrator {
    settings: Settings,
    fs: Arc<dyn FileSystem>,
    folder: FolderCompiler,
}

impl Orchestrator {
    pub fn new(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        compiler: Arc<dyn StyleCompiler>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let folder = FolderCompiler::new(
            Arc::clone(&fs),
            compiler,
            logger,
            SuffixFilter::new(settings.source_suffix()),
            settings.output_extension(),
            settings.match_mode(),
        );
        Self {
            settings,
            fs,
            folder,
        }
    }

    pub fn folder(&self) -> &FolderCompiler {
        &self.folder
    }

    fn log(&self, message: &str, kind: MessageType) {
        self.folder.logger().log(message, kind);
    }

    /// Process `patterns` in order and report through the logger.
    ///
    /// Emits one final status line unless every target failed.
    pub async fn start<B: WatchBackend>(
        &self,
        patterns: &[String],
        mode: RunMode,
        backend: &mut B,
    ) -> Session {
        let mut summary = RunSummary::default();

        if patterns.is_empty() {
            self.log("No paths specified. Exiting.", MessageType::Warn);
            return Session {
                summary,
                runtime: None,
            };
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel::<WatchEvent>();
        let mut runtime = WatchRuntime::new(
            self.folder.clone(),
            self.settings.settle(),
            self.settings.cooldown(),
            event_tx.clone(),
            event_rx,
        );

        for pattern in patterns {
            for dir in self.directories(pattern, &mut summary.failures) {
                let mut target = WatchTarget {
                    id: summary.targets.len(),
                    dir,
                    state: TargetState::Pending,
                };

                if let Err(err) = self.prepare(&mut target, mode, backend, &event_tx).await {
                    self.log(
                        &format!("Trying to watch path '{}' caused error: {err}", target.dir.display()),
                        MessageType::Error,
                    );
                    target.state = TargetState::Failed;
                    summary.failures += 1;
                }

                if target.state == TargetState::Watching {
                    runtime.add_target(target.id, target.dir.clone());
                }
                debug!(id = target.id, dir = ?target.dir, state = ?target.state, "target processed");
                summary.targets.push(target);
            }
        }

        self.report(&summary, mode);

        let runtime = (mode == RunMode::Continuous && runtime.target_count() > 0).then_some(runtime);
        Session { summary, runtime }
    }

    /// Initial compile, then (in continuous mode) the OS watch.
    async fn prepare<B: WatchBackend>(
        &self,
        target: &mut WatchTarget,
        mode: RunMode,
        backend: &mut B,
        events: &mpsc::UnboundedSender<WatchEvent>,
    ) -> Result<()> {
        let report = self.folder.compile_folder(&target.dir).await?;
        target.state = TargetState::InitialCompiled;
        debug!(
            dir = ?target.dir,
            compiled = report.compiled.len(),
            failed = report.failed.len(),
            "initial compile settled"
        );

        match mode {
            RunMode::OneShot => target.state = TargetState::OneShotDone,
            RunMode::Continuous => {
                backend.attach(&target.dir, target.id, events.clone())?;
                target.state = TargetState::Watching;
            }
        }
        Ok(())
    }

    /// Expand `pattern` and keep the directories it names.
    ///
    /// Expansion errors and paths that cannot be statted are logged and
    /// counted; existing non-directories are skipped silently.
    fn directories(&self, pattern: &str, failures: &mut usize) -> Vec<PathBuf> {
        let paths = match expand_pattern(self.fs.as_ref(), pattern) {
            Ok(paths) => paths,
            Err(err) => {
                self.log(
                    &format!("Trying to watch path '{pattern}' caused error: {err}"),
                    MessageType::Error,
                );
                *failures += 1;
                return Vec::new();
            }
        };

        let mut dirs = Vec::with_capacity(paths.len());
        for path in paths {
            match self.fs.stat(&path) {
                Ok(EntryKind::Dir) => dirs.push(path),
                Ok(kind) => debug!(?path, ?kind, "not a directory; skipping"),
                Err(err) => {
                    let err = LesswatchError::filesystem(&path, err);
                    self.log(
                        &format!("Trying to watch path '{}' caused error: {err}", path.display()),
                        MessageType::Error,
                    );
                    *failures += 1;
                }
            }
        }
        dirs
    }

    fn report(&self, summary: &RunSummary, mode: RunMode) {
        if summary.all_failed() {
            debug!(failures = summary.failures, "every target failed; no status message");
            return;
        }

        if summary.targets.is_empty() {
            self.log("No folders matched the given paths.", MessageType::Warn);
        }

        let message = match mode {
            RunMode::OneShot => format!("Just compiled {} folder(s).", summary.succeeded()),
            RunMode::Continuous => format!("Now watching {} folder(s) for changes...", summary.watching()),
        };
        debug!(failures = summary.failures, "final status: {message}");
        self.log(&message, MessageType::Info);
    }

    /// Describe what a run would compile, without compiling or watching.
    pub fn dry_run(&self, patterns: &[String]) -> RunSummary {
        let mut summary = RunSummary::default();
        if patterns.is_empty() {
            self.log("No paths specified. Exiting.", MessageType::Warn);
            return summary;
        }

        let suffix = self.settings.source_suffix();
        let extension = self.settings.output_extension();

        for pattern in patterns {
            for dir in self.directories(pattern, &mut summary.failures) {
                let id = summary.targets.len();
                let state = match self.folder.sources(&dir) {
                    Ok(sources) => {
                        self.log(
                            &format!("'{}': {} source file(s)", dir.display(), sources.len()),
                            MessageType::Info,
                        );
                        for source in &sources {
                            self.log(&describe(source, suffix, extension), MessageType::Info);
                        }
                        TargetState::Pending
                    }
                    Err(err) => {
                        self.log(
                            &format!("Trying to watch path '{}' caused error: {err}", dir.display()),
                            MessageType::Error,
                        );
                        summary.failures += 1;
                        TargetState::Failed
                    }
                };
                summary.targets.push(WatchTarget { id, dir, state });
            }
        }
        summary
    }
}

fn describe(source: &Path, suffix: &str, extension: &str) -> String {
    format!(
        "  {} -> {}",
        source.display(),
        output_path_for(source, suffix, extension).display()
    )
}

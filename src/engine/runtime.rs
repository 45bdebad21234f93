// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::compile::FolderCompiler;
use crate::errors::Result;
use crate::logging::MessageType;

use super::debounce::{CheckOutcome, Debouncer, PassStart};
use super::{TargetId, WatchEvent};

/// Drives recompiles in response to [`WatchEvent`]s.
///
/// All per-target debounce state lives in the [`Debouncer`] owned by this
/// loop and is only touched here, one event at a time. Settle timers and
/// compile passes run as spawned tasks that report back through the same
/// channel (`CheckDue`, `PassFinished`).
pub struct WatchRuntime {
    debouncer: Debouncer,
    folder: FolderCompiler,
    targets: HashMap<TargetId, PathBuf>,
    settle: Duration,
    event_tx: mpsc::UnboundedSender<WatchEvent>,
    event_rx: mpsc::UnboundedReceiver<WatchEvent>,
}

impl fmt::Debug for WatchRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchRuntime")
            .field("debouncer", &self.debouncer)
            .field("targets", &self.targets)
            .field("settle", &self.settle)
            .finish_non_exhaustive()
    }
}

impl WatchRuntime {
    pub fn new(
        folder: FolderCompiler,
        settle: Duration,
        cooldown: Duration,
        event_tx: mpsc::UnboundedSender<WatchEvent>,
        event_rx: mpsc::UnboundedReceiver<WatchEvent>,
    ) -> Self {
        let debouncer = Debouncer::new(folder.filter().clone(), cooldown);
        Self {
            debouncer,
            folder,
            targets: HashMap::new(),
            settle,
            event_tx,
            event_rx,
        }
    }

    /// Register a watched directory under `id`.
    pub fn add_target(&mut self, id: TargetId, dir: PathBuf) {
        self.debouncer.register(id);
        self.targets.insert(id, dir);
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Sender into this runtime's event channel.
    pub fn sender(&self) -> mpsc::UnboundedSender<WatchEvent> {
        self.event_tx.clone()
    }

    /// Main event loop. Returns after `ShutdownRequested`.
    pub async fn run(mut self) -> Result<()> {
        info!(targets = self.targets.len(), "watch runtime started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "runtime received event");
            if !self.handle(event) {
                info!("shutdown requested; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// Apply one event. Returns false when the loop should stop.
    fn handle(&mut self, event: WatchEvent) -> bool {
        match event {
            WatchEvent::Changed {
                target,
                kind,
                filename,
            } => {
                debug!(target_id = target, %kind, ?filename, "raw change");
                if self.debouncer.record(target, filename) {
                    self.schedule_check(target);
                }
            }
            WatchEvent::CheckDue { target } => {
                if let CheckOutcome::Trigger(changed) = self.debouncer.check(target, Instant::now()) {
                    debug!(target_id = target, ?changed, "recompile triggered");
                    match self.debouncer.start_pass(target) {
                        PassStart::Start => self.spawn_pass(target),
                        PassStart::Queued => {
                            debug!(target_id = target, "pass in flight; queued one more")
                        }
                    }
                }
            }
            WatchEvent::PassFinished { target } => {
                if self.debouncer.finish_pass(target) {
                    debug!(target_id = target, "starting queued pass");
                    self.spawn_pass(target);
                }
            }
            WatchEvent::WatchFailed { target, message } => {
                let dir = self
                    .targets
                    .get(&target)
                    .map(|d| d.display().to_string())
                    .unwrap_or_else(|| format!("#{target}"));
                self.folder.logger().log(
                    &format!("Watching '{dir}' reported an error: {message}"),
                    MessageType::Error,
                );
            }
            WatchEvent::ShutdownRequested => return false,
        }
        true
    }

    fn schedule_check(&self, target: TargetId) {
        let tx = self.event_tx.clone();
        let settle = self.settle;
        tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            let _ = tx.send(WatchEvent::CheckDue { target });
        });
    }

    /// Run a folder pass as an independent task; its outcome only reaches
    /// the logger and a `PassFinished` event.
    fn spawn_pass(&self, target: TargetId) {
        let Some(dir) = self.targets.get(&target).cloned() else {
            return;
        };
        let folder = self.folder.clone();
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match folder.compile_folder(&dir).await {
                Ok(report) => debug!(
                    dir = ?dir,
                    compiled = report.compiled.len(),
                    failed = report.failed.len(),
                    "recompile pass settled"
                ),
                Err(err) => folder.logger().log(
                    &format!("Recompiling '{}' failed: {err}", dir.display()),
                    MessageType::Error,
                ),
            }
            let _ = tx.send(WatchEvent::PassFinished { target });
        });
    }
}

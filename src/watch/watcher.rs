// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::{ChangeKind, TargetId, WatchEvent};
use crate::errors::{LesswatchError, Result};

/// Something that can subscribe to change notifications of a directory.
///
/// Production code uses [`NotifyBackend`]; tests provide their own
/// implementation and push [`WatchEvent::Changed`] by hand.
pub trait WatchBackend: Send {
    /// Start forwarding changes of the entries directly inside `dir` as
    /// `WatchEvent::Changed { target, .. }` into `events`.
    ///
    /// The subscription must stay alive for as long as the backend does.
    fn attach(
        &mut self,
        dir: &Path,
        target: TargetId,
        events: mpsc::UnboundedSender<WatchEvent>,
    ) -> Result<()>;
}

/// Backend built on `notify`'s recommended watcher, one per directory.
///
/// Dropping the backend stops every subscription it created.
#[derive(Default)]
pub struct NotifyBackend {
    watchers: Vec<(PathBuf, RecommendedWatcher)>,
}

impl std::fmt::Debug for NotifyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dirs: Vec<_> = self.watchers.iter().map(|(p, _)| p).collect();
        f.debug_struct("NotifyBackend").field("dirs", &dirs).finish()
    }
}

impl NotifyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}

impl WatchBackend for NotifyBackend {
    fn attach(
        &mut self,
        dir: &Path,
        target: TargetId,
        events: mpsc::UnboundedSender<WatchEvent>,
    ) -> Result<()> {
        let attach_err = |source: notify::Error| LesswatchError::WatchAttach {
            path: dir.to_path_buf(),
            source,
        };

        // Closure called synchronously by notify whenever an event arrives.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                for change in events_for(target, res) {
                    // The runtime is gone; nothing left to notify.
                    if events.send(change).is_err() {
                        return;
                    }
                }
            },
            Config::default(),
        )
        .map_err(attach_err)?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(attach_err)?;

        info!("file watcher started on {:?}", dir);
        self.watchers.push((dir.to_path_buf(), watcher));
        Ok(())
    }
}

/// Runtime events for one notify callback: the translated changes, or a
/// single `WatchFailed` carrying the error.
pub fn events_for(target: TargetId, res: notify::Result<Event>) -> Vec<WatchEvent> {
    match res {
        Ok(event) => translate_event(target, &event),
        Err(err) => vec![WatchEvent::WatchFailed {
            target,
            message: err.to_string(),
        }],
    }
}

/// Turn a notify event into raw change notifications for `target`.
///
/// Access events (open/read/close) are dropped: compiling a source reads it,
/// and that must not count as a change. An event without paths still yields
/// one notification with no file name.
pub fn translate_event(target: TargetId, event: &Event) -> Vec<WatchEvent> {
    let kind = match event.kind {
        EventKind::Access(_) => {
            debug!(?event, "ignoring access event");
            return Vec::new();
        }
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) => {
            ChangeKind::Rename
        }
        _ => ChangeKind::Change,
    };

    if event.paths.is_empty() {
        return vec![WatchEvent::Changed {
            target,
            kind,
            filename: None,
        }];
    }

    event
        .paths
        .iter()
        .map(|path| WatchEvent::Changed {
            target,
            kind,
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
        })
        .collect()
}

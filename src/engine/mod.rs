// src/engine/mod.rs

//! Scheduling engine for lesswatch.
//!
//! This module ties together:
//! - the per-target change debouncer ([`debounce`], pure state)
//! - the watch runtime, a single event loop that owns all debounce state and
//!   reacts to raw change notifications, settle timers and finished compile
//!   passes ([`runtime`])
//! - the orchestrator that resolves input patterns into watch targets,
//!   runs the initial compiles and attaches OS watches ([`orchestrator`])

use std::fmt;

/// Index of a watch target, in resolution order.
pub type TargetId = usize;

/// Kind of raw change reported by the OS watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// An entry appeared, disappeared or was renamed.
    Rename,
    /// File contents or metadata changed.
    Change,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Rename => f.write_str("rename"),
            ChangeKind::Change => f.write_str("change"),
        }
    }
}

/// Lifecycle of a watch target.
///
/// `Pending -> InitialCompiled -> (Watching | OneShotDone)`; any failure
/// moves it to the terminal `Failed` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Pending,
    InitialCompiled,
    Watching,
    OneShotDone,
    Failed,
}

/// Events flowing into the watch runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Raw notification from the OS watch of a target directory.
    Changed {
        target: TargetId,
        kind: ChangeKind,
        filename: Option<String>,
    },
    /// The settle delay after a notification elapsed.
    CheckDue { target: TargetId },
    /// A compile pass for the target settled.
    PassFinished { target: TargetId },
    /// The OS watch of the target reported an error.
    WatchFailed { target: TargetId, message: String },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod debounce;
pub mod orchestrator;
pub mod runtime;

pub use debounce::{CheckOutcome, Debouncer, PassStart};
pub use orchestrator::{Orchestrator, RunMode, RunSummary, Session, WatchTarget};
pub use runtime::WatchRuntime;

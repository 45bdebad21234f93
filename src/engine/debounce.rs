// src/engine/debounce.rs

//! Per-target change debouncing.
//!
//! A pure, synchronous state machine: no Tokio, no clocks of its own. The
//! runtime feeds it raw notifications and the current time of each delayed
//! check, and it answers whether a recompile should fire.
//!
//! Each target owns:
//! - a pending change set: file names reported since the last successful
//!   check, in arrival order (`None` when the platform gave no name);
//! - a debounce window: the instant before which no trigger may fire;
//! - pass bookkeeping: whether a compile pass is running and whether one
//!   more is queued behind it.
//!
//! The window is leading-edge: the first check outside the window fires and
//! pushes the window forward by the cooldown. Checks landing inside the
//! window do nothing and leave the pending set untouched.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::engine::TargetId;
use crate::watch::matcher::SuffixFilter;

/// Result of a delayed debounce check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Still inside the cooldown window; pending changes are kept.
    Suppressed,
    /// Window was open but no pending name looked like a source file.
    /// The pending set has been cleared and the window advanced.
    Irrelevant,
    /// Recompile the target. Carries the names that caused it
    /// (`None` entries are notifications without a file name).
    Trigger(Vec<Option<String>>),
}

/// What the runtime should do after a trigger fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStart {
    Start,
    /// A pass is already running; one more will start when it finishes.
    Queued,
}

#[derive(Debug, Default)]
struct DebounceState {
    pending: Vec<Option<String>>,
    next_allowed: Option<Instant>,
    in_flight: bool,
    queued: bool,
}

#[derive(Debug)]
pub struct Debouncer {
    filter: SuffixFilter,
    cooldown: Duration,
    targets: HashMap<TargetId, DebounceState>,
}

impl Debouncer {
    pub fn new(filter: SuffixFilter, cooldown: Duration) -> Self {
        Self {
            filter,
            cooldown,
            targets: HashMap::new(),
        }
    }

    pub fn register(&mut self, target: TargetId) {
        self.targets.entry(target).or_default();
    }

    pub fn is_registered(&self, target: TargetId) -> bool {
        self.targets.contains_key(&target)
    }

    /// Append a raw notification to the target's pending change set.
    ///
    /// Returns false for unknown targets.
    pub fn record(&mut self, target: TargetId, filename: Option<String>) -> bool {
        match self.targets.get_mut(&target) {
            Some(state) => {
                state.pending.push(filename);
                true
            }
            None => false,
        }
    }

    /// Names recorded since the last successful check.
    pub fn pending(&self, target: TargetId) -> &[Option<String>] {
        self.targets
            .get(&target)
            .map(|s| s.pending.as_slice())
            .unwrap_or(&[])
    }

    /// Run the delayed check for `target` at time `now`.
    pub fn check(&mut self, target: TargetId, now: Instant) -> CheckOutcome {
        let Some(state) = self.targets.get_mut(&target) else {
            return CheckOutcome::Suppressed;
        };

        if state.next_allowed.is_some_and(|deadline| now < deadline) {
            debug!(target_id = target, pending = state.pending.len(), "check inside cooldown window");
            return CheckOutcome::Suppressed;
        }

        state.next_allowed = Some(now + self.cooldown);
        let changed = std::mem::take(&mut state.pending);

        // A notification without a name might have been a source file.
        let relevant = changed
            .iter()
            .any(|name| name.as_deref().is_none_or(|n| self.filter.matches_name(n)));

        if relevant {
            debug!(target_id = target, ?changed, "debounce window open; triggering recompile");
            CheckOutcome::Trigger(changed)
        } else {
            debug!(target_id = target, ?changed, "no source files among pending changes");
            CheckOutcome::Irrelevant
        }
    }

    /// Mark a pass as starting, or queue it behind the running one.
    pub fn start_pass(&mut self, target: TargetId) -> PassStart {
        let state = self.targets.entry(target).or_default();
        if state.in_flight {
            state.queued = true;
            PassStart::Queued
        } else {
            state.in_flight = true;
            PassStart::Start
        }
    }

    /// Mark the running pass as finished.
    ///
    /// Returns true if a queued pass should start now; the target then
    /// counts as in flight again.
    pub fn finish_pass(&mut self, target: TargetId) -> bool {
        let Some(state) = self.targets.get_mut(&target) else {
            return false;
        };
        if state.queued {
            state.queued = false;
            true
        } else {
            state.in_flight = false;
            false
        }
    }

    pub fn in_flight(&self, target: TargetId) -> bool {
        self.targets.get(&target).is_some_and(|s| s.in_flight)
    }
}

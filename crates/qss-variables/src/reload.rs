//! Debounced auto-reload state.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Change notifications arm a single-shot deadline. Further notifications
//! before the deadline push it back instead of queueing another reload, so a
//! burst of writes produces exactly one reload that sees the final content.
//!
//! ```text
//!   Idle --change--> Pending --change--> Pending (deadline restarted)
//!                       |
//!                   deadline
//!                       v
//!              reload, back to Idle
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::watch::PathWatcher;

/// Single-shot deadline that restarts on every trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm the deadline at `now + delay`, replacing any pending one.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the pending deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Auto-reload state of a loader: the enable flag, the armed watch, and the
/// debounce deadline.
pub struct ReloadController {
    enabled: bool,

    /// Path the current watch was requested for
    watch_source: Option<PathBuf>,

    /// Path the watcher reports events under for `watch_source`
    watched_path: Option<PathBuf>,
    debouncer: Debouncer,
    watcher: Box<dyn PathWatcher>,
}

impl ReloadController {
    pub fn new(watcher: Box<dyn PathWatcher>, delay: Duration, enabled: bool) -> Self {
        Self {
            enabled,
            watch_source: None,
            watched_path: None,
            debouncer: Debouncer::new(delay),
            watcher,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Path change events are currently matched against, if a watch is armed.
    pub fn watched_path(&self) -> Option<&Path> {
        self.watched_path.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Enable or disable auto-reload and re-arm the watch for `source_path`.
    ///
    /// Disabling also drops a pending reload. Returns whether a watch is
    /// armed afterwards.
    pub fn set_enabled(&mut self, enabled: bool, source_path: Option<&Path>) -> bool {
        self.enabled = enabled;
        if !enabled {
            self.debouncer.cancel();
        }
        self.reconfigure(source_path)
    }

    /// Make the watch match `source_path`, watching only when enabled.
    ///
    /// An armed watch on the same path is kept as is, so changes made while a
    /// reload is being applied are still reported. Returns whether a watch is
    /// armed afterwards.
    pub fn reconfigure(&mut self, source_path: Option<&Path>) -> bool {
        let wanted = source_path.filter(|_| self.enabled);
        let unchanged = self.watched_path.is_some() && self.watch_source.as_deref() == wanted;
        if wanted.is_some() && unchanged {
            return true;
        }

        self.watch_source = None;
        if self.watched_path.take().is_some() {
            self.watcher.unwatch();
        }

        let Some(path) = wanted else {
            return false;
        };

        match self.watcher.watch(path) {
            Ok(watched) => {
                self.watch_source = Some(path.to_path_buf());
                self.watched_path = Some(watched);
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to watch stylesheet");
                false
            }
        }
    }

    /// Handle a change notification.
    ///
    /// Arms (or restarts) the debounce deadline when auto-reload is enabled
    /// and `changed_path` is the watched file. Returns whether it did.
    pub fn notify_changed(&mut self, changed_path: &Path, now: Instant) -> bool {
        let is_watched = self.watched_path.as_deref() == Some(changed_path);
        if !self.enabled || !is_watched {
            return false;
        }

        debug!(
            path = %changed_path.display(),
            restarted = self.debouncer.is_pending(),
            "Scheduling stylesheet reload"
        );
        self.debouncer.trigger(now);
        true
    }

    /// Returns true once when the pending reload is due and should run.
    pub fn take_due(&mut self, now: Instant) -> bool {
        self.debouncer.fire_if_due(now) && self.enabled
    }
}

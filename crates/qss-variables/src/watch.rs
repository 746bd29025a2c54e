//! Filesystem watching for auto-reload.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The loader only needs to arm and clear a watch on a single file; change
//! notifications are delivered separately through [`WatchEvents`] so the
//! event loop can feed them back into the loader's debouncer.

use std::path::{Path, PathBuf};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::WatchError;

/// Events emitted by a [`FileWatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file was created or modified
    Modified(PathBuf),
}

/// Capability to watch a single stylesheet path.
pub trait PathWatcher: Send {
    /// Start watching `path`, replacing any previous watch.
    ///
    /// Returns the path under which change events for this file will be
    /// reported. The loader compares incoming events against it.
    fn watch(&mut self, path: &Path) -> Result<PathBuf, WatchError>;

    /// Stop watching. Does nothing when no watch is armed.
    fn unwatch(&mut self);
}

/// Watcher that accepts every path but never produces events.
///
/// Used when change notifications are delivered by other means, or in tests
/// that call [`StylesheetLoader::on_file_changed`](crate::StylesheetLoader::on_file_changed)
/// directly.
#[derive(Debug, Clone, Default)]
pub struct NullWatcher;

impl PathWatcher for NullWatcher {
    fn watch(&mut self, path: &Path) -> Result<PathBuf, WatchError> {
        Ok(path.to_path_buf())
    }

    fn unwatch(&mut self) {}
}

/// Filesystem watcher backed by `notify`.
///
/// The parent directory of the stylesheet is watched non-recursively so that
/// editors which save by writing a new file and renaming it over the old one
/// keep being observed. Events for other files in that directory are
/// forwarded too and filtered out by the loader.
pub struct FileWatcher {
    watcher: RecommendedWatcher,

    /// Directory currently being watched
    watched_dir: Option<PathBuf>,
}

/// Receiving half of a [`FileWatcher`].
pub struct WatchEvents {
    event_rx: mpsc::UnboundedReceiver<WatchEvent>,
}

impl FileWatcher {
    /// Create a new watcher and the stream of its events.
    pub fn new() -> Result<(Self, WatchEvents), WatchError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if !is_content_change(&event.kind) {
                        return;
                    }
                    for path in event.paths {
                        debug!(path = %path.display(), "File change detected");
                        if event_tx.send(WatchEvent::Modified(path)).is_err() {
                            // Receiver dropped, nobody is listening anymore
                            break;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Filesystem watch error");
                }
            },
        )
        .map_err(|e| WatchError::Create(e.to_string()))?;

        Ok((
            Self {
                watcher,
                watched_dir: None,
            },
            WatchEvents { event_rx },
        ))
    }
}

impl PathWatcher for FileWatcher {
    fn watch(&mut self, path: &Path) -> Result<PathBuf, WatchError> {
        self.unwatch();

        let target = path.canonicalize().map_err(|e| WatchError::Watch {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| WatchError::Watch {
                path: path.to_path_buf(),
                message: "path has no parent directory".to_string(),
            })?;

        self.watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::Watch {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        debug!(path = %target.display(), "Watching stylesheet");
        self.watched_dir = Some(dir);
        Ok(target)
    }

    fn unwatch(&mut self) {
        if let Some(dir) = self.watched_dir.take() {
            if let Err(e) = self.watcher.unwatch(&dir) {
                debug!(path = %dir.display(), error = %e, "Failed to remove watch");
            }
        }
    }
}

impl WatchEvents {
    /// Receive the next watch event.
    ///
    /// Returns `None` if the watcher has been dropped.
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        self.event_rx.recv().await
    }
}

/// Check if an event kind can change what a read of the file returns.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

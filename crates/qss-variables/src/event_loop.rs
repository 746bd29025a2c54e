//! Single-task event loop that drives auto-reload.
//!
//! Copyright (c) 2025 Posit, PBC

use std::future::Future;
use std::time::Instant;

use tracing::{debug, warn};

use crate::loader::StylesheetLoader;
use crate::sink::StyleSink;
use crate::watch::{WatchEvent, WatchEvents};

/// Feed watch events into `loader` and run debounced reloads until
/// `shutdown` completes or the event stream closes.
///
/// Everything runs on the calling task: change notifications only move the
/// debounce deadline, and the reload itself runs when the deadline expires.
/// Reload failures are logged and the previously applied stylesheet stays in
/// effect.
pub async fn run_auto_reload<S, F>(
    loader: &mut StylesheetLoader<S>,
    events: &mut WatchEvents,
    shutdown: F,
) where
    S: StyleSink,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let deadline = loader.reload_deadline();
        // Evaluated even when the branch is disabled, so it needs some instant.
        let wake_at =
            deadline.map_or_else(tokio::time::Instant::now, tokio::time::Instant::from_std);

        tokio::select! {
            _ = &mut shutdown => {
                debug!("Auto-reload loop shutting down");
                break;
            }
            event = events.recv() => match event {
                Some(WatchEvent::Modified(path)) => {
                    loader.on_file_changed(&path, Instant::now());
                }
                None => {
                    debug!("Watch event stream closed");
                    break;
                }
            },
            _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                if let Some(Err(e)) = loader.poll_reload(Instant::now()) {
                    warn!(error = %e, "Auto-reload failed");
                }
            }
        }
    }
}

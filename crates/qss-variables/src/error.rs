//! Error types for stylesheet loading and watching.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or re-applying a stylesheet.
///
/// Every variant is recoverable: a failed operation leaves the previously
/// applied stylesheet and all loader state exactly as they were.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The provided stylesheet text was empty
    #[error("stylesheet data is empty")]
    EmptyStylesheet,

    /// The stylesheet file could not be read
    #[error("failed to read stylesheet {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reload was requested but no stylesheet was ever loaded from a file
    #[error("no previously loaded stylesheet path")]
    NoSourcePath,

    /// A theme switch was requested before any stylesheet was loaded
    #[error("no stylesheet loaded yet")]
    NothingLoaded,

    /// An explicit theme switch named a theme the stylesheet does not declare
    #[error("theme not available: {theme} (available: {})", .available.join(", "))]
    UnknownTheme {
        theme: String,
        available: Vec<String>,
    },
}

/// Errors raised by a [`PathWatcher`](crate::watch::PathWatcher).
#[derive(Debug, Error)]
pub enum WatchError {
    /// The watcher backend could not be created
    #[error("failed to create filesystem watcher: {0}")]
    Create(String),

    /// The given path could not be watched
    #[error("failed to watch {}: {message}", .path.display())]
    Watch { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, LoaderError>;

//! Consumers of the final stylesheet text.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The loader never renders anything itself. Every time a stylesheet is
//! (re)applied, the fully substituted text is handed to a [`StyleSink`].

use std::io::Write;
use std::path::PathBuf;

use tracing::warn;

/// Receives the final, fully substituted stylesheet text.
pub trait StyleSink {
    /// Apply a stylesheet. Called once per successful load, reload, theme
    /// switch, or variable change.
    fn apply(&mut self, stylesheet: &str);
}

impl<F> StyleSink for F
where
    F: FnMut(&str),
{
    fn apply(&mut self, stylesheet: &str) {
        self(stylesheet)
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Default)]
pub struct NullSink;

impl StyleSink for NullSink {
    fn apply(&mut self, _stylesheet: &str) {}
}

/// Sink that records every applied stylesheet in memory.
///
/// Useful for tests and for embedding the loader where the consumer pulls
/// the latest text instead of being pushed to.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    applied: Vec<String>,
}

impl MemorySink {
    /// Create an empty memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently applied stylesheet, if any.
    pub fn last(&self) -> Option<&str> {
        self.applied.last().map(String::as_str)
    }

    /// Number of times a stylesheet was applied.
    pub fn apply_count(&self) -> usize {
        self.applied.len()
    }

    /// Every applied stylesheet, oldest first.
    pub fn history(&self) -> &[String] {
        &self.applied
    }
}

impl StyleSink for MemorySink {
    fn apply(&mut self, stylesheet: &str) {
        self.applied.push(stylesheet.to_string());
    }
}

/// Sink that writes each applied stylesheet to a writer (e.g. stdout).
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> StyleSink for WriterSink<W> {
    fn apply(&mut self, stylesheet: &str) {
        let result = self
            .writer
            .write_all(stylesheet.as_bytes())
            .and_then(|()| {
                if stylesheet.ends_with('\n') {
                    Ok(())
                } else {
                    self.writer.write_all(b"\n")
                }
            })
            .and_then(|()| self.writer.flush());

        if let Err(e) = result {
            warn!(error = %e, "Failed to write stylesheet");
        }
    }
}

/// Sink that overwrites a file with each applied stylesheet.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StyleSink for FileSink {
    fn apply(&mut self, stylesheet: &str) {
        if let Err(e) = std::fs::write(&self.path, stylesheet) {
            warn!(path = %self.path.display(), error = %e, "Failed to write stylesheet");
        }
    }
}

//! Stylesheet loader: the public operation surface.
//!
//! Copyright (c) 2025 Posit, PBC

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::reload::ReloadController;
use crate::sink::{NullSink, StyleSink};
use crate::state::DocumentState;
use crate::types::VariableMap;
use crate::watch::{NullWatcher, PathWatcher};

/// Loads stylesheets with `@Variables` blocks, applies them to a
/// [`StyleSink`], and keeps them in sync with the source file.
///
/// Every successful operation hands the final stylesheet to the sink. Failed
/// operations return an error and leave both the sink and the loader state
/// untouched.
///
/// # Example
///
/// ```
/// use qss_variables::{MemorySink, StylesheetLoader};
///
/// let mut loader = StylesheetLoader::new(MemorySink::new());
/// loader
///     .load_stylesheet_from_data(
///         r#"
/// @Variables { @Color: #abc; }
/// @Variables[Name="Dark"] { @Color: #000; }
/// QWidget { color: @Color; }
/// "#,
///         "Dark",
///     )
///     .unwrap();
///
/// assert!(loader.current_stylesheet().contains("color: #000;"));
///
/// loader.set_theme("").unwrap();
/// assert!(loader.current_stylesheet().contains("color: #abc;"));
/// assert_eq!(loader.sink().apply_count(), 2);
/// ```
pub struct StylesheetLoader<S: StyleSink = NullSink> {
    state: DocumentState,
    reload: ReloadController,
    sink: S,
}

impl<S: StyleSink> StylesheetLoader<S> {
    /// Create a loader with the default configuration and no file watching
    /// backend.
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, NullWatcher, LoaderConfig::default())
    }

    /// Create a loader with an explicit watcher and configuration.
    pub fn with_config(sink: S, watcher: impl PathWatcher + 'static, config: LoaderConfig) -> Self {
        Self {
            state: DocumentState::default(),
            reload: ReloadController::new(
                Box::new(watcher),
                config.reload_debounce,
                config.auto_reload,
            ),
            sink,
        }
    }

    /// Load a stylesheet file and apply it with `theme_name`.
    ///
    /// An empty theme name uses the untagged `@Variables` block only. A theme
    /// that is not declared silently falls back to the untagged block. Bytes
    /// that are not valid UTF-8 are replaced rather than rejected.
    pub fn load_stylesheet(&mut self, file_path: impl AsRef<Path>, theme_name: &str) -> Result<()> {
        let file_path = file_path.as_ref();
        let bytes = std::fs::read(file_path).map_err(|source| {
            warn!(path = %file_path.display(), error = %source, "Failed to load stylesheet");
            LoaderError::Read {
                path: file_path.to_path_buf(),
                source,
            }
        })?;
        let raw = String::from_utf8_lossy(&bytes).into_owned();

        self.process_and_apply(raw, theme_name, Some(file_path.to_path_buf()))
    }

    /// Load a stylesheet from in-memory text and apply it with `theme_name`.
    ///
    /// In-memory stylesheets have no source file, so any active watch is
    /// cleared.
    pub fn load_stylesheet_from_data(&mut self, stylesheet: &str, theme_name: &str) -> Result<()> {
        self.process_and_apply(stylesheet.to_string(), theme_name, None)
    }

    /// Re-read the last loaded file and apply it with the current theme.
    pub fn reload_stylesheet(&mut self) -> Result<()> {
        let Some(path) = self.state.source_path.clone() else {
            warn!("Reload failed: no previously loaded stylesheet path");
            return Err(LoaderError::NoSourcePath);
        };
        let theme = self.current_theme_name().to_string();
        self.load_stylesheet(path, &theme)
    }

    /// Switch to `theme_name` and re-apply the loaded stylesheet.
    ///
    /// An empty name selects the untagged block. Any other name must be one
    /// of [`available_themes`](Self::available_themes). The stored text is
    /// re-processed without reading the file again.
    pub fn set_theme(&mut self, theme_name: &str) -> Result<()> {
        if !theme_name.is_empty() && !self.state.available_themes.contains(theme_name) {
            warn!(
                theme = %theme_name,
                available = ?self.state.available_themes,
                "Theme not available"
            );
            return Err(LoaderError::UnknownTheme {
                theme: theme_name.to_string(),
                available: self.state.available_themes.iter().cloned().collect(),
            });
        }

        if !self.state.is_loaded() {
            warn!(theme = %theme_name, "Cannot set theme: no stylesheet loaded yet");
            return Err(LoaderError::NothingLoaded);
        }

        let raw = self.state.raw_text.clone();
        let source_path = self.state.source_path.clone();
        self.process_and_apply(raw, theme_name, source_path)
    }

    /// The stylesheet as last applied, with variables substituted.
    pub fn current_stylesheet(&self) -> String {
        self.state.final_text.clone()
    }

    /// Themes declared by the loaded stylesheet.
    pub fn available_themes(&self) -> BTreeSet<String> {
        self.state.available_themes.clone()
    }

    /// The theme requested by the last load, or an empty string.
    pub fn current_theme_name(&self) -> &str {
        self.state.current_theme.as_deref().unwrap_or_default()
    }

    /// A copy of the resolved variables.
    pub fn variables(&self) -> VariableMap {
        self.state.resolved_variables.clone()
    }

    /// Check if a resolved variable exists (name without `@`).
    pub fn has_variable(&self, name: &str) -> bool {
        self.state.resolved_variables.contains_key(name)
    }

    /// Set or override a variable and re-apply the stylesheet.
    ///
    /// The value is used verbatim; references inside it are not resolved.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        debug!(variable = %name, "Setting variable");
        self.state.resolved_variables.insert(name, value.into());
        self.reapply();
    }

    /// Remove a variable and re-apply the stylesheet.
    ///
    /// Returns false, without re-applying, if the variable did not exist.
    pub fn remove_variable(&mut self, name: &str) -> bool {
        if self.state.resolved_variables.remove(name).is_none() {
            return false;
        }
        debug!(variable = %name, "Removed variable");
        self.reapply();
        true
    }

    /// Enable or disable watching the loaded file for changes.
    ///
    /// Returns true if a watch was armed, which requires enabling, a
    /// stylesheet loaded from a file, and a watcher that accepts the path.
    /// Disabling drops any reload that is still pending.
    pub fn enable_auto_reload(&mut self, enabled: bool) -> bool {
        let armed = self
            .reload
            .set_enabled(enabled, self.state.source_path.as_deref());
        debug!(enabled, armed, "Configured auto-reload");
        armed
    }

    /// Whether auto-reload is enabled.
    pub fn is_auto_reload_enabled(&self) -> bool {
        self.reload.is_enabled()
    }

    /// Path change notifications are matched against, if a watch is armed.
    pub fn watched_path(&self) -> Option<&Path> {
        self.reload.watched_path()
    }

    /// File the current stylesheet was loaded from.
    pub fn source_path(&self) -> Option<&Path> {
        self.state.source_path.as_deref()
    }

    /// Placeholders that had no value during the last substitution.
    pub fn unresolved_variables(&self) -> &BTreeSet<String> {
        &self.state.unresolved
    }

    /// Feed a file change notification into the reload debouncer.
    ///
    /// Only changes to the watched file count, and only while auto-reload is
    /// enabled. Each accepted notification restarts the debounce delay.
    pub fn on_file_changed(&mut self, changed_path: &Path, now: Instant) {
        self.reload.notify_changed(changed_path, now);
    }

    /// When the pending reload is due, if one is scheduled.
    pub fn reload_deadline(&self) -> Option<Instant> {
        self.reload.deadline()
    }

    /// Whether a reload is scheduled.
    pub fn is_reload_pending(&self) -> bool {
        self.reload.is_pending()
    }

    /// Run the pending reload if its deadline has passed.
    ///
    /// Returns `None` when nothing was due.
    pub fn poll_reload(&mut self, now: Instant) -> Option<Result<()>> {
        if !self.reload.take_due(now) {
            return None;
        }

        if let Some(path) = self.source_path() {
            debug!(path = %path.display(), "Auto-reloading stylesheet");
        }
        Some(self.reload_stylesheet())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn process_and_apply(
        &mut self,
        raw: String,
        theme_name: &str,
        source_path: Option<PathBuf>,
    ) -> Result<()> {
        let state = DocumentState::process(raw, theme_name, source_path).inspect_err(|e| {
            warn!(error = %e, "Stylesheet not applied");
        })?;

        warn_unresolved(&state.unresolved);
        self.sink.apply(&state.final_text);
        self.state = state;
        self.reload.reconfigure(self.state.source_path.as_deref());

        match &self.state.source_path {
            Some(path) => info!(path = %path.display(), theme = %theme_name, "Loaded stylesheet"),
            None => info!(theme = %theme_name, "Loaded stylesheet from data"),
        }

        Ok(())
    }

    fn reapply(&mut self) {
        self.state.resubstitute();
        warn_unresolved(&self.state.unresolved);
        self.sink.apply(&self.state.final_text);
    }
}

impl Default for StylesheetLoader<NullSink> {
    fn default() -> Self {
        Self::new(NullSink)
    }
}

fn warn_unresolved(unresolved: &BTreeSet<String>) {
    if !unresolved.is_empty() {
        warn!(variables = ?unresolved, "Unresolved variable(s) remain in stylesheet");
    }
}

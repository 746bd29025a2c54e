//! Loader configuration.
//!
//! Copyright (c) 2025 Posit, PBC

use std::time::Duration;

/// Default debounce delay between the last file change and the reload (in milliseconds).
/// Editors often write a file in several steps; this coalesces them.
pub const DEFAULT_RELOAD_DEBOUNCE_MS: u64 = 150;

/// Configuration for a [`StylesheetLoader`](crate::StylesheetLoader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Quiet period after the last change notification before reloading
    pub reload_debounce: Duration,

    /// Whether the loaded file is watched from the start.
    /// Default: false.
    pub auto_reload: bool,
}

impl LoaderConfig {
    /// Set the debounce delay in milliseconds.
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.reload_debounce = Duration::from_millis(debounce_ms);
        self
    }

    /// Enable or disable auto-reload from the start.
    pub fn with_auto_reload(mut self, enabled: bool) -> Self {
        self.auto_reload = enabled;
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            reload_debounce: Duration::from_millis(DEFAULT_RELOAD_DEBOUNCE_MS),
            auto_reload: false,
        }
    }
}

//! Variable blocks, themes and live reloading for QSS stylesheets.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate provides:
//! - `@Variables { ... }` and `@Variables[Name="..."] { ... }` block parsing
//! - Theme discovery and theme-over-default precedence
//! - Recursive resolution of references between variables, with cycle detection
//! - Exact-token substitution of `@name` placeholders
//! - A loader that applies the result to a [`StyleSink`] and reloads the
//!   source file after debounced change notifications

mod block;
mod config;
mod error;
mod event_loop;
mod loader;
mod parse;
mod reload;
mod resolve;
mod sink;
mod state;
mod substitute;
mod themes;
mod types;
mod watch;

pub use block::{extract_variables_block, remove_variables_blocks};
pub use config::{DEFAULT_RELOAD_DEBOUNCE_MS, LoaderConfig};
pub use error::{LoaderError, Result, WatchError};
pub use event_loop::run_auto_reload;
pub use loader::StylesheetLoader;
pub use parse::parse_variables_block;
pub use reload::{Debouncer, ReloadController};
pub use resolve::{resolve_all, resolve_variable};
pub use sink::{FileSink, MemorySink, NullSink, StyleSink, WriterSink};
pub use state::DocumentState;
pub use substitute::{Substitution, find_unresolved, substitute_variables};
pub use themes::parse_available_themes;
pub use types::{DEFAULT_THEME_NAME, VariableMap};
pub use watch::{FileWatcher, NullWatcher, PathWatcher, WatchEvent, WatchEvents};

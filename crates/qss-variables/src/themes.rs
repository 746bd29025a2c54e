//! Theme discovery.
//!
//! Copyright (c) 2025 Posit, PBC

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::DEFAULT_THEME_NAME;

/// Matches a theme tag and captures the quoted name.
static THEME_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@Variables\[Name="([^"]*)"\]"#).unwrap());

/// Matches the opening of an untagged block.
static DEFAULT_BLOCK_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"@Variables\s*\{").unwrap());

/// Collect every theme declared in `stylesheet`.
///
/// Each `@Variables[Name="..."]` tag contributes its name; empty names are
/// ignored. [`DEFAULT_THEME_NAME`] is added when at least one untagged
/// `@Variables { ... }` block exists.
///
/// # Example
///
/// ```
/// use qss_variables::parse_available_themes;
///
/// let themes = parse_available_themes(r#"
/// @Variables[Name="Dark"] { @C: #000; }
/// @Variables { @C: #abc; }
/// "#);
///
/// assert!(themes.contains("Dark"));
/// assert!(themes.contains("Default"));
/// assert_eq!(themes.len(), 2);
/// ```
pub fn parse_available_themes(stylesheet: &str) -> BTreeSet<String> {
    let mut themes: BTreeSet<String> = THEME_TAG
        .captures_iter(stylesheet)
        .map(|captures| captures[1].to_string())
        .filter(|name| !name.is_empty())
        .collect();

    if DEFAULT_BLOCK_OPEN.is_match(stylesheet) {
        themes.insert(DEFAULT_THEME_NAME.to_string());
    }

    themes
}

//! `@Variables` block extraction and removal.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A stylesheet may declare one untagged block and any number of blocks
//! tagged with a theme name:
//!
//! ```text
//! @Variables {
//!     @ColorPrimary: #123456;
//! }
//!
//! @Variables[Name="Dark"] {
//!     @ColorPrimary: #000000;
//! }
//! ```
//!
//! Block bodies are matched non-greedily up to the first closing brace, so
//! nested braces inside a block are not supported.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches the first untagged block and captures its body.
static DEFAULT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)@Variables\s*\{(.*?)\}").unwrap());

/// Matches every block, tagged or not, for removal from the emitted text.
static ANY_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)@Variables(\[Name="[^"]*"\])?\s*\{.*?\}"#).unwrap());

/// Extract the body of the `@Variables` block for `theme_name`.
///
/// When `theme_name` is empty, or the tagged block is missing or empty, the
/// body of the untagged block is returned instead. Returns an empty string if
/// neither exists; malformed blocks are treated as missing.
///
/// # Example
///
/// ```
/// use qss_variables::extract_variables_block;
///
/// let qss = r#"
/// @Variables { @Color: #abc; }
/// @Variables[Name="Dark"] { @Color: #000; }
/// "#;
///
/// assert_eq!(extract_variables_block(qss, "Dark").trim(), "@Color: #000;");
/// assert_eq!(extract_variables_block(qss, "").trim(), "@Color: #abc;");
/// assert_eq!(extract_variables_block(qss, "Missing").trim(), "@Color: #abc;");
/// ```
pub fn extract_variables_block(stylesheet: &str, theme_name: &str) -> String {
    if !theme_name.is_empty() {
        let themed = theme_block_regex(theme_name);
        if let Some(body) = themed
            .captures(stylesheet)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
            .filter(|body| !body.is_empty())
        {
            return body.to_string();
        }
    }

    DEFAULT_BLOCK
        .captures(stylesheet)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Remove every `@Variables` block, tagged or untagged, from `stylesheet`.
///
/// Everything outside the blocks is preserved byte for byte.
pub fn remove_variables_blocks(stylesheet: &str) -> String {
    ANY_BLOCK.replace_all(stylesheet, "").into_owned()
}

fn theme_block_regex(theme_name: &str) -> Regex {
    let pattern = format!(
        r#"(?s)@Variables\[Name="{}"\]\s*\{{(.*?)\}}"#,
        regex::escape(theme_name)
    );
    // The theme name is escaped, so the pattern is always valid.
    Regex::new(&pattern).unwrap()
}

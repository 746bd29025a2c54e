//! Core types shared by the parsing, resolution and substitution stages.
//!
//! Copyright (c) 2025 Posit, PBC

use std::collections::BTreeMap;

/// Variable name (without the leading `@`) to value.
///
/// Before resolution values may still contain `@reference` tokens; after
/// resolution every reference has been expanded or replaced by an empty
/// string.
pub type VariableMap = BTreeMap<String, String>;

/// Name reported by theme discovery when an untagged `@Variables` block exists.
pub const DEFAULT_THEME_NAME: &str = "Default";

/// Returns true for characters that may appear in a variable name.
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

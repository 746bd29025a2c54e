//! Placeholder substitution.
//!
//! Copyright (c) 2025 Posit, PBC

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{VariableMap, is_name_char};

/// Matches any `@identifier`-shaped token left in substituted text.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"@([A-Za-z0-9_\-]+)").unwrap());

/// Result of substituting variables into a stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    /// The stylesheet with every known placeholder replaced
    pub text: String,

    /// Names of `@placeholders` still present in `text`
    pub unresolved: BTreeSet<String>,
}

impl Substitution {
    /// Check whether every placeholder was replaced
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Replace every `@name` placeholder in `stylesheet` with its value.
///
/// Names are substituted longest first, and a placeholder only matches when
/// it is not followed by another name character, so `@Color` never matches
/// inside `@ColorPrimary`. Placeholders without a value are left in place
/// and reported in [`Substitution::unresolved`].
///
/// # Example
///
/// ```
/// use qss_variables::{VariableMap, substitute_variables};
///
/// let variables = VariableMap::from([
///     ("Color".to_string(), "#111111".to_string()),
///     ("ColorPrimary".to_string(), "#222222".to_string()),
/// ]);
///
/// let result = substitute_variables("a: @ColorPrimary; b: @Color; c: @Other;", &variables);
/// assert_eq!(result.text, "a: #222222; b: #111111; c: @Other;");
/// assert!(result.unresolved.contains("Other"));
/// ```
pub fn substitute_variables(stylesheet: &str, variables: &VariableMap) -> Substitution {
    let mut names: Vec<&String> = variables.keys().collect();
    // Stable sort keeps map order (alphabetical) among names of equal length.
    names.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut text = stylesheet.to_string();
    for name in names {
        text = replace_placeholder(&text, name, &variables[name]);
    }

    let unresolved = find_unresolved(&text);
    Substitution { text, unresolved }
}

/// Collect the names of all `@identifier` tokens in `text`.
pub fn find_unresolved(text: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|captures| captures[1].to_string())
        .collect()
}

fn replace_placeholder(text: &str, name: &str, value: &str) -> String {
    let token = format!("@{}", name);
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for (start, _) in text.match_indices(&token) {
        let end = start + token.len();
        let followed_by_name_char = text[end..].chars().next().is_some_and(is_name_char);
        if followed_by_name_char {
            continue;
        }
        output.push_str(&text[last..start]);
        output.push_str(value);
        last = end;
    }

    output.push_str(&text[last..]);
    output
}

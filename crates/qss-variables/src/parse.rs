//! Variable declarations inside a `@Variables` block body.
//!
//! Copyright (c) 2025 Posit, PBC

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::VariableMap;

/// Matches `@name : value ;`, capturing the name (group 1) and the raw value
/// up to the terminating semicolon (group 2).
static DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([A-Za-z0-9_\-]+)\s*:\s*([^;]+);").unwrap());

/// Parse the declarations of a block body into `variables`.
///
/// Values are trimmed. Later declarations overwrite earlier ones with the
/// same name, which is how a theme block overrides the default block when
/// both are parsed into the same map.
///
/// # Example
///
/// ```
/// use qss_variables::{VariableMap, parse_variables_block};
///
/// let mut variables = VariableMap::new();
/// parse_variables_block("@Color: #abc; @Accent: @Color;", &mut variables);
///
/// assert_eq!(variables["Color"], "#abc");
/// assert_eq!(variables["Accent"], "@Color");
/// ```
pub fn parse_variables_block(block: &str, variables: &mut VariableMap) {
    for captures in DECLARATION.captures_iter(block) {
        let name = &captures[1];
        let value = captures[2].trim();
        variables.insert(name.to_string(), value.to_string());
    }
}

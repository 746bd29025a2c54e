//! Recursive resolution of variable-to-variable references.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A value may reference other variables by name:
//!
//! ```text
//! @Base: #101010;
//! @Accent: @Base;
//! @Border: 1px solid @Accent;
//! ```
//!
//! Resolution expands each reference to the fully resolved value of the
//! referenced variable. Unknown references and references that re-enter a
//! variable already being resolved (a cycle) expand to the empty string.

use std::collections::{HashMap, HashSet};
use std::hash::BuildHasher;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::types::VariableMap;

/// Matches a whole `@name` reference token.
static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@([A-Za-z0-9_\-]+)").unwrap());

/// Resolve `name` against the raw `variables`.
///
/// `in_progress` holds the names currently being resolved by the enclosing
/// top-level call. A reference to one of them resolves to an empty string,
/// which guarantees termination for direct and indirect cycles. Names are
/// removed again once resolved, so the same variable may be referenced
/// several times from one value.
///
/// Returns an empty string when `name` is not declared.
pub fn resolve_variable<H: BuildHasher>(
    name: &str,
    variables: &VariableMap,
    in_progress: &mut HashSet<String, H>,
) -> String {
    resolve_with(name, variables, in_progress, &mut HashMap::new())
}

/// Resolve every entry of `variables`.
///
/// Each entry is resolved independently with a fresh in-progress set.
/// Values whose references never run into a cycle are shared between
/// entries, so long chains are walked once.
///
/// # Example
///
/// ```
/// use qss_variables::{VariableMap, resolve_all};
///
/// let raw = VariableMap::from([
///     ("A".to_string(), "@B".to_string()),
///     ("B".to_string(), "@C".to_string()),
///     ("C".to_string(), "#010203".to_string()),
/// ]);
///
/// let resolved = resolve_all(&raw);
/// assert_eq!(resolved["A"], "#010203");
/// assert_eq!(resolved["B"], "#010203");
/// ```
pub fn resolve_all(variables: &VariableMap) -> VariableMap {
    let mut settled = HashMap::new();
    variables
        .keys()
        .map(|name| {
            let mut in_progress = HashSet::new();
            let value = resolve_with(name, variables, &mut in_progress, &mut settled);
            (name.clone(), value)
        })
        .collect()
}

/// A variable whose value is being expanded.
struct Frame<'a> {
    name: &'a str,
    value: &'a str,

    /// Byte offset in `value` up to which text has been copied to `output`
    pos: usize,
    output: String,

    /// False once a reference in this subtree was cut because of a cycle
    acyclic: bool,
}

impl<'a> Frame<'a> {
    fn new(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            value,
            pos: 0,
            output: String::with_capacity(value.len()),
            acyclic: true,
        }
    }
}

/// Depth-first expansion with an explicit stack, so chain length is bounded
/// by the heap rather than the thread stack.
///
/// `settled` caches values whose whole reference graph is acyclic. Those
/// cannot depend on which names are in progress, so they are valid in any
/// context.
fn resolve_with<'a, H: BuildHasher>(
    name: &str,
    variables: &'a VariableMap,
    in_progress: &mut HashSet<String, H>,
    settled: &mut HashMap<&'a str, String>,
) -> String {
    if in_progress.contains(name) {
        debug!(variable = %name, "Cyclic variable reference resolved to empty value");
        return String::new();
    }
    let Some((root, value)) = variables.get_key_value(name) else {
        return String::new();
    };
    if let Some(value) = settled.get(root.as_str()) {
        return value.clone();
    }

    in_progress.insert(root.clone());
    let mut stack = vec![Frame::new(root, value)];
    let mut resolved = String::new();

    while let Some(mut frame) = stack.pop() {
        if let Some(found) = REFERENCE.find_at(frame.value, frame.pos) {
            frame.output.push_str(&frame.value[frame.pos..found.start()]);
            frame.pos = found.end();
            let reference = &found.as_str()[1..];

            let mut child = None;
            if in_progress.contains(reference) {
                debug!(variable = %reference, "Cyclic variable reference resolved to empty value");
                frame.acyclic = false;
            } else if let Some((key, value)) = variables.get_key_value(reference) {
                match settled.get(key.as_str()) {
                    Some(cached) => frame.output.push_str(cached),
                    None => {
                        in_progress.insert(key.clone());
                        child = Some(Frame::new(key, value));
                    }
                }
            }

            stack.push(frame);
            stack.extend(child);
            continue;
        }

        // Fully expanded: hand the result to the parent frame
        frame.output.push_str(&frame.value[frame.pos..]);
        in_progress.remove(frame.name);
        if frame.acyclic {
            settled.insert(frame.name, frame.output.clone());
        }
        match stack.last_mut() {
            Some(parent) => {
                parent.output.push_str(&frame.output);
                parent.acyclic &= frame.acyclic;
            }
            None => resolved = frame.output,
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(entries: &[(&str, &str)]) -> VariableMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_literal_value_unchanged() {
        let vars = map(&[("Color", "#abcdef")]);
        assert_eq!(resolve_all(&vars)["Color"], "#abcdef");
    }

    #[test]
    fn test_chain_resolution() {
        let vars = map(&[("A", "@B"), ("B", "@C"), ("C", "#010203")]);
        let resolved = resolve_all(&vars);
        assert_eq!(resolved["A"], "#010203");
        assert_eq!(resolved["B"], "#010203");
        assert_eq!(resolved["C"], "#010203");
    }

    #[test]
    fn test_direct_cycle_resolves_empty() {
        let vars = map(&[("A", "@B"), ("B", "@A")]);
        let resolved = resolve_all(&vars);
        assert_eq!(resolved["A"], "");
        assert_eq!(resolved["B"], "");
    }

    #[test]
    fn test_self_reference_resolves_empty() {
        let vars = map(&[("A", "1px solid @A")]);
        assert_eq!(resolve_all(&vars)["A"], "1px solid ");
    }

    #[test]
    fn test_indirect_cycle_terminates() {
        let vars = map(&[("A", "@B"), ("B", "@C"), ("C", "@A"), ("D", "@A")]);
        let resolved = resolve_all(&vars);
        assert!(resolved.values().all(String::is_empty));
    }

    #[test]
    fn test_unknown_reference_resolves_empty() {
        let vars = map(&[("Border", "1px solid @Missing")]);
        assert_eq!(resolve_all(&vars)["Border"], "1px solid ");
    }

    #[test]
    fn test_unknown_top_level_name() {
        let vars = map(&[("A", "1")]);
        let mut in_progress = HashSet::new();
        assert_eq!(resolve_variable("Nope", &vars, &mut in_progress), "");
        assert!(in_progress.is_empty());
    }

    #[test]
    fn test_reference_matches_whole_name() {
        let vars = map(&[
            ("Color", "#111111"),
            ("ColorPrimary", "#222222"),
            ("Use", "@ColorPrimary @Color"),
        ]);
        assert_eq!(resolve_all(&vars)["Use"], "#222222 #111111");
    }

    #[test]
    fn test_repeated_reference_in_one_value() {
        let vars = map(&[("Base", "#101010"), ("Pair", "@Base @Base")]);
        assert_eq!(resolve_all(&vars)["Pair"], "#101010 #101010");
    }

    #[test]
    fn test_diamond_resolves_both_branches() {
        let vars = map(&[("A", "@B/@C"), ("B", "@D"), ("C", "@D"), ("D", "x")]);
        assert_eq!(resolve_all(&vars)["A"], "x/x");
    }

    #[test]
    fn test_in_progress_set_is_restored() {
        let vars = map(&[("A", "@B"), ("B", "1")]);
        let mut in_progress = HashSet::new();
        assert_eq!(resolve_variable("A", &vars, &mut in_progress), "1");
        assert!(in_progress.is_empty());
    }

    #[test]
    fn test_cycle_values_depend_on_entry_point() {
        let vars = map(&[("A", "x@B"), ("B", "y@A")]);
        let resolved = resolve_all(&vars);
        assert_eq!(resolved["A"], "xy");
        assert_eq!(resolved["B"], "yx");
    }

    #[test]
    fn test_acyclic_tail_of_cycle_is_shared() {
        let vars = map(&[("A", "@B@T"), ("B", "@A"), ("T", "@U"), ("U", "1")]);
        let resolved = resolve_all(&vars);
        assert_eq!(resolved["A"], "1");
        assert_eq!(resolved["B"], "1");
        assert_eq!(resolved["T"], "1");
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let depth = 50_000;
        let mut vars: VariableMap = (0..depth)
            .map(|i| (format!("V{i}"), format!("@V{}", i + 1)))
            .collect();
        vars.insert(format!("V{depth}"), "#010203".to_string());

        let mut in_progress = HashSet::new();
        assert_eq!(resolve_variable("V0", &vars, &mut in_progress), "#010203");
        assert!(in_progress.is_empty());

        let resolved = resolve_all(&vars);
        assert!(resolved.values().all(|v| v == "#010203"));
    }
}

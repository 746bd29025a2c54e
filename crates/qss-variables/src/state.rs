//! Loaded document state and the parse / resolve / substitute pipeline.
//!
//! Copyright (c) 2025 Posit, PBC

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::block::{extract_variables_block, remove_variables_blocks};
use crate::error::{LoaderError, Result};
use crate::parse::parse_variables_block;
use crate::resolve::resolve_all;
use crate::substitute::substitute_variables;
use crate::themes::parse_available_themes;
use crate::types::VariableMap;

/// Everything the loader knows about the currently applied stylesheet.
///
/// A new state is built from scratch by [`DocumentState::process`] and
/// swapped in as a whole, so a failed load never leaves it half updated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    /// Stylesheet text as read, including `@Variables` blocks
    pub raw_text: String,

    /// File the text came from; `None` for in-memory stylesheets
    pub source_path: Option<PathBuf>,

    /// Themes declared in `raw_text`
    pub available_themes: BTreeSet<String>,

    /// Theme requested by the last load; `None` means the default block
    pub current_theme: Option<String>,

    /// Fully resolved variables, including later `set_variable` overrides
    pub resolved_variables: VariableMap,

    /// `raw_text` with every `@Variables` block removed
    pub stripped_text: String,

    /// `stripped_text` after substitution; what the sink last received
    pub final_text: String,

    /// Placeholders left in `final_text`
    pub unresolved: BTreeSet<String>,
}

impl DocumentState {
    /// Run the load pipeline on `raw_text` for `theme_name`.
    ///
    /// 1. Discover the declared themes
    /// 2. Parse the default block, then overlay the theme block (if any)
    /// 3. Resolve references between variables
    /// 4. Strip all blocks and substitute the resolved values
    pub fn process(
        raw_text: String,
        theme_name: &str,
        source_path: Option<PathBuf>,
    ) -> Result<Self> {
        if raw_text.is_empty() {
            return Err(LoaderError::EmptyStylesheet);
        }

        let available_themes = parse_available_themes(&raw_text);

        let mut raw_variables = VariableMap::new();
        parse_variables_block(&extract_variables_block(&raw_text, ""), &mut raw_variables);
        if !theme_name.is_empty() {
            parse_variables_block(
                &extract_variables_block(&raw_text, theme_name),
                &mut raw_variables,
            );
        }

        let resolved_variables = resolve_all(&raw_variables);
        let stripped_text = remove_variables_blocks(&raw_text);
        let substitution = substitute_variables(&stripped_text, &resolved_variables);

        Ok(Self {
            raw_text,
            source_path,
            available_themes,
            current_theme: Some(theme_name.to_string()).filter(|t| !t.is_empty()),
            resolved_variables,
            stripped_text,
            final_text: substitution.text,
            unresolved: substitution.unresolved,
        })
    }

    /// Whether a stylesheet has been loaded.
    pub fn is_loaded(&self) -> bool {
        !self.raw_text.is_empty()
    }

    /// Recompute `final_text` from `stripped_text` and the current variables.
    pub fn resubstitute(&mut self) {
        let substitution = substitute_variables(&self.stripped_text, &self.resolved_variables);
        self.final_text = substitution.text;
        self.unresolved = substitution.unresolved;
    }
}

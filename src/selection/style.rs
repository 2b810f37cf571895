//! The one global style rule that hides native text selection while cells
//! are selected.

use std::collections::BTreeMap;

/// Fixed id of the injected style element.
pub const SELECTION_STYLE_ID: &str = "__spantable_selection__";

/// Rule suppressing native selection highlighting inside tables.
pub const SELECTION_STYLE_RULE: &str = "table *::selection { background: none; }";

/// A place style rules can be injected into, keyed by id.
pub trait SelectionStyle {
    fn has_style(&self, id: &str) -> bool;
    fn insert_style(&mut self, id: &str, rule: &str);
    fn remove_style(&mut self, id: &str);
}

/// Install the selection rule unless it is already present.
pub fn add_selection_style<S: SelectionStyle + ?Sized>(styles: &mut S) {
    if !styles.has_style(SELECTION_STYLE_ID) {
        styles.insert_style(SELECTION_STYLE_ID, SELECTION_STYLE_RULE);
    }
}

pub fn remove_selection_style<S: SelectionStyle + ?Sized>(styles: &mut S) {
    if styles.has_style(SELECTION_STYLE_ID) {
        styles.remove_style(SELECTION_STYLE_ID);
    }
}

/// In-memory style sheet for hosts without a DOM.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    rules: BTreeMap<String, String>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(&self, id: &str) -> Option<&str> {
        self.rules.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl SelectionStyle for StyleRegistry {
    fn has_style(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    fn insert_style(&mut self, id: &str, rule: &str) {
        self.rules.insert(id.to_string(), rule.to_string());
    }

    fn remove_style(&mut self, id: &str) {
        self.rules.remove(id);
    }
}

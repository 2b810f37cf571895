//! Per-editor interaction state.
//!
//! Several editors can share one process, so nothing here is a bare global:
//! every flag lives in an entry keyed by the editor's identity, created on
//! first use and dropped with [`ComponentStore::remove_editor`] or
//! [`ComponentStore::dispose`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one editor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EditorId(pub u32);

/// Called with `true` when resizing must be suppressed and `false` when it may resume.
pub type DisableListener = Box<dyn FnMut(bool)>;

#[derive(Default)]
struct EditorEntry {
    anchor_cell: Option<String>,
    focus_cell: Option<String>,
    cell_selecting: bool,
    resize_disabled: bool,
    listeners: Vec<DisableListener>,
}

impl EditorEntry {
    fn notify(&mut self, disabled: bool) {
        for listener in &mut self.listeners {
            listener(disabled);
        }
    }
}

impl fmt::Debug for EditorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorEntry")
            .field("anchor_cell", &self.anchor_cell)
            .field("focus_cell", &self.focus_cell)
            .field("cell_selecting", &self.cell_selecting)
            .field("resize_disabled", &self.resize_disabled)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Identity-keyed store of selection and resize flags.
#[derive(Debug, Default)]
pub struct ComponentStore {
    editors: HashMap<EditorId, EditorEntry>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, editor: EditorId) -> &mut EditorEntry {
        self.editors.entry(editor).or_default()
    }

    /// Cell where the current drag-selection started
    pub fn set_anchor_cell(&mut self, editor: EditorId, key: Option<String>) {
        self.entry(editor).anchor_cell = key;
    }

    pub fn anchor_cell(&self, editor: EditorId) -> Option<&str> {
        self.editors.get(&editor)?.anchor_cell.as_deref()
    }

    /// Cell currently under the pointer during a drag-selection
    pub fn set_focus_cell(&mut self, editor: EditorId, key: Option<String>) {
        self.entry(editor).focus_cell = key;
    }

    pub fn focus_cell(&self, editor: EditorId) -> Option<&str> {
        self.editors.get(&editor)?.focus_cell.as_deref()
    }

    /// Mark a cell selection in progress; resizing is suppressed meanwhile.
    pub fn set_cell_selecting(&mut self, editor: EditorId) {
        let entry = self.entry(editor);
        entry.cell_selecting = true;
        entry.notify(true);
    }

    /// End the cell selection; resizing returns to the editor's own setting.
    pub fn clear_cell_selecting(&mut self, editor: EditorId) {
        let entry = self.entry(editor);
        entry.cell_selecting = false;
        let disabled = entry.resize_disabled;
        entry.notify(disabled);
    }

    pub fn is_cell_selecting(&self, editor: EditorId) -> bool {
        self.editors
            .get(&editor)
            .is_some_and(|entry| entry.cell_selecting)
    }

    /// Register a listener; it is called immediately with the current setting.
    pub fn subscribe_disable_resizing(&mut self, editor: EditorId, mut listener: DisableListener) {
        let entry = self.entry(editor);
        listener(entry.resize_disabled);
        entry.listeners.push(listener);
    }

    pub fn set_disable_resizing(&mut self, editor: EditorId, disabled: bool) {
        let entry = self.entry(editor);
        entry.resize_disabled = disabled;
        entry.notify(disabled);
    }

    pub fn is_resize_disabled(&self, editor: EditorId) -> bool {
        self.editors
            .get(&editor)
            .is_some_and(|entry| entry.resize_disabled)
    }

    /// Forget one editor's state and listeners
    pub fn remove_editor(&mut self, editor: EditorId) {
        self.editors.remove(&editor);
    }

    /// Forget every editor
    pub fn dispose(&mut self) {
        self.editors.clear();
    }

    pub fn editor_count(&self) -> usize {
        self.editors.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<bool>>>, DisableListener) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, Box::new(move |v| sink.borrow_mut().push(v)))
    }

    #[test]
    fn test_subscribe_reports_current_value() {
        let mut store = ComponentStore::new();
        let editor = EditorId(1);
        store.set_disable_resizing(editor, true);
        let (seen, listener) = recorder();
        store.subscribe_disable_resizing(editor, listener);
        assert_eq!(*seen.borrow(), vec![true]);
    }

    #[test]
    fn test_cell_selecting_suppresses_then_restores() {
        let mut store = ComponentStore::new();
        let editor = EditorId(1);
        let (seen, listener) = recorder();
        store.subscribe_disable_resizing(editor, listener);

        store.set_cell_selecting(editor);
        assert!(store.is_cell_selecting(editor));
        store.clear_cell_selecting(editor);
        assert!(!store.is_cell_selecting(editor));

        assert_eq!(*seen.borrow(), vec![false, true, false]);
    }

    #[test]
    fn test_editors_are_isolated() {
        let mut store = ComponentStore::new();
        let (a, b) = (EditorId(1), EditorId(2));
        let (seen_b, listener) = recorder();
        store.subscribe_disable_resizing(b, listener);

        store.set_anchor_cell(a, Some("x".to_string()));
        store.set_cell_selecting(a);
        store.set_disable_resizing(a, true);

        assert_eq!(store.anchor_cell(a), Some("x"));
        assert_eq!(store.anchor_cell(b), None);
        assert!(!store.is_cell_selecting(b));
        assert!(!store.is_resize_disabled(b));
        assert_eq!(*seen_b.borrow(), vec![false]);
    }

    #[test]
    fn test_dispose_forgets_everything() {
        let mut store = ComponentStore::new();
        store.set_focus_cell(EditorId(3), Some("f".to_string()));
        store.set_disable_resizing(EditorId(4), true);
        assert_eq!(store.editor_count(), 2);
        store.remove_editor(EditorId(3));
        assert_eq!(store.focus_cell(EditorId(3)), None);
        store.dispose();
        assert_eq!(store.editor_count(), 0);
        assert!(!store.is_resize_disabled(EditorId(4)));
    }
}

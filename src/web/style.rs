use web_sys::Document;

use crate::selection::SelectionStyle;

/// Style rules injected as `<style id=..>` elements in the page head.
#[derive(Debug, Clone, Default)]
pub struct DomStyleSheet {
    document: Option<Document>,
}

impl DomStyleSheet {
    pub fn new(document: Document) -> Self {
        Self {
            document: Some(document),
        }
    }

    /// The current page's document; every call is a no-op without one.
    pub fn from_window() -> Self {
        Self {
            document: web_sys::window().and_then(|window| window.document()),
        }
    }
}

impl SelectionStyle for DomStyleSheet {
    fn has_style(&self, id: &str) -> bool {
        self.document
            .as_ref()
            .and_then(|document| document.get_element_by_id(id))
            .is_some()
    }

    fn insert_style(&mut self, id: &str, rule: &str) {
        let Some(document) = &self.document else {
            return;
        };
        let Some(head) = document.head() else {
            return;
        };
        let Ok(style) = document.create_element("style") else {
            return;
        };
        style.set_id(id);
        style.set_text_content(Some(rule));
        if head.append_child(&style).is_err() {
            log::warn!("could not inject style {id}");
        }
    }

    fn remove_style(&mut self, id: &str) {
        if let Some(element) = self
            .document
            .as_ref()
            .and_then(|document| document.get_element_by_id(id))
        {
            element.remove();
        }
    }
}

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, HtmlTableCellElement, HtmlTableElement, HtmlTableRowElement,
    MouseEvent, Node,
};

use crate::resize::{HandleId, ResizeHandle, TableSurface};
use crate::types::RenderedCell;

/// Attribute carrying a handle's id on its element.
const HANDLE_ATTRIBUTE: &str = "data-resize-handle";

/// Called when a handle receives `mousedown`.
pub type HandleDown = Rc<dyn Fn(HandleId, &MouseEvent)>;

/// Document-level listeners for the length of a drag.
///
/// Created once per table and attached/detached around each drag.
pub struct DragListeners {
    pub on_move: Closure<dyn FnMut(MouseEvent)>,
    pub on_up: Closure<dyn FnMut(MouseEvent)>,
}

/// Keeps the drag listeners attached to the document until dropped.
pub struct DomCapture {
    document: Document,
    listeners: Option<Rc<DragListeners>>,
}

impl DomCapture {
    fn attach(document: &Document, listeners: Option<Rc<DragListeners>>) -> Self {
        if let Some(drag) = &listeners {
            let _ = document.add_event_listener_with_callback(
                "mousemove",
                drag.on_move.as_ref().unchecked_ref(),
            );
            let _ = document
                .add_event_listener_with_callback("mouseup", drag.on_up.as_ref().unchecked_ref());
        }
        Self {
            document: document.clone(),
            listeners,
        }
    }
}

impl Drop for DomCapture {
    fn drop(&mut self) {
        if let Some(drag) = self.listeners.take() {
            let _ = self.document.remove_event_listener_with_callback(
                "mousemove",
                drag.on_move.as_ref().unchecked_ref(),
            );
            let _ = self.document.remove_event_listener_with_callback(
                "mouseup",
                drag.on_up.as_ref().unchecked_ref(),
            );
        }
    }
}

struct HandleElement {
    id: HandleId,
    element: HtmlElement,
    _on_down: Closure<dyn FnMut(MouseEvent)>,
}

/// A rendered `<table>` element.
pub struct DomTable {
    table: HtmlTableElement,
    document: Document,
    /// `data-key` to cell element, refreshed on every row read
    cells: RefCell<HashMap<String, HtmlElement>>,
    handles: Vec<HandleElement>,
    drag: Option<Rc<DragListeners>>,
    on_handle_down: Option<HandleDown>,
}

impl DomTable {
    pub fn new(table: HtmlTableElement, document: Document) -> Self {
        Self {
            table,
            document,
            cells: RefCell::new(HashMap::new()),
            handles: Vec::new(),
            drag: None,
            on_handle_down: None,
        }
    }

    /// Install the drag listeners and the handle `mousedown` callback.
    pub fn attach(&mut self, drag: DragListeners, on_handle_down: HandleDown) {
        self.drag = Some(Rc::new(drag));
        self.on_handle_down = Some(on_handle_down);
    }

    pub fn element(&self) -> &HtmlTableElement {
        &self.table
    }

    fn row_elements(&self) -> Vec<Vec<HtmlTableCellElement>> {
        let rows = self.table.rows();
        (0..rows.length())
            .filter_map(|i| rows.item(i))
            .filter_map(|row| row.dyn_into::<HtmlTableRowElement>().ok())
            .map(|row| {
                let cells = row.cells();
                (0..cells.length())
                    .filter_map(|i| cells.item(i))
                    .filter_map(|cell| cell.dyn_into::<HtmlTableCellElement>().ok())
                    .collect()
            })
            .collect()
    }

    fn find_cell(&self, key: &str) -> Option<HtmlElement> {
        if let Some(cell) = self.cells.borrow().get(key) {
            return Some(cell.clone());
        }
        let selector = format!("[data-key=\"{key}\"]");
        let cell = self
            .table
            .query_selector(&selector)
            .ok()
            .flatten()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        self.cells
            .borrow_mut()
            .insert(key.to_string(), cell.clone());
        Some(cell)
    }

    fn create_handle(&self, handle: &ResizeHandle) -> Option<HtmlElement> {
        let element = self
            .document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        let style = element.style();
        let _ = style.set_property("position", "absolute");
        let _ = style.set_property("top", "0");
        let _ = style.set_property("left", &format!("{}px", handle.left));
        let _ = style.set_property("width", &format!("{}px", handle.width));
        let _ = style.set_property("height", &format!("{}px", handle.height));
        let _ = style.set_property("cursor", "col-resize");
        let _ = style.set_property("user-select", "none");
        let _ = style.set_property("z-index", "1");
        let _ = element.set_attribute(HANDLE_ATTRIBUTE, &handle.id.0.to_string());
        let _ = element.set_attribute("contenteditable", "false");
        Some(element)
    }
}

impl TableSurface for DomTable {
    type Capture = DomCapture;

    fn rows(&self) -> Vec<Vec<RenderedCell>> {
        let mut cache = self.cells.borrow_mut();
        cache.clear();
        self.row_elements()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let key = cell.dataset().get("key");
                        let rendered = RenderedCell {
                            key: key.clone(),
                            width: f64::from(cell.offset_width()),
                            row_span: i64::from(cell.row_span()),
                            col_span: i64::from(cell.col_span()),
                        };
                        if let Some(key) = key {
                            cache.insert(key, HtmlElement::from(cell));
                        }
                        rendered
                    })
                    .collect()
            })
            .collect()
    }

    fn table_height(&self) -> f64 {
        f64::from(self.table.offset_height())
    }

    fn rendered_width(&self, key: &str) -> Option<f64> {
        self.find_cell(key)
            .map(|cell| f64::from(cell.offset_width()))
    }

    fn apply_width(&mut self, key: &str, width: f64) {
        if let Some(cell) = self.find_cell(key) {
            let _ = cell.style().set_property("width", &format!("{width}px"));
        }
    }

    fn show_handles(&mut self, handles: &[ResizeHandle]) {
        let first_row = self.row_elements().into_iter().next().unwrap_or_default();
        for handle in handles {
            let Some(host) = first_row.get(handle.cell_index) else {
                continue;
            };
            let Some(element) = self.create_handle(handle) else {
                continue;
            };
            let host_style = host.style();
            if host_style
                .get_property_value("position")
                .unwrap_or_default()
                .is_empty()
            {
                let _ = host_style.set_property("position", "relative");
            }

            let id = handle.id;
            let on_down = self.on_handle_down.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                event.prevent_default();
                event.stop_propagation();
                if let Some(on_down) = &on_down {
                    on_down(id, &event);
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            let _ = element
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            let _ = host.append_child(&element);

            self.handles.push(HandleElement {
                id,
                element,
                _on_down: closure,
            });
        }
    }

    fn remove_handles(&mut self, keep: Option<HandleId>) {
        self.handles.retain(|handle| {
            if Some(handle.id) == keep {
                return true;
            }
            handle.element.remove();
            false
        });
    }

    fn capture_pointer(&mut self) -> DomCapture {
        DomCapture::attach(&self.document, self.drag.clone())
    }
}

impl Drop for DomTable {
    fn drop(&mut self) {
        self.remove_handles(None);
    }
}

/// Whether `event` landed on a cell of `table` itself.
///
/// Handles and cells of tables nested inside `table` do not count.
pub fn enters_cell(table: &HtmlTableElement, event: &MouseEvent) -> bool {
    let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return false;
    };
    if matches!(target.closest(&format!("[{HANDLE_ATTRIBUTE}]")), Ok(Some(_))) {
        return false;
    }
    let Ok(Some(cell)) = target.closest("td, th") else {
        return false;
    };
    let table: &Node = table;
    matches!(cell.closest("table"), Ok(Some(owner)) if owner.is_same_node(Some(table)))
}

/// Handle id of the element a mouse event landed on, if it is a handle.
pub fn handle_under(event: &MouseEvent) -> Option<HandleId> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let id = target.get_attribute(HANDLE_ATTRIBUTE)?;
    id.parse().ok().map(HandleId)
}

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlTableElement, MouseEvent, Node};

use super::table::{enters_cell, handle_under, DomTable, DragListeners, HandleDown};
use crate::options::TableOptions;
use crate::resize::{
    compute_boundaries, ColumnResizer, PointerEvent, ResizeCallbacks, TableSurface,
};
use crate::store::{ComponentStore, EditorId};

fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

/// Host callbacks registered from JavaScript.
///
/// Start and stop callbacks receive the `MouseEvent` that triggered them,
/// or `{ x }` when the resizer is driven without a DOM event.
#[derive(Debug, Default)]
pub struct JsCallbacks {
    on_init: Option<Function>,
    on_start: Option<Function>,
    on_stop: Option<Function>,
    /// DOM event being dispatched to the resizer
    event: Option<MouseEvent>,
}

impl JsCallbacks {
    fn event_arg(&self, event: &PointerEvent) -> JsValue {
        self.event
            .as_ref()
            .map_or_else(|| to_js(event), |raw| JsValue::from(raw.clone()))
    }
}

impl ResizeCallbacks for JsCallbacks {
    fn on_init(&mut self, widths: &BTreeMap<String, f64>) {
        if let Some(callback) = &self.on_init {
            let _ = callback.call1(&JsValue::NULL, &to_js(widths));
        }
    }

    fn on_resize_start(&mut self, event: &PointerEvent) {
        if let Some(callback) = &self.on_start {
            let _ = callback.call1(&JsValue::NULL, &self.event_arg(event));
        }
    }

    fn on_resize_stop(&mut self, event: &PointerEvent, widths: &BTreeMap<String, f64>) {
        if let Some(callback) = &self.on_stop {
            let _ = callback.call2(&JsValue::NULL, &self.event_arg(event), &to_js(widths));
        }
    }
}

type Resizer = ColumnResizer<DomTable, JsCallbacks>;
type SharedResizer = Rc<RefCell<Resizer>>;

/// Run `f` on the resizer unless it is gone or already borrowed.
///
/// A callback that calls back into the table while an event is being
/// handled lands here with the resizer borrowed; that call is dropped.
fn with_resizer<R>(
    resizer: &Weak<RefCell<Resizer>>,
    f: impl FnOnce(&mut Resizer) -> R,
) -> Option<R> {
    let resizer = resizer.upgrade()?;
    let Ok(mut resizer) = resizer.try_borrow_mut() else {
        log::debug!("resizer busy, event dropped");
        return None;
    };
    Some(f(&mut resizer))
}

/// Run `f` with `event` visible to the host callbacks it triggers.
fn dispatch<R>(resizer: &mut Resizer, event: &MouseEvent, f: impl FnOnce(&mut Resizer) -> R) -> R {
    resizer.callbacks_mut().event = Some(event.clone());
    let result = f(resizer);
    resizer.callbacks_mut().event = None;
    result
}

fn pointer(event: &MouseEvent) -> PointerEvent {
    PointerEvent::at(f64::from(event.client_x()))
}

/// Column resizing bound to a `<table>` element.
#[wasm_bindgen]
pub struct ResizableTable {
    resizer: SharedResizer,
    table: HtmlTableElement,
    on_enter: Closure<dyn FnMut(MouseEvent)>,
    on_leave: Closure<dyn FnMut(MouseEvent)>,
}

impl ResizableTable {
    fn with<R>(&self, f: impl FnOnce(&mut Resizer) -> R) -> Option<R> {
        with_resizer(&Rc::downgrade(&self.resizer), f)
    }
}

#[wasm_bindgen]
impl ResizableTable {
    /// Bind to `table`. `options` is a `TableOptions` object or `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(table: HtmlTableElement, options: JsValue) -> Result<ResizableTable, JsValue> {
        console_error_panic_hook::set_once();

        let options: TableOptions = if options.is_undefined() || options.is_null() {
            TableOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)?
        };
        options.validate()?;

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("No document"))?;

        let surface = DomTable::new(table.clone(), document);
        let resizer: SharedResizer = Rc::new(RefCell::new(ColumnResizer::new(
            surface,
            JsCallbacks::default(),
            options,
        )));
        let weak = Rc::downgrade(&resizer);

        let on_move = {
            let weak = Weak::clone(&weak);
            Closure::wrap(Box::new(move |event: MouseEvent| {
                with_resizer(&weak, |r| r.pointer_move(pointer(&event)));
            }) as Box<dyn FnMut(MouseEvent)>)
        };
        let on_up = {
            let weak = Weak::clone(&weak);
            Closure::wrap(Box::new(move |event: MouseEvent| {
                with_resizer(&weak, |r| {
                    dispatch(r, &event, |r| r.pointer_up(pointer(&event), handle_under(&event)))
                });
            }) as Box<dyn FnMut(MouseEvent)>)
        };
        let on_handle_down: HandleDown = {
            let weak = Weak::clone(&weak);
            Rc::new(move |id, event: &MouseEvent| {
                with_resizer(&weak, |r| dispatch(r, event, |r| r.pointer_down(id, pointer(event))));
            })
        };
        resizer
            .try_borrow_mut()
            .map_err(|e| JsValue::from_str(&e.to_string()))?
            .surface_mut()
            .attach(DragListeners { on_move, on_up }, on_handle_down);

        let on_enter = {
            let weak = Weak::clone(&weak);
            let table = table.clone();
            Closure::wrap(Box::new(move |event: MouseEvent| {
                if enters_cell(&table, &event) {
                    with_resizer(&weak, ColumnResizer::pointer_enter);
                }
            }) as Box<dyn FnMut(MouseEvent)>)
        };
        let on_leave = {
            let weak = Weak::clone(&weak);
            let table = table.clone();
            Closure::wrap(Box::new(move |event: MouseEvent| {
                let related = event
                    .related_target()
                    .and_then(|target| target.dyn_into::<Node>().ok());
                let still_inside = related.is_some_and(|node| table.contains(Some(&node)));
                with_resizer(&weak, |r| r.pointer_leave(still_inside));
            }) as Box<dyn FnMut(MouseEvent)>)
        };
        table.add_event_listener_with_callback("mouseover", on_enter.as_ref().unchecked_ref())?;
        table.add_event_listener_with_callback("mouseout", on_leave.as_ref().unchecked_ref())?;

        Ok(ResizableTable {
            resizer,
            table,
            on_enter,
            on_leave,
        })
    }

    /// Called with `{ cellKey: width }` when `init` runs
    pub fn on_init(&self, callback: Option<Function>) {
        self.with(|r| r.callbacks_mut().on_init = callback);
    }

    /// Called with the `mousedown` event when a drag starts
    pub fn on_resize_start(&self, callback: Option<Function>) {
        self.with(|r| r.callbacks_mut().on_start = callback);
    }

    /// Called with the `mouseup` event and `{ cellKey: width }` when a drag ends
    pub fn on_resize_stop(&self, callback: Option<Function>) {
        self.with(|r| r.callbacks_mut().on_stop = callback);
    }

    /// Report every keyed cell's width to `on_init` and return it.
    pub fn init(&self) -> JsValue {
        self.with(|r| to_js(&r.init())).unwrap_or(JsValue::NULL)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.with(|r| r.set_disabled(disabled));
    }

    pub fn is_disabled(&self) -> bool {
        self.with(|r| r.is_disabled()).unwrap_or(false)
    }

    /// Current column boundaries in pixels
    pub fn boundaries(&self) -> Vec<f64> {
        self.with(|r| compute_boundaries(&r.surface().rows()))
            .unwrap_or_default()
    }

    /// `"idle"`, `"armed"` or `"dragging"`
    pub fn phase(&self) -> JsValue {
        self.with(|r| to_js(&r.phase())).unwrap_or(JsValue::NULL)
    }

    /// Abort a running drag and restore its starting widths.
    pub fn cancel(&self) -> bool {
        self.with(|r| r.cancel()).unwrap_or(false)
    }
}

impl Drop for ResizableTable {
    fn drop(&mut self) {
        let _ = self.table.remove_event_listener_with_callback(
            "mouseover",
            self.on_enter.as_ref().unchecked_ref(),
        );
        let _ = self.table.remove_event_listener_with_callback(
            "mouseout",
            self.on_leave.as_ref().unchecked_ref(),
        );
        if let Ok(mut resizer) = self.resizer.try_borrow_mut() {
            resizer.cancel();
            resizer.set_disabled(true);
        }
    }
}

/// Per-editor selection and resize flags shared by every table of a page.
#[wasm_bindgen]
#[derive(Default)]
pub struct EditorStore {
    store: Rc<RefCell<ComponentStore>>,
}

impl EditorStore {
    fn with<R>(&self, f: impl FnOnce(&mut ComponentStore) -> R) -> Option<R> {
        let Ok(mut store) = self.store.try_borrow_mut() else {
            log::debug!("editor store busy, call dropped");
            return None;
        };
        Some(f(&mut store))
    }
}

#[wasm_bindgen]
impl EditorStore {
    #[wasm_bindgen(constructor)]
    pub fn new() -> EditorStore {
        EditorStore::default()
    }

    pub fn set_anchor_cell(&self, editor: u32, key: Option<String>) {
        self.with(|s| s.set_anchor_cell(EditorId(editor), key));
    }

    pub fn anchor_cell(&self, editor: u32) -> Option<String> {
        self.with(|s| s.anchor_cell(EditorId(editor)).map(str::to_string))
            .flatten()
    }

    pub fn set_focus_cell(&self, editor: u32, key: Option<String>) {
        self.with(|s| s.set_focus_cell(EditorId(editor), key));
    }

    pub fn focus_cell(&self, editor: u32) -> Option<String> {
        self.with(|s| s.focus_cell(EditorId(editor)).map(str::to_string))
            .flatten()
    }

    pub fn set_cell_selecting(&self, editor: u32) {
        self.with(|s| s.set_cell_selecting(EditorId(editor)));
    }

    pub fn clear_cell_selecting(&self, editor: u32) {
        self.with(|s| s.clear_cell_selecting(EditorId(editor)));
    }

    pub fn is_cell_selecting(&self, editor: u32) -> bool {
        self.with(|s| s.is_cell_selecting(EditorId(editor)))
            .unwrap_or(false)
    }

    pub fn set_disable_resizing(&self, editor: u32, disabled: bool) {
        self.with(|s| s.set_disable_resizing(EditorId(editor), disabled));
    }

    pub fn is_resize_disabled(&self, editor: u32) -> bool {
        self.with(|s| s.is_resize_disabled(EditorId(editor)))
            .unwrap_or(false)
    }

    /// Disable `table`'s resizing whenever `editor` selects cells or turns resizing off.
    pub fn attach_table(&self, editor: u32, table: &ResizableTable) {
        let weak = Rc::downgrade(&table.resizer);
        self.with(|s| {
            s.subscribe_disable_resizing(
                EditorId(editor),
                Box::new(move |disabled| {
                    with_resizer(&weak, |r| r.set_disabled(disabled));
                }),
            );
        });
    }

    pub fn remove_editor(&self, editor: u32) {
        self.with(|s| s.remove_editor(EditorId(editor)));
    }

    pub fn dispose(&self) {
        self.with(ComponentStore::dispose);
    }
}

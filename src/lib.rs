//! spantable - merged-cell tables for structured document editors
//!
//! Selection and column resizing for tables whose cells span rows and columns:
//! - Grid resolution: a dense `(row, col)` grid from a sparse tree of cells
//! - Rectangular selection between two cells, span-aware
//! - Column boundary dragging with a minimum-width floor
//! - Per-editor state for hosts running several editors in one page
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { ResizableTable, select_cells } from 'spantable';
//! await init();
//! const resizer = new ResizableTable(tableElement, { minimumCellWidth: 40 });
//! resizer.on_resize_stop((event, widths) => persist(widths));
//! const { document } = JSON.parse(select_cells(doc, "[2, 0]", "a", "f"));
//! ```

pub mod api;
pub mod document;
pub mod error;
pub mod layout;
pub mod options;
pub mod resize;
pub mod selection;
pub mod store;
pub mod types;

// DOM bindings
#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

pub use document::{DocumentHost, DocumentTree, Node};
pub use error::SpanTableError;
pub use layout::{resolve, ResolvedGrid};
pub use options::{SaturationPolicy, TableOptions};
pub use resize::{ColumnResizer, ResizeCallbacks, TableSurface};
pub use selection::{add_selection, remove_selection, SelectionStyle};
pub use store::{ComponentStore, EditorId};
pub use types::*;

#[cfg(target_arch = "wasm32")]
fn page_styles() -> web::DomStyleSheet {
    web::DomStyleSheet::from_window()
}

/// Native builds have no page, so the style rule is dropped after each call.
/// Hosts that track it call [`api::select_cells_json`] and
/// [`api::clear_selection_json`] with a [`selection::StyleRegistry`] they keep.
#[cfg(not(target_arch = "wasm32"))]
fn page_styles() -> selection::StyleRegistry {
    selection::StyleRegistry::new()
}

/// Resolve the table enclosing `at` into its logical grid
///
/// # Arguments
/// * `document` - The editor document as JSON
/// * `at` - JSON path of any node inside the table, e.g. `"[2, 0, 1]"`
/// * `options` - Optional `TableOptions` JSON
/// * `start_key` - Key of the cell to report as the insert position
///
/// # Returns
/// The grid as JSON, or `null` when there is no table or it has no cells
///
/// # Errors
/// Returns an error if any input is not valid JSON.
#[wasm_bindgen]
pub fn resolve_table(
    document: &str,
    at: &str,
    options: Option<String>,
    start_key: Option<String>,
) -> Result<String, JsValue> {
    api::resolve_table_json(document, at, options.as_deref(), start_key.as_deref())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Mark every cell in the rectangle between `anchor_key` and `focus_key`
///
/// Returns `{ document, selected, covered }` as JSON. Existing markers are
/// always cleared first; an unknown key leaves the document unmarked.
///
/// In the browser this also installs the page's selection style element.
/// Native builds keep no style state between calls.
///
/// # Errors
/// Returns an error if any input is not valid JSON.
#[wasm_bindgen]
pub fn select_cells(
    document: &str,
    at: &str,
    anchor_key: &str,
    focus_key: &str,
    options: Option<String>,
) -> Result<String, JsValue> {
    let mut styles = page_styles();
    api::select_cells_json(
        document,
        &mut styles,
        at,
        anchor_key,
        focus_key,
        options.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Remove every selection marker; returns `{ document, cleared }` as JSON
///
/// In the browser this also removes the page's selection style element.
///
/// # Errors
/// Returns an error if the document is not valid JSON.
#[wasm_bindgen]
pub fn clear_selection(document: &str) -> Result<String, JsValue> {
    let mut styles = page_styles();
    api::clear_selection_json(document, &mut styles)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Column boundaries of rendered rows, as a JSON array of pixel offsets
///
/// # Errors
/// Returns an error if the rows are not valid JSON.
#[wasm_bindgen]
pub fn table_boundaries(rows: &str) -> Result<String, JsValue> {
    api::table_boundaries_json(rows).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Widths after dragging `boundary` by `diff_x`, without touching any DOM
///
/// # Errors
/// Returns an error if the rows or options are invalid or the offsets are not finite.
#[wasm_bindgen]
pub fn redistribute_widths(
    rows: &str,
    boundary: f64,
    diff_x: f64,
    options: Option<String>,
) -> Result<String, JsValue> {
    api::redistribute_widths_json(rows, boundary, diff_x, options.as_deref())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

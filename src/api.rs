//! JSON entry points.
//!
//! Each call takes and returns JSON text, so the same operations serve the
//! wasm exports in the crate root and native hosts alike. Conditions that
//! are a no-op for the editor (stale key, empty table, no table) come back
//! as empty results rather than errors.

use serde::Serialize;

use crate::document::DocumentTree;
use crate::error::{Result, SpanTableError};
use crate::layout::resolve;
use crate::options::TableOptions;
use crate::resize::{capture_row_layout, compute_boundaries, plan_cell_widths, WidthUpdate};
use crate::selection::{
    add_selection, locate_table, remove_selection, selected_paths, SelectionStyle,
};
use crate::types::{CellPath, RenderedCell};

/// Document after a selection change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOutcome {
    pub document: DocumentTree,
    /// Paths of every cell carrying the marker
    pub selected: Vec<CellPath>,
    /// Number of grid slots inside the rectangle
    pub covered: usize,
}

/// Document after clearing the selection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearOutcome {
    pub document: DocumentTree,
    pub cleared: usize,
}

/// Options from JSON; absent or blank input means defaults.
pub fn parse_options(options: Option<&str>) -> Result<TableOptions> {
    match options {
        Some(json) if !json.trim().is_empty() => TableOptions::from_json(json),
        _ => Ok(TableOptions::default()),
    }
}

fn parse_path(json: &str) -> Result<CellPath> {
    Ok(serde_json::from_str(json)?)
}

fn parse_rows(json: &str) -> Result<Vec<Vec<RenderedCell>>> {
    Ok(serde_json::from_str(json)?)
}

/// Resolve the table enclosing `at` into its grid; `null` when there is none.
pub fn resolve_table_json(
    document: &str,
    at: &str,
    options: Option<&str>,
    start_key: Option<&str>,
) -> Result<String> {
    let doc = DocumentTree::from_json(document)?;
    let options = parse_options(options)?;
    let at = parse_path(at)?;
    let grid = locate_table(&doc, &options, &at)
        .and_then(|table| resolve(&doc, &table, &options, start_key));
    Ok(serde_json::to_string(&grid)?)
}

/// Select the rectangle between two cells and return the updated document.
pub fn select_cells_json<S: SelectionStyle + ?Sized>(
    document: &str,
    styles: &mut S,
    at: &str,
    anchor_key: &str,
    focus_key: &str,
    options: Option<&str>,
) -> Result<String> {
    let mut doc = DocumentTree::from_json(document)?;
    let options = parse_options(options)?;
    let at = parse_path(at)?;

    let covered = match add_selection(&mut doc, styles, &options, &at, anchor_key, focus_key) {
        Ok(covered) => covered.len(),
        Err(e) if e.is_no_op() => {
            log::debug!("selection skipped: {e}");
            0
        }
        Err(e) => return Err(e),
    };

    let selected = selected_paths(&doc, &CellPath::root());
    Ok(serde_json::to_string(&SelectionOutcome {
        document: doc,
        selected,
        covered,
    })?)
}

/// Drop every selection marker and the style rule.
pub fn clear_selection_json<S: SelectionStyle + ?Sized>(
    document: &str,
    styles: &mut S,
) -> Result<String> {
    let mut doc = DocumentTree::from_json(document)?;
    let cleared = remove_selection(&mut doc, styles);
    Ok(serde_json::to_string(&ClearOutcome {
        document: doc,
        cleared,
    })?)
}

/// Boundary offsets of rendered rows, ascending.
pub fn table_boundaries_json(rows: &str) -> Result<String> {
    let rows = parse_rows(rows)?;
    Ok(serde_json::to_string(&compute_boundaries(&rows))?)
}

/// Widths for dragging `boundary` by `diff_x` over rendered rows.
///
/// The rows double as the live widths, so a cell is pinned when its
/// rendered width already equals the floor.
pub fn redistribute_widths_json(
    rows: &str,
    boundary: f64,
    diff_x: f64,
    options: Option<&str>,
) -> Result<String> {
    if !boundary.is_finite() || !diff_x.is_finite() {
        return Err(SpanTableError::DegenerateGeometry(format!(
            "boundary {boundary} and offset {diff_x} must be finite"
        )));
    }
    let rows = parse_rows(rows)?;
    let options = parse_options(options)?;
    let layout = capture_row_layout(&rows);
    let live = |key: &str| {
        rows.iter()
            .flatten()
            .find(|cell| cell.key.as_deref() == Some(key))
            .map(|cell| cell.width)
    };
    let plan = plan_cell_widths(
        &layout,
        boundary,
        diff_x,
        options.minimum_cell_width,
        &live,
        options.saturation,
    );
    Ok(serde_json::to_string(&WidthUpdate {
        widths: plan.widths(),
        adjust: plan.adjust,
        saturated: plan.saturated,
    })?)
}

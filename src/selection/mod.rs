//! Rectangular cell selection over a resolved grid.
//!
//! Selecting always starts by clearing every marker in the document, so a
//! smaller selection never leaves stale markers from a larger one behind.

mod style;

pub use style::{
    add_selection_style, remove_selection_style, SelectionStyle, StyleRegistry,
    SELECTION_STYLE_ID, SELECTION_STYLE_RULE,
};

use std::collections::BTreeSet;

use serde_json::Value;

use crate::document::DocumentHost;
use crate::error::{Result, SpanTableError};
use crate::layout::{resolve, ResolvedGrid};
use crate::options::{TableOptions, SELECTION_ATTRIBUTE};
use crate::types::{CellPath, GridCell, SelectionRect};

/// Innermost table node enclosing `at`.
pub fn locate_table<D: DocumentHost + ?Sized>(
    doc: &D,
    options: &TableOptions,
    at: &CellPath,
) -> Option<CellPath> {
    doc.query_nodes(&CellPath::root(), &|node| node.kind == options.type_table)
        .into_iter()
        .map(|(_, path)| path)
        .filter(|path| path.is_prefix_of(at))
        .max_by_key(|path| path.len())
}

/// Bounding rectangle between the anchor and focus cells.
pub fn selection_rect(
    grid: &ResolvedGrid,
    anchor_key: &str,
    focus_key: &str,
) -> Result<SelectionRect> {
    let head = grid
        .find_by_key(anchor_key)
        .ok_or_else(|| SpanTableError::UnresolvedReference {
            key: anchor_key.to_string(),
        })?;
    let tail = grid
        .find_by_key(focus_key)
        .ok_or_else(|| SpanTableError::UnresolvedReference {
            key: focus_key.to_string(),
        })?;
    Ok(SelectionRect::normalized(&head.path, &tail.path))
}

/// Every slot inside the anchor/focus rectangle, row-major.
///
/// Slots of one spanned cell appear once per covered slot.
pub fn covered_cells(
    grid: &ResolvedGrid,
    anchor_key: &str,
    focus_key: &str,
) -> Result<Vec<GridCell>> {
    let rect = selection_rect(grid, anchor_key, focus_key)?;
    Ok(grid
        .get_cell(|slot| rect.contains(&slot.path))
        .into_iter()
        .cloned()
        .collect())
}

/// Document paths of the distinct cells behind `covered`, in first-seen order.
pub fn distinct_origins(covered: &[GridCell]) -> Vec<CellPath> {
    let mut seen = BTreeSet::new();
    covered
        .iter()
        .filter(|slot| seen.insert(slot.origin_path.clone()))
        .map(|slot| slot.origin_path.clone())
        .collect()
}

/// Clear every selection marker in the document and drop the style rule.
pub fn remove_selection<D, S>(doc: &mut D, styles: &mut S) -> usize
where
    D: DocumentHost + ?Sized,
    S: SelectionStyle + ?Sized,
{
    let cleared = doc.unset_attribute(
        SELECTION_ATTRIBUTE,
        &|node| node.has_attribute(SELECTION_ATTRIBUTE),
        &CellPath::root(),
    );
    remove_selection_style(styles);
    cleared
}

/// Select the rectangle from `anchor_key` to `focus_key` in the table enclosing `at`.
///
/// Markers are reset first regardless of the outcome. On success every cell
/// with at least one slot in the rectangle carries the selection marker, and
/// the covered slots are returned.
pub fn add_selection<D, S>(
    doc: &mut D,
    styles: &mut S,
    options: &TableOptions,
    at: &CellPath,
    anchor_key: &str,
    focus_key: &str,
) -> Result<Vec<GridCell>>
where
    D: DocumentHost + ?Sized,
    S: SelectionStyle + ?Sized,
{
    remove_selection(doc, styles);
    add_selection_style(styles);

    let table = locate_table(doc, options, at).ok_or(SpanTableError::TableNotFound)?;
    let grid = resolve(doc, &table, options, None).ok_or(SpanTableError::EmptyTable)?;
    let covered = covered_cells(&grid, anchor_key, focus_key)?;

    let color = Value::String(options.selection_color.clone());
    for origin in distinct_origins(&covered) {
        let marked = doc.set_attribute(&origin, SELECTION_ATTRIBUTE, color.clone(), &|node| {
            node.kind == options.type_cell
        });
        if !marked {
            log::warn!("selected cell at {origin} is no longer a table cell");
        }
    }
    log::debug!(
        "selected {} slots from {anchor_key} to {focus_key} in table at {table}",
        covered.len()
    );
    Ok(covered)
}

/// Paths of every cell currently carrying the selection marker under `scope`.
pub fn selected_paths<D: DocumentHost + ?Sized>(doc: &D, scope: &CellPath) -> Vec<CellPath> {
    doc.query_nodes(scope, &|node| node.has_attribute(SELECTION_ATTRIBUTE))
        .into_iter()
        .map(|(_, path)| path)
        .collect()
}

//! Dense logical grid for a table.
//!
//! Rebuilt from the document on every query and never cached, so a document
//! mutation can never leave a stale grid behind.

use std::collections::BTreeSet;
use std::rc::Rc;

use serde::Serialize;

use crate::document::DocumentHost;
use crate::options::{TableOptions, SELECTION_ATTRIBUTE};
use crate::types::{Cell, CellPath, GridCell, GridTable};

/// Result of resolving a table into its logical grid
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGrid {
    /// Every occupied logical slot
    pub grid_table: GridTable,
    /// Length of the table's own path
    pub table_depth: usize,
    /// Cells in document order with their real paths
    pub cells: Vec<(Rc<Cell>, CellPath)>,
    /// Slot of the first cell whose key matched the start key
    pub insert_position: Option<(usize, usize)>,
}

impl ResolvedGrid {
    /// All slots matching `predicate`, row-major.
    pub fn get_cell(&self, predicate: impl Fn(&GridCell) -> bool) -> Vec<&GridCell> {
        self.grid_table
            .iter()
            .map(|(_, _, slot)| slot)
            .filter(|slot| predicate(slot))
            .collect()
    }

    /// First slot (row-major) owned by the cell with `key`
    pub fn find_by_key(&self, key: &str) -> Option<&GridCell> {
        self.grid_table
            .iter()
            .map(|(_, _, slot)| slot)
            .find(|slot| slot.key() == key)
    }

    pub fn insert_position(&self) -> Option<&GridCell> {
        let (row, col) = self.insert_position?;
        self.grid_table.get(row, col)
    }

    /// Number of logical columns in the widest row
    pub fn column_count(&self) -> usize {
        self.grid_table
            .rows()
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }
}

/// Resolve the table at `table` into its logical grid.
///
/// Only cells whose parent is a row of this table count; cells of a table
/// nested inside one of ours sit deeper and are left out. Returns `None` for
/// a table with no cells.
pub fn resolve<D: DocumentHost + ?Sized>(
    doc: &D,
    table: &CellPath,
    options: &TableOptions,
    start_key: Option<&str>,
) -> Option<ResolvedGrid> {
    let rows: BTreeSet<CellPath> = doc
        .query_nodes(table, &|node| node.kind == options.type_row)
        .into_iter()
        .map(|(_, path)| path)
        .filter(|path| path.len() == table.len() + 1)
        .collect();
    let cells = doc
        .query_nodes(table, &|node| node.kind == options.type_cell)
        .into_iter()
        .filter(|(_, path)| {
            path.split_last()
                .is_some_and(|(_, parent)| rows.contains(&CellPath::from(parent)))
        })
        .filter_map(|(node, path)| {
            let cell = node.to_cell(SELECTION_ATTRIBUTE);
            if cell.is_none() {
                log::warn!("table cell at {path} has no key, skipping");
            }
            Some((cell?, path))
        });
    resolve_cells(cells, table.len(), start_key)
}

/// Place already-enumerated cells into a grid.
///
/// Cells must come in document order. A cell whose declared slot is taken
/// (by an earlier cell spanning into it) moves right to the next free column
/// of its row. Rowspans stop at the last row holding a cell.
pub fn resolve_cells<I>(
    cells: I,
    table_depth: usize,
    start_key: Option<&str>,
) -> Option<ResolvedGrid>
where
    I: IntoIterator<Item = (Cell, CellPath)>,
{
    let mut grid_table = GridTable::new();
    let mut placed = Vec::new();
    let mut insert_position = None;

    let cells: Vec<(Cell, CellPath, (usize, usize))> = cells
        .into_iter()
        .filter_map(|(cell, path)| {
            let Some(position) = path.grid_position(table_depth) else {
                log::warn!(
                    "cell {} at {path} is too shallow for a table at depth {table_depth}",
                    cell.key
                );
                return None;
            };
            Some((cell, path, position))
        })
        .collect();
    let row_count = cells.iter().map(|(_, _, (y, _))| y + 1).max().unwrap_or(0);

    for (cell, path, (y, declared_x)) in cells {
        let x = grid_table.next_free_col(y, declared_x);
        let (rowspan, colspan) = cell.span(row_count - y);
        let cell = Rc::new(cell);

        for dy in 0..rowspan {
            for dx in 0..colspan {
                let (row, col) = (y + dy, x + dx);
                let mut slot = GridCell {
                    cell: Rc::clone(&cell),
                    path: path.with_grid_position(table_depth, row, col),
                    is_real: dy == 0 && dx == 0,
                    origin_path: path.clone(),
                    is_insert_position: false,
                };
                if insert_position.is_none() && start_key == Some(cell.key.as_str()) {
                    slot.is_insert_position = true;
                    insert_position = Some((row, col));
                }
                grid_table.insert(row, col, slot);
            }
        }
        placed.push((cell, path));
    }

    if placed.is_empty() {
        return None;
    }

    Some(ResolvedGrid {
        grid_table,
        table_depth,
        cells: placed,
        insert_position,
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn at(row: usize, col: usize) -> CellPath {
        CellPath::from(vec![0, row, col])
    }

    #[test]
    fn test_unspanned_cells_are_real() {
        let grid = resolve_cells(
            vec![(Cell::new("a"), at(0, 0)), (Cell::new("b"), at(0, 1))],
            1,
            None,
        )
        .unwrap();
        assert!(grid.grid_table.get(0, 0).unwrap().is_real);
        assert!(grid.grid_table.get(0, 1).unwrap().is_real);
        assert_eq!(grid.column_count(), 2);
    }

    #[test]
    fn test_span_is_stamped() {
        let grid = resolve_cells(
            vec![
                (Cell::new("big").with_span(2, 2), at(0, 0)),
                (Cell::new("c"), at(0, 1)),
                (Cell::new("d"), at(1, 0)),
            ],
            1,
            None,
        )
        .unwrap();

        for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            assert_eq!(grid.grid_table.get(row, col).unwrap().key(), "big");
        }
        // "c" was declared at (0, 1) but that slot is spanned, so it moves right
        assert_eq!(grid.grid_table.get(0, 2).unwrap().key(), "c");
        assert_eq!(grid.grid_table.get(1, 2).unwrap().key(), "d");
        assert_eq!(grid.get_cell(|s| s.is_real && s.key() == "big").len(), 1);
    }

    #[test]
    fn test_logical_path_uses_slot() {
        let grid =
            resolve_cells(vec![(Cell::new("a").with_span(1, 2), at(3, 0))], 1, None).unwrap();
        let slot = grid.grid_table.get(3, 1).unwrap();
        assert_eq!(slot.path, at(3, 1));
        assert_eq!(slot.origin_path, at(3, 0));
        assert!(!slot.is_real);
    }

    #[test]
    fn test_insert_position_marks_first_slot() {
        let grid = resolve_cells(
            vec![
                (Cell::new("a"), at(0, 0)),
                (Cell::new("b").with_span(2, 1), at(0, 1)),
                (Cell::new("c"), at(1, 0)),
            ],
            1,
            Some("b"),
        )
        .unwrap();
        assert_eq!(grid.insert_position, Some((0, 1)));
        assert!(grid.insert_position().unwrap().is_insert_position);
        assert!(!grid.grid_table.get(1, 1).unwrap().is_insert_position);
    }

    #[test]
    fn test_empty_table() {
        assert!(resolve_cells(Vec::<(Cell, CellPath)>::new(), 1, None).is_none());
    }

    #[test]
    fn test_shallow_paths_are_skipped() {
        let grid = resolve_cells(
            vec![
                (Cell::new("bad"), CellPath::from(vec![0, 1])),
                (Cell::new("ok"), at(0, 0)),
            ],
            1,
            None,
        )
        .unwrap();
        assert_eq!(grid.cells.len(), 1);
        assert!(grid.find_by_key("bad").is_none());
    }

    #[test]
    fn test_spans_are_capped() {
        let grid = resolve_cells(
            vec![
                (Cell::new("tall").with_span(4_000_000_000, 1), at(0, 0)),
                (Cell::new("wide").with_span(1, 4_000_000_000), at(1, 0)),
            ],
            1,
            None,
        )
        .unwrap();
        // Rows end at the last row holding a cell
        assert_eq!(grid.grid_table.row_count(), 2);
        assert_eq!(grid.column_count(), 1 + crate::types::MAX_COLSPAN);
    }

    #[test]
    fn test_only_cells_inside_rows_count() {
        use crate::document::{DocumentTree, Node};

        let doc = DocumentTree::from_blocks(vec![Node::new("table")
            .with_child(Node::new("table-row").with_child(Node::new("table-cell").with_key("a")))
            .with_child(Node::new("table-cell").with_key("stray"))
            .with_child(Node::new("caption").with_child(Node::new("table-cell").with_key("c")))]);
        let grid = resolve(&doc, &CellPath::from(vec![0]), &TableOptions::default(), None).unwrap();
        let keys: Vec<&str> = grid.cells.iter().map(|(cell, _)| cell.key.as_str()).collect();
        assert_eq!(keys, vec!["a"]);
    }
}

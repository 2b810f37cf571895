use serde::Serialize;
use std::rc::Rc;

use super::{Cell, CellPath};

/// One logical `(row, col)` slot of a resolved table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    /// The cell occupying this slot (shared by every slot it spans)
    pub cell: Rc<Cell>,
    /// Logical path: ancestor prefix followed by `[row, col]`
    pub path: CellPath,
    /// True only at the top-left slot of the cell
    pub is_real: bool,
    /// The cell's actual document path, used to address it for mutation
    pub origin_path: CellPath,
    /// Marks the slot that matched the requested start key
    pub is_insert_position: bool,
}

impl GridCell {
    /// Key of the owning cell
    pub fn key(&self) -> &str {
        &self.cell.key
    }
}

/// Sparse, jagged grid of slots.
///
/// Rows and columns grow on insert. Used both for the document grid and for
/// the rendered pixel layout, which place cells by the same rule.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct SlotGrid<T> {
    rows: Vec<Vec<Option<T>>>,
}

/// Dense logical grid of a table.
pub type GridTable = SlotGrid<GridCell>;

impl<T> Default for SlotGrid<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T> SlotGrid<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot contents at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.rows.get(row)?.get(col)?.as_ref()
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some()
    }

    /// First free column in `row` at or right of `start`.
    pub fn next_free_col(&self, row: usize, start: usize) -> usize {
        let mut col = start;
        while self.is_occupied(row, col) {
            col += 1;
        }
        col
    }

    /// Put `value` at `(row, col)`, growing the grid as needed. Returns the previous occupant.
    pub fn insert(&mut self, row: usize, col: usize, value: T) -> Option<T> {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let slots = self.rows.get_mut(row)?;
        if slots.len() <= col {
            slots.resize_with(col + 1, || None);
        }
        slots.get_mut(col)?.replace(value)
    }

    /// Number of rows, including rows only reached by spans
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Raw rows; `None` marks a hole
    pub fn rows(&self) -> &[Vec<Option<T>>] {
        &self.rows
    }

    /// Occupied slots of one row, left to right
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, &T)> {
        self.rows
            .get(row)
            .into_iter()
            .flat_map(|slots| slots.iter().enumerate())
            .filter_map(|(col, slot)| slot.as_ref().map(|value| (col, value)))
    }

    /// Every occupied slot in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.rows.iter().enumerate().flat_map(|(row, slots)| {
            slots
                .iter()
                .enumerate()
                .filter_map(move |(col, slot)| slot.as_ref().map(|value| (row, col, value)))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

//! Builders for documents and rendered tables.
//!
//! Documents put a paragraph before the table so the table sits at `[1]`,
//! which keeps grid paths distinguishable from slot coordinates.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;
use spantable::resize::{HandleId, ResizeHandle, TableSurface};
use spantable::{CellPath, DocumentTree, Node, RenderedCell};

/// Child index of the table under the document root.
pub const TABLE_INDEX: usize = 1;

pub fn table_path() -> CellPath {
    CellPath::from(vec![TABLE_INDEX])
}

/// Document path of the cell at child `col` of row `row`.
pub fn cell_path(row: usize, col: usize) -> CellPath {
    CellPath::from(vec![TABLE_INDEX, row, col])
}

/// Builds a document holding one table, row by row.
#[derive(Debug, Default)]
pub struct TableBuilder {
    rows: Vec<Vec<Node>>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A row of unit cells
    pub fn row(mut self, keys: &[&str]) -> Self {
        self.rows.push(
            keys.iter()
                .map(|key| Node::new("table-cell").with_key(*key))
                .collect(),
        );
        self
    }

    /// A row of `(key, rowspan, colspan)` cells
    pub fn spanned_row(mut self, cells: &[(&str, i64, i64)]) -> Self {
        self.rows.push(
            cells
                .iter()
                .map(|(key, rowspan, colspan)| {
                    Node::new("table-cell")
                        .with_key(*key)
                        .with_span(*rowspan, *colspan)
                })
                .collect(),
        );
        self
    }

    /// A row holding arbitrary cell nodes
    pub fn node_row(mut self, cells: Vec<Node>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn table_node(self) -> Node {
        self.rows.into_iter().fold(Node::new("table"), |table, cells| {
            table.with_child(
                cells
                    .into_iter()
                    .fold(Node::new("table-row"), Node::with_child),
            )
        })
    }

    pub fn build(self) -> DocumentTree {
        DocumentTree::from_blocks(vec![
            Node::new("paragraph").with_attribute("text", json!("before")),
            self.table_node(),
        ])
    }
}

/// A cell as the surface renders it.
pub fn rendered(key: &str, width: f64) -> RenderedCell {
    RenderedCell::new(key, width)
}

/// Counts live pointer captures; decremented on drop.
#[derive(Debug)]
pub struct CaptureToken(Rc<Cell<usize>>);

impl Drop for CaptureToken {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

/// In-memory rendering surface.
///
/// Applied widths become the rendered widths, optionally rounded to whole
/// pixels the way a browser lays out table cells.
#[derive(Debug, Default)]
pub struct FakeSurface {
    pub rows: Vec<Vec<RenderedCell>>,
    pub height: f64,
    pub round_widths: bool,
    pub shown: Vec<HandleId>,
    pub applied: Vec<(String, f64)>,
    pub captures: Rc<Cell<usize>>,
    pub total_captures: usize,
}

impl FakeSurface {
    pub fn new(rows: Vec<Vec<RenderedCell>>) -> Self {
        Self {
            rows,
            height: 60.0,
            ..Self::default()
        }
    }

    /// Three 100px columns over two rows: `a b c` / `d e f`
    pub fn uniform() -> Self {
        Self::new(vec![
            vec![rendered("a", 100.0), rendered("b", 100.0), rendered("c", 100.0)],
            vec![rendered("d", 100.0), rendered("e", 100.0), rendered("f", 100.0)],
        ])
    }

    pub fn rounding(mut self) -> Self {
        self.round_widths = true;
        self
    }

    pub fn width_of(&self, key: &str) -> Option<f64> {
        self.rows
            .iter()
            .flatten()
            .find(|c| c.key.as_deref() == Some(key))
            .map(|c| c.width)
    }

    pub fn active_captures(&self) -> usize {
        self.captures.get()
    }
}

impl TableSurface for FakeSurface {
    type Capture = CaptureToken;

    fn rows(&self) -> Vec<Vec<RenderedCell>> {
        self.rows.clone()
    }

    fn table_height(&self) -> f64 {
        self.height
    }

    fn rendered_width(&self, key: &str) -> Option<f64> {
        self.width_of(key)
    }

    fn apply_width(&mut self, key: &str, width: f64) {
        let width = if self.round_widths { width.round() } else { width };
        self.applied.push((key.to_string(), width));
        for cell in self.rows.iter_mut().flatten() {
            if cell.key.as_deref() == Some(key) {
                cell.width = width;
            }
        }
    }

    fn show_handles(&mut self, handles: &[ResizeHandle]) {
        self.shown.extend(handles.iter().map(|h| h.id));
    }

    fn remove_handles(&mut self, keep: Option<HandleId>) {
        self.shown.retain(|id| Some(*id) == keep);
    }

    fn capture_pointer(&mut self) -> CaptureToken {
        self.captures.set(self.captures.get() + 1);
        self.total_captures += 1;
        CaptureToken(Rc::clone(&self.captures))
    }
}

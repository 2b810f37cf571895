//! Pixel geometry of a rendered table.
//!
//! Rendered rows list only the cells that start in them. Placing them into a
//! slot grid (same "advance while occupied" rule as the document grid) gives
//! every row its full sequence of widths, with rowspans carried down.

use serde::Serialize;

use crate::types::{LaidOutCell, RenderedCell, RowLayout, SlotGrid};

/// Two pixel offsets closer than this are the same boundary.
const SAME_PX: f64 = 1e-6;

pub(crate) fn same_px(a: f64, b: f64) -> bool {
    (a - b).abs() < SAME_PX
}

#[derive(Debug, Clone)]
struct Placed {
    width: f64,
    colspan: usize,
    key: Option<String>,
}

/// Place rendered rows into slots. A colspan cell takes a single slot holding
/// its full width; a rowspan cell is repeated at the same slot in the rows
/// below, down to the last rendered row.
fn place_rendered(rows: &[Vec<RenderedCell>]) -> SlotGrid<Placed> {
    let mut grid = SlotGrid::new();
    for (y, row) in rows.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let col = grid.next_free_col(y, x);
            let placed = Placed {
                width: cell.width,
                colspan: cell.cols_spanned(),
                key: cell.key.clone(),
            };
            for below in 1..cell.rows_spanned(rows.len() - y) {
                grid.insert(y + below, col, placed.clone());
            }
            grid.insert(y, col, placed);
        }
    }
    grid
}

/// Every x-offset where some row has a cell edge, ascending, without 0.
pub fn compute_boundaries(rows: &[Vec<RenderedCell>]) -> Vec<f64> {
    let grid = place_rendered(rows);
    let mut boundaries: Vec<f64> = (0..grid.row_count())
        .flat_map(|y| {
            grid.row(y).scan(0.0, |x, (_, placed)| {
                *x += placed.width;
                Some(*x)
            })
        })
        .filter(|x| *x > 0.0)
        .collect();
    boundaries.sort_by(f64::total_cmp);
    boundaries.dedup_by(|a, b| same_px(*a, *b));
    boundaries
}

/// Snapshot each rendered row's cells with their left edge and width.
pub fn capture_row_layout(rows: &[Vec<RenderedCell>]) -> RowLayout {
    let grid = place_rendered(rows);
    let rows = (0..rows.len())
        .map(|y| {
            let mut x = 0.0;
            grid.row(y)
                .map(|(_, placed)| {
                    let cell = LaidOutCell {
                        x_start: x,
                        width: placed.width,
                        colspan: placed.colspan,
                        key: placed.key.clone(),
                    };
                    x += placed.width;
                    cell
                })
                .collect()
        })
        .collect();
    RowLayout { rows }
}

/// Index of a drag handle within the current set of handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandleId(pub usize);

/// An invisible drag handle sitting on one boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeHandle {
    pub id: HandleId,
    /// Boundary offset from the table's left edge
    pub boundary: f64,
    /// Index of the first-row cell the handle is attached to
    pub cell_index: usize,
    pub cell_key: Option<String>,
    /// Offset from the host cell's left edge
    pub left: f64,
    pub width: f64,
    /// Full table height
    pub height: f64,
}

/// `(start, end)` pixel range of each first-row cell, in rendered order.
pub fn first_row_ranges(rows: &[Vec<RenderedCell>]) -> Vec<(f64, f64)> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    first
        .iter()
        .scan(0.0, |end, cell| {
            let start = *end;
            *end += cell.width;
            Some((start, *end))
        })
        .collect()
}

/// One handle per boundary that falls in `(start, end]` of a first-row cell.
pub fn handles_for_first_row(
    rows: &[Vec<RenderedCell>],
    table_height: f64,
    handle_width: f64,
) -> Vec<ResizeHandle> {
    let boundaries = compute_boundaries(rows);
    let first = rows.first();
    let mut handles = Vec::new();
    for (cell_index, (start, end)) in first_row_ranges(rows).into_iter().enumerate() {
        let cell_key = first
            .and_then(|row| row.get(cell_index))
            .and_then(|cell| cell.key.clone());
        for &boundary in boundaries.iter().filter(|&&b| b > start && b <= end) {
            handles.push(ResizeHandle {
                id: HandleId(handles.len()),
                boundary,
                cell_index,
                cell_key: cell_key.clone(),
                left: boundary - start - handle_width,
                width: handle_width,
                height: table_height,
            });
        }
    }
    handles
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;

    fn cell(key: &str, width: f64) -> RenderedCell {
        RenderedCell::new(key, width)
    }

    #[test]
    fn test_boundaries_uniform() {
        let rows = vec![
            vec![cell("a", 100.0), cell("b", 100.0), cell("c", 100.0)],
            vec![cell("d", 100.0), cell("e", 100.0), cell("f", 100.0)],
        ];
        assert_eq!(compute_boundaries(&rows), vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_boundaries_colspan_hides_inner_edge_in_its_row_only() {
        let rows = vec![
            vec![cell("a", 200.0).with_span(1, 2), cell("b", 100.0)],
            vec![cell("c", 100.0), cell("d", 100.0), cell("e", 100.0)],
        ];
        assert_eq!(compute_boundaries(&rows), vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_boundaries_rowspan_carried_down() {
        // a spans two rows, so row 1's cells start after it
        let rows = vec![
            vec![cell("a", 80.0).with_span(2, 1), cell("b", 120.0)],
            vec![cell("c", 50.0), cell("d", 70.0)],
        ];
        assert_eq!(compute_boundaries(&rows), vec![80.0, 130.0, 200.0]);
    }

    #[test]
    fn test_capture_row_layout_offsets() {
        let rows = vec![
            vec![cell("a", 80.0).with_span(2, 1), cell("b", 120.0)],
            vec![cell("c", 50.0), cell("d", 70.0)],
        ];
        let layout = capture_row_layout(&rows);
        assert_eq!(layout.rows.len(), 2);
        let second: Vec<(f64, Option<&str>)> = layout.rows[1]
            .iter()
            .map(|c| (c.x_start, c.key.as_deref()))
            .collect();
        assert_eq!(second, vec![(0.0, Some("a")), (80.0, Some("c")), (130.0, Some("d"))]);
    }

    #[test]
    fn test_capture_ignores_rows_below_table() {
        let rows = vec![vec![cell("a", 80.0).with_span(3, 1)]];
        assert_eq!(capture_row_layout(&rows).rows.len(), 1);
        let grid = place_rendered(&rows);
        assert_eq!(grid.row_count(), 1);
    }

    #[test]
    fn test_negative_spans_count_as_one() {
        let rows = vec![
            vec![cell("a", 100.0).with_span(-1, -1), cell("b", 100.0)],
            vec![cell("c", 100.0), cell("d", 100.0)],
        ];
        assert_eq!(compute_boundaries(&rows), vec![100.0, 200.0]);
        assert_eq!(capture_row_layout(&rows).rows[0][0].colspan, 1);
    }

    #[test]
    fn test_zero_width_cell_adds_no_boundary() {
        let rows = vec![vec![cell("z", 0.0), cell("a", 100.0)]];
        assert_eq!(compute_boundaries(&rows), vec![100.0]);
    }

    #[test]
    fn test_handles_placed_on_cell_right_edges() {
        let rows = vec![
            vec![cell("a", 200.0).with_span(1, 2), cell("b", 100.0)],
            vec![cell("c", 100.0), cell("d", 100.0), cell("e", 100.0)],
        ];
        let handles = handles_for_first_row(&rows, 60.0, 10.0);
        let placed: Vec<(f64, usize, f64)> = handles
            .iter()
            .map(|h| (h.boundary, h.cell_index, h.left))
            .collect();
        assert_eq!(
            placed,
            vec![(100.0, 0, 90.0), (200.0, 0, 190.0), (300.0, 1, 90.0)]
        );
        assert!(handles.iter().all(|h| h.height == 60.0 && h.width == 10.0));
        assert_eq!(handles[2].id, HandleId(2));
        assert_eq!(handles[2].cell_key.as_deref(), Some("b"));
    }

    #[test]
    fn test_no_rows_no_handles() {
        assert!(handles_for_first_row(&[], 10.0, 10.0).is_empty());
        assert!(compute_boundaries(&[]).is_empty());
    }
}

//! Width redistribution around one dragged boundary.
//!
//! Every move is computed from the drag-start snapshot, never from the
//! previous move, so the same `diff_x` always yields the same widths.

use std::collections::BTreeMap;

use serde::Serialize;

use super::geometry::same_px;
use super::surface::TableSurface;
use crate::options::SaturationPolicy;
use crate::types::{LaidOutCell, RowLayout};

/// Floor check for one move.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Saturation {
    /// Shortfall the neighbour's growth is reduced by
    pub adjust: f64,
    /// The move would push a cell already at the floor below it; reject it wholesale
    pub saturated: bool,
}

/// Live width lookup by cell key.
pub type LiveWidth<'a> = &'a dyn Fn(&str) -> Option<f64>;

/// Cells sitting immediately left of `boundary`, across all rows.
fn targets(layout: &RowLayout, boundary: f64) -> impl Iterator<Item = &LaidOutCell> {
    layout
        .rows
        .iter()
        .flatten()
        .filter(move |cell| cell.key.is_some() && cell.ends_at_or_spans(boundary))
}

/// Decide `adjust` and saturation for a move of `diff_x`.
///
/// A target is pinned when its live width already equals the floor.
pub fn saturation(
    layout: &RowLayout,
    boundary: f64,
    diff_x: f64,
    minimum_width: f64,
    live_width: LiveWidth<'_>,
    policy: SaturationPolicy,
) -> Saturation {
    let pinned = |cell: &LaidOutCell| {
        let live = cell
            .key
            .as_deref()
            .and_then(live_width)
            .unwrap_or(cell.width);
        same_px(live, minimum_width)
    };

    let mut result = Saturation::default();
    match policy {
        SaturationPolicy::LastTarget => {
            for cell in targets(layout, boundary) {
                if result.saturated {
                    break;
                }
                let projected = cell.width + diff_x;
                if !pinned(cell) && projected < minimum_width {
                    result.adjust = minimum_width - projected;
                    continue;
                }
                result.adjust = 0.0;
                result.saturated = projected <= minimum_width;
            }
        }
        SaturationPolicy::AllRows => {
            for cell in targets(layout, boundary) {
                let projected = cell.width + diff_x;
                if projected >= minimum_width {
                    continue;
                }
                if pinned(cell) {
                    result.saturated = true;
                } else {
                    result.adjust = result.adjust.max(minimum_width - projected);
                }
            }
        }
    }
    result
}

/// New width for one keyed cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidthAssignment {
    pub key: String,
    pub width: f64,
    /// False when the cell keeps its snapshot width
    pub changed: bool,
}

/// Widths for every keyed cell for one move, before touching the surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidthPlan {
    pub assignments: Vec<WidthAssignment>,
    pub adjust: f64,
    pub saturated: bool,
}

impl WidthPlan {
    /// Final width per cell key. A cell spanning several rows keeps its last assignment.
    pub fn widths(&self) -> BTreeMap<String, f64> {
        self.assignments
            .iter()
            .map(|a| (a.key.clone(), a.width))
            .collect()
    }
}

/// Plan the widths for dragging `boundary` by `diff_x`.
///
/// Per row, the first cell ending at the boundary grows by `diff_x` and the
/// next non-empty cell shrinks by it (less `adjust`); both stay at or above
/// `minimum_width`. A merged cell with the boundary strictly inside keeps its
/// width. A saturated move assigns nothing.
pub fn plan_cell_widths(
    layout: &RowLayout,
    boundary: f64,
    diff_x: f64,
    minimum_width: f64,
    live_width: LiveWidth<'_>,
    policy: SaturationPolicy,
) -> WidthPlan {
    let Saturation { adjust, saturated } =
        saturation(layout, boundary, diff_x, minimum_width, live_width, policy);
    if saturated {
        log::trace!("move of {diff_x}px at {boundary} rejected: floor reached");
        return WidthPlan {
            assignments: Vec::new(),
            adjust,
            saturated,
        };
    }

    let mut assignments = Vec::new();
    for row in &layout.rows {
        let mut has_current = false;
        let mut has_next = false;
        for cell in row {
            let Some(key) = cell.key.clone() else {
                continue;
            };
            let (width, changed) = if cell.straddles(boundary) {
                (cell.width, false)
            } else if !has_current && cell.ends_at_or_spans(boundary) {
                has_current = true;
                ((cell.width + diff_x).max(minimum_width), true)
            } else if has_current && !has_next && cell.width > 0.0 {
                has_next = true;
                ((cell.width - diff_x - adjust).max(minimum_width), true)
            } else {
                (cell.width, false)
            };
            assignments.push(WidthAssignment {
                key,
                width,
                changed,
            });
        }
    }
    log::trace!(
        "move of {diff_x}px at {boundary}: {} cells, adjust {adjust}",
        assignments.len()
    );

    WidthPlan {
        assignments,
        adjust,
        saturated,
    }
}

/// Widths applied for one move.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidthUpdate {
    /// Cell key to rendered width; empty when the move was rejected
    pub widths: BTreeMap<String, f64>,
    pub adjust: f64,
    pub saturated: bool,
}

impl WidthUpdate {
    /// True when the floor capped the neighbour's growth
    pub fn is_clamped(&self) -> bool {
        self.adjust > 0.0
    }
}

/// Plan a move and write the widths into `surface`.
///
/// Changed cells report the width the surface actually rendered.
pub fn update_cell_widths<S: TableSurface + ?Sized>(
    surface: &mut S,
    layout: &RowLayout,
    boundary: f64,
    diff_x: f64,
    minimum_width: f64,
    policy: SaturationPolicy,
) -> WidthUpdate {
    let plan = {
        let live = |key: &str| surface.rendered_width(key);
        plan_cell_widths(layout, boundary, diff_x, minimum_width, &live, policy)
    };

    let mut widths = BTreeMap::new();
    for assignment in plan.assignments {
        surface.apply_width(&assignment.key, assignment.width);
        let reported = if assignment.changed {
            surface
                .rendered_width(&assignment.key)
                .unwrap_or(assignment.width)
        } else {
            assignment.width
        };
        widths.insert(assignment.key, reported);
    }

    WidthUpdate {
        widths,
        adjust: plan.adjust,
        saturated: plan.saturated,
    }
}

//! Column boundary resizing for rendered tables.
//!
//! This module handles:
//! - Deriving the boundary set and per-row geometry from rendered cells
//! - Placing invisible drag handles over the first row
//! - Redistributing widths between the two cells beside a dragged boundary
//! - The Idle/Armed/Dragging lifecycle over a [`TableSurface`]

mod geometry;
mod machine;
mod surface;
mod widths;

pub use geometry::{
    capture_row_layout, compute_boundaries, first_row_ranges, handles_for_first_row, HandleId,
    ResizeHandle,
};
pub use machine::{
    ActiveDrag, ColumnResizer, EventQueue, PointerEvent, ResizeCallbacks, ResizeEvent,
    ResizePhase, ResizeState,
};
pub use surface::TableSurface;
pub use widths::{
    plan_cell_widths, saturation, update_cell_widths, LiveWidth, Saturation, WidthAssignment,
    WidthPlan, WidthUpdate,
};

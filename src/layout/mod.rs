//! Grid resolution for merged-cell tables.
//!
//! This module handles:
//! - Enumerating a table's cells through the host document
//! - Placing each cell at its declared slot, shifting right past occupied slots
//! - Stamping every slot a cell spans, marking the top-left one as real

mod grid;

pub use grid::{resolve, resolve_cells, ResolvedGrid};

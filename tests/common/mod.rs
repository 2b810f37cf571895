//! Common test utilities and assertion helpers.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::collections::BTreeMap;

use spantable::selection::selected_paths;
use spantable::{CellPath, DocumentTree, ResolvedGrid};

// Re-export fixtures for convenience
pub use super::fixtures::*;

/// Keys of the grid laid out row by row, `"-"` for an empty slot.
pub fn grid_keys(grid: &ResolvedGrid) -> Vec<Vec<String>> {
    grid.grid_table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|slot| slot.as_ref().map_or("-".to_string(), |s| s.key().to_string()))
                .collect()
        })
        .collect()
}

/// Keys of every node carrying the selection marker, in document order.
pub fn selected_keys(doc: &DocumentTree) -> Vec<String> {
    selected_paths(doc, &CellPath::root())
        .iter()
        .filter_map(|path| doc.node(path)?.key.clone())
        .collect()
}

/// Assert two pixel values are equal to within a hundredth of a pixel.
pub fn assert_px(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}px, got {actual}px"
    );
}

pub fn assert_widths(widths: &BTreeMap<String, f64>, expected: &[(&str, f64)]) {
    for (key, width) in expected {
        let actual = widths
            .get(*key)
            .unwrap_or_else(|| panic!("no width for {key} in {widths:?}"));
        assert_px(*actual, *width);
    }
}

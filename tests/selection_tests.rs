//! Rectangular selection between two cells.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;
mod fixtures;

use common::selected_keys;
use fixtures::{cell_path, table_path, TableBuilder};
use serde_json::json;
use spantable::selection::{
    covered_cells, locate_table, StyleRegistry, SELECTION_STYLE_ID, SELECTION_STYLE_RULE,
};
use spantable::{
    add_selection, remove_selection, resolve, CellPath, DocumentTree, Node, SpanTableError,
    TableOptions,
};
use test_case::test_case;

/// ```text
/// big big  x
/// big big  y
///  p   q   r
/// ```
fn merged_table() -> DocumentTree {
    TableBuilder::new()
        .spanned_row(&[("big", 2, 2), ("x", 1, 1)])
        .row(&["y"])
        .row(&["p", "q", "r"])
        .build()
}

fn select(doc: &mut DocumentTree, anchor: &str, focus: &str) -> Vec<String> {
    let mut styles = StyleRegistry::new();
    add_selection(
        doc,
        &mut styles,
        &TableOptions::default(),
        &cell_path(0, 0),
        anchor,
        focus,
    )
    .unwrap();
    selected_keys(doc)
}

// ============================================================================
// RECTANGLES
// ============================================================================

#[test]
fn test_span_anchor_to_neighbour() {
    let mut doc = merged_table();
    // big's first slot is (0, 0) and x sits at (0, 2): row 0, columns 0 to 2
    assert_eq!(select(&mut doc, "big", "x"), vec!["big", "x"]);
}

#[test]
fn test_rect_reaching_into_span_marks_whole_cell() {
    let mut doc = merged_table();
    // (1, 2) to (2, 1) covers big's slot (1, 1)
    assert_eq!(select(&mut doc, "y", "q"), vec!["big", "y", "q", "r"]);
}

#[test]
fn test_single_cell() {
    let mut doc = merged_table();
    assert_eq!(select(&mut doc, "q", "q"), vec!["q"]);
    assert_eq!(select(&mut doc, "big", "big"), vec!["big"]);
}

#[test]
fn test_whole_table() {
    let mut doc = merged_table();
    assert_eq!(
        select(&mut doc, "big", "r"),
        vec!["big", "x", "y", "p", "q", "r"]
    );
}

#[test_case("big", "r")]
#[test_case("x", "p")]
#[test_case("y", "q")]
#[test_case("q", "x")]
fn test_selection_is_symmetric(a: &str, b: &str) {
    let mut forward = merged_table();
    let mut backward = merged_table();
    assert_eq!(select(&mut forward, a, b), select(&mut backward, b, a));
}

#[test]
fn test_covered_slots_include_span_duplicates() {
    let doc = merged_table();
    let grid = resolve(&doc, &table_path(), &TableOptions::default(), None).unwrap();
    let covered = covered_cells(&grid, "big", "y").unwrap();
    // Rows 0-1, columns 0-2: four slots of big plus x and y
    assert_eq!(covered.len(), 6);
    assert_eq!(covered.iter().filter(|c| c.key() == "big").count(), 4);
}

// ============================================================================
// RESET AND NO-OPS
// ============================================================================

#[test]
fn test_smaller_selection_leaves_no_stale_markers() {
    let mut doc = merged_table();
    select(&mut doc, "big", "r");
    assert_eq!(select(&mut doc, "p", "p"), vec!["p"]);
}

#[test]
fn test_unknown_key_clears_and_stops() {
    let mut doc = merged_table();
    select(&mut doc, "big", "r");

    let mut styles = StyleRegistry::new();
    let err = add_selection(
        &mut doc,
        &mut styles,
        &TableOptions::default(),
        &cell_path(0, 0),
        "big",
        "missing",
    )
    .unwrap_err();

    assert!(matches!(err, SpanTableError::UnresolvedReference { ref key } if key == "missing"));
    assert!(err.is_no_op());
    assert!(selected_keys(&doc).is_empty());
    assert_eq!(styles.rule(SELECTION_STYLE_ID), Some(SELECTION_STYLE_RULE));
}

#[test]
fn test_location_outside_any_table() {
    let mut doc = merged_table();
    let mut styles = StyleRegistry::new();
    let err = add_selection(
        &mut doc,
        &mut styles,
        &TableOptions::default(),
        &CellPath::from(vec![0]),
        "big",
        "x",
    )
    .unwrap_err();
    assert!(matches!(err, SpanTableError::TableNotFound));
}

#[test]
fn test_empty_table_is_a_no_op() {
    let mut doc = TableBuilder::new().build();
    let mut styles = StyleRegistry::new();
    let err = add_selection(
        &mut doc,
        &mut styles,
        &TableOptions::default(),
        &table_path(),
        "a",
        "b",
    )
    .unwrap_err();
    assert!(matches!(err, SpanTableError::EmptyTable));
}

#[test]
fn test_remove_selection_clears_markers_and_style() {
    let mut doc = merged_table();
    let mut styles = StyleRegistry::new();
    add_selection(
        &mut doc,
        &mut styles,
        &TableOptions::default(),
        &cell_path(0, 0),
        "p",
        "r",
    )
    .unwrap();
    assert_eq!(styles.len(), 1);

    assert_eq!(remove_selection(&mut doc, &mut styles), 3);
    assert!(styles.is_empty());
    assert!(selected_keys(&doc).is_empty());
}

#[test]
fn test_marker_carries_configured_color() {
    let mut doc = merged_table();
    let mut styles = StyleRegistry::new();
    let options = TableOptions {
        selection_color: "#abcdef".to_string(),
        ..TableOptions::default()
    };
    add_selection(&mut doc, &mut styles, &options, &cell_path(0, 0), "x", "x").unwrap();
    let x = doc.node(&cell_path(0, 1)).unwrap();
    assert_eq!(x.attribute("selectionColor"), Some(&json!("#abcdef")));
}

// ============================================================================
// NESTED TABLES
// ============================================================================

#[test]
fn test_innermost_table_is_chosen() {
    let inner = Node::new("table").with_child(
        Node::new("table-row")
            .with_child(Node::new("table-cell").with_key("i1"))
            .with_child(Node::new("table-cell").with_key("i2")),
    );
    let mut doc = TableBuilder::new()
        .node_row(vec![
            Node::new("table-cell").with_key("o1").with_child(inner),
            Node::new("table-cell").with_key("o2"),
        ])
        .build();
    let inner_cell = CellPath::from(vec![1, 0, 0, 0, 0, 1]);

    let options = TableOptions::default();
    assert_eq!(
        locate_table(&doc, &options, &inner_cell),
        Some(CellPath::from(vec![1, 0, 0, 0]))
    );

    let mut styles = StyleRegistry::new();
    add_selection(&mut doc, &mut styles, &options, &inner_cell, "i1", "i2").unwrap();
    assert_eq!(selected_keys(&doc), vec!["i1", "i2"]);
}

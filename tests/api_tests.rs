//! JSON entry points as a JavaScript host would call them.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]

mod common;
mod fixtures;

use fixtures::TableBuilder;
use serde_json::{json, Value};
use spantable::api::{
    clear_selection_json, redistribute_widths_json, resolve_table_json, select_cells_json,
    table_boundaries_json,
};
use spantable::selection::{StyleRegistry, SELECTION_STYLE_ID};
use spantable::{resolve_table, select_cells, version};

fn document() -> String {
    serde_json::to_string(
        &TableBuilder::new()
            .spanned_row(&[("h", 1, 3)])
            .row(&["a", "b", "c"])
            .build(),
    )
    .unwrap()
}

#[test]
fn test_select_then_clear_round() {
    let mut styles = StyleRegistry::new();
    let selected = select_cells_json(&document(), &mut styles, "[1]", "a", "c", None).unwrap();
    let outcome: Value = serde_json::from_str(&selected).unwrap();
    assert_eq!(outcome["selected"], json!([[1, 1, 0], [1, 1, 1], [1, 1, 2]]));
    let first_row = &outcome["document"]["children"][1]["children"][1];
    assert_eq!(first_row["children"][0]["selectionColor"], "rgb(185, 211, 252)");

    let cleared = clear_selection_json(&outcome["document"].to_string(), &mut styles).unwrap();
    let outcome: Value = serde_json::from_str(&cleared).unwrap();
    assert_eq!(outcome["cleared"], 3);
    assert!(styles.is_empty());
}

#[test]
fn test_caller_held_registry_keeps_style_between_calls() {
    let mut styles = StyleRegistry::new();
    let first = select_cells_json(&document(), &mut styles, "[1]", "a", "b", None).unwrap();
    assert!(styles.rule(SELECTION_STYLE_ID).is_some());

    let doc = serde_json::from_str::<Value>(&first).unwrap()["document"].to_string();
    select_cells_json(&doc, &mut styles, "[1]", "b", "c", None).unwrap();
    assert_eq!(styles.len(), 1);

    clear_selection_json(&doc, &mut styles).unwrap();
    assert!(styles.rule(SELECTION_STYLE_ID).is_none());
}

#[test]
fn test_selecting_header_covers_its_span() {
    let mut styles = StyleRegistry::new();
    let out = select_cells_json(&document(), &mut styles, "[1, 0, 0]", "h", "b", None).unwrap();
    let outcome: Value = serde_json::from_str(&out).unwrap();
    // h at (0, 0), b at (1, 1): the rectangle holds h's first two slots, a and b
    assert_eq!(outcome["covered"], 4);
    assert_eq!(outcome["selected"], json!([[1, 0, 0], [1, 1, 0], [1, 1, 1]]));
}

#[test]
fn test_wasm_exports_work_natively() {
    let grid: Value =
        serde_json::from_str(&resolve_table(&document(), "[1]", None, None).unwrap()).unwrap();
    assert_eq!(grid["gridTable"][0][2]["cell"]["key"], "h");
    assert_eq!(grid["gridTable"][0][2]["isReal"], false);

    let out = select_cells(&document(), "[1]", "a", "a", None).unwrap();
    let outcome: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(outcome["covered"], 1);
    assert!(!version().is_empty());
}

#[test]
fn test_resolve_with_insert_position() {
    let out = resolve_table_json(&document(), "[1]", None, Some("c")).unwrap();
    let grid: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(grid["insertPosition"], json!([1, 2]));
    assert_eq!(grid["gridTable"][1][2]["isInsertPosition"], true);
}

#[test]
fn test_geometry_entry_points() {
    let rows = json!([
        [{"key": "h", "width": 300, "colSpan": 3}],
        [{"key": "a", "width": 100}, {"key": "b", "width": 100}, {"key": "c", "width": 100}]
    ])
    .to_string();
    assert_eq!(table_boundaries_json(&rows).unwrap(), "[100.0,200.0,300.0]");

    let out = redistribute_widths_json(&rows, 200.0, 30.0, None).unwrap();
    let update: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(update["widths"]["h"], 300.0);
    assert_eq!(update["widths"]["b"], 130.0);
    assert_eq!(update["widths"]["c"], 70.0);
}

#[test]
fn test_negative_spans_are_clamped_not_rejected() {
    let doc = json!({"children": [{"type": "table", "children": [
        {"type": "table-row", "children": [
            {"type": "table-cell", "key": "a", "rowspan": -1},
            {"type": "table-cell", "key": "b", "colspan": -4}
        ]}
    ]}]})
    .to_string();
    let mut styles = StyleRegistry::new();
    let out = select_cells_json(&doc, &mut styles, "[0]", "a", "b", None).unwrap();
    let outcome: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(outcome["covered"], 2);
    assert_eq!(outcome["selected"], json!([[0, 0, 0], [0, 0, 1]]));
    assert!(resolve_table_json(&doc, "[0]", None, None).unwrap().contains("gridTable"));

    let rows = json!([[
        {"key": "a", "width": 100, "colSpan": -1},
        {"key": "b", "width": 100, "rowSpan": -3}
    ]])
    .to_string();
    assert_eq!(table_boundaries_json(&rows).unwrap(), "[100.0,200.0]");
    let out = redistribute_widths_json(&rows, 100.0, 20.0, None).unwrap();
    let update: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(update["widths"]["a"], 120.0);
    assert_eq!(update["widths"]["b"], 80.0);
}

#[test]
fn test_last_target_policy_from_options() {
    let rows = json!([[{"key": "a", "width": 100}, {"key": "b", "width": 100}]]).to_string();
    let options = json!({"minimumCellWidth": 50, "saturation": "lastTarget"}).to_string();
    let out = redistribute_widths_json(&rows, 100.0, -50.0, Some(&options)).unwrap();
    let update: Value = serde_json::from_str(&out).unwrap();
    // Landing exactly on the floor counts as saturated under this policy
    assert_eq!(update["saturated"], true);
    assert_eq!(update["widths"], json!({}));
}

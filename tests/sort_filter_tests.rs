//! Sort/filter pipeline: stability, filtered views, re-filter after mutation.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cmp::Ordering;

use common::{field_values, grid, numbered, people, people_grid};
use serde_json::{json, Value};
use test_case::test_case;
use vgrid::rows::{
    ActiveSequence, Comparator, DefaultComparators, FilterSpec, RowPipeline, SortKey,
};
use vgrid::GridError;

fn keyed_rows() -> Vec<Value> {
    vec![
        json!({"id": 1, "k": "a"}),
        json!({"id": 2, "k": "a"}),
        json!({"id": 3, "k": "b"}),
    ]
}

fn ids(pipeline: &RowPipeline<Value>) -> Vec<Value> {
    field_values(pipeline.store().iter(), "id")
}

// ============================================================================
// Sorting
// ============================================================================

#[test_case(false, &[1, 2, 3] ; "ascending keeps tie order")]
#[test_case(true, &[3, 1, 2] ; "descending keeps tie order")]
fn test_sort_is_stable(descending: bool, expected: &[i64]) {
    let mut pipeline = RowPipeline::with_rows(keyed_rows());
    pipeline.sort(vec![SortKey::new("k", descending)], &DefaultComparators);
    let expected: Vec<Value> = expected.iter().map(|&n| json!(n)).collect();
    assert_eq!(ids(&pipeline), expected);
}

#[test]
fn test_descending_after_ascending_keeps_ties() {
    let mut pipeline = RowPipeline::with_rows(keyed_rows());
    pipeline.sort(vec![SortKey::new("k", false)], &DefaultComparators);
    pipeline.sort(vec![SortKey::new("k", true)], &DefaultComparators);
    assert_eq!(ids(&pipeline), vec![json!(3), json!(1), json!(2)]);
}

#[test]
fn test_secondary_key_breaks_ties() {
    let mut pipeline = RowPipeline::with_rows(keyed_rows());
    pipeline.sort(
        vec![SortKey::new("k", false), SortKey::new("id", true)],
        &DefaultComparators,
    );
    assert_eq!(ids(&pipeline), vec![json!(2), json!(1), json!(3)]);
}

#[test]
fn test_missing_values_sort_first() {
    let mut pipeline = RowPipeline::with_rows(vec![
        json!({"id": 1, "n": 5}),
        json!({"id": 2}),
        json!({"id": 3, "n": -1}),
        json!({"id": 4, "n": null}),
    ]);
    pipeline.sort(vec![SortKey::new("n", false)], &DefaultComparators);
    assert_eq!(ids(&pipeline), vec![json!(2), json!(4), json!(3), json!(1)]);
}

#[test]
fn test_nested_compare_path() {
    let mut pipeline = RowPipeline::with_rows(vec![
        json!({"id": 1, "owner": {"age": 40}}),
        json!({"id": 2, "owner": {"age": 20}}),
    ]);
    let key = SortKey::new("owner", false).with_compare_path(vec!["owner".into(), "age".into()]);
    pipeline.sort(vec![key], &DefaultComparators);
    assert_eq!(ids(&pipeline), vec![json!(2), json!(1)]);
}

#[test]
fn test_comparator_override_is_used() {
    // Sort names by length instead of lexically
    let by_length = |column: &str, descending: bool| -> Option<Comparator<Value>> {
        (column == "name").then(|| {
            Box::new(move |a: &Value, b: &Value| {
                let ordering = a["name"]
                    .as_str()
                    .map(str::len)
                    .cmp(&b["name"].as_str().map(str::len));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            }) as Comparator<Value>
        })
    };
    let mut pipeline = RowPipeline::with_rows(people());
    pipeline.sort(vec![SortKey::new("name", false)], &by_length);
    let names = field_values(pipeline.store().iter(), "name");
    assert_eq!(names, vec![json!("al"), json!("bob"), json!("ALEX"), json!("Alice"), json!("Carol")]);
}

#[test]
fn test_sort_without_keys_is_noop() {
    let mut pipeline = RowPipeline::with_rows(keyed_rows());
    assert!(!pipeline.resort(&DefaultComparators));
    assert_eq!(ids(&pipeline), vec![json!(1), json!(2), json!(3)]);
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_filter_keeps_origin_indices() {
    let mut pipeline = RowPipeline::with_rows(people());
    pipeline.filter(FilterSpec::new("name", "Al", false));
    let view = pipeline.filtered_view().unwrap();
    assert_eq!(view.origin_indices(), &[0, 2, 4]);
    let names: Vec<Value> = field_values(
        view.rows(pipeline.store()).map(|r| r.row),
        "name",
    );
    assert_eq!(names, vec![json!("Alice"), json!("ALEX"), json!("al")]);
    assert_eq!(pipeline.state(), ActiveSequence::Filtered);
}

#[test_case("Al", true, &[0] ; "case sensitive")]
#[test_case("al", false, &[0, 2, 4] ; "case insensitive lowercase needle")]
#[test_case("zzz", false, &[] ; "no match")]
#[test_case("o", false, &[1, 3] ; "inner substring")]
fn test_filter_matches(text: &str, case_sensitive: bool, expected: &[usize]) {
    let mut pipeline = RowPipeline::with_rows(people());
    let view = pipeline
        .filter(FilterSpec::new("name", text, case_sensitive))
        .unwrap();
    assert_eq!(view.origin_indices(), expected);
}

#[test]
fn test_filter_numbers_by_text() {
    let mut pipeline = RowPipeline::with_rows(numbered(30));
    let view = pipeline.filter(FilterSpec::new("n", "2", false)).unwrap();
    assert_eq!(view.origin_indices(), &[2, 12, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29]);
}

#[test]
fn test_empty_filter_clears() {
    let mut pipeline = RowPipeline::with_rows(people());
    pipeline.filter(FilterSpec::new("name", "Al", false));
    assert!(pipeline.filter(FilterSpec::new("name", "", false)).is_none());
    assert_eq!(pipeline.state(), ActiveSequence::Unfiltered);
    assert_eq!(pipeline.active_len(), 5);
}

#[test]
fn test_append_appears_in_filtered_view() {
    let mut pipeline = RowPipeline::with_rows(people());
    pipeline.filter(FilterSpec::new("name", "Al", false));
    let range = pipeline.add(vec![json!({"id": 5, "name": "Alfred"}), json!({"id": 6, "name": "Zed"})], None);
    assert_eq!(range, 5..7);
    let view = pipeline.filtered_view().unwrap();
    assert_eq!(view.origin_indices(), &[0, 2, 4, 5]);
    assert_eq!(pipeline.store().get(5).unwrap()["name"], "Alfred");
}

#[test]
fn test_insert_front_shifts_origins() {
    let mut pipeline = RowPipeline::with_rows(people());
    pipeline.filter(FilterSpec::new("name", "Al", false));
    pipeline.add(vec![json!({"id": 9, "name": "nope"})], Some(0));
    assert_eq!(pipeline.filtered_view().unwrap().origin_indices(), &[1, 3, 5]);
}

#[test]
fn test_remove_updates_view() {
    let mut pipeline = RowPipeline::with_rows(people());
    pipeline.filter(FilterSpec::new("name", "Al", false));
    let removed = pipeline.remove_at(0).unwrap();
    assert_eq!(removed["name"], "Alice");
    assert_eq!(pipeline.filtered_view().unwrap().origin_indices(), &[1, 3]);
    assert!(pipeline.remove_at(10).is_err());
}

#[test]
fn test_sort_rebuilds_filtered_view() {
    let mut pipeline = RowPipeline::with_rows(people());
    pipeline.filter(FilterSpec::new("name", "Al", false));
    pipeline.sort(vec![SortKey::new("name", false)], &DefaultComparators);
    // Store order: ALEX, Alice, Carol, al, bob
    let view = pipeline.filtered_view().unwrap();
    assert_eq!(view.origin_indices(), &[0, 1, 3]);
    let first = pipeline.active_row(0).unwrap();
    assert_eq!(first["name"], "ALEX");
    assert_eq!(pipeline.physical_index(2), Some(3));
    assert_eq!(pipeline.active_index_of(2), None);
}

// ============================================================================
// Through the grid
// ============================================================================

#[test]
fn test_grid_filter_then_append_and_resort() {
    let mut g = people_grid();
    g.sort("name", Some(true), false).unwrap();
    g.filter("name", "al", false).unwrap();
    assert_eq!(g.visible_row_count(), 3);

    g.add_rows(vec![json!({"id": 5, "name": "Alma"})], true);
    assert_eq!(g.row_count(), 6);
    assert_eq!(g.visible_row_count(), 4);
    let active: Vec<Value> = (0..g.visible_row_count())
        .map(|i| g.data_for_filtered_row(i).unwrap()["name"].clone())
        .collect();
    assert_eq!(active, vec![json!("al"), json!("Alma"), json!("Alice"), json!("ALEX")]);
    for i in 0..g.visible_row_count() {
        let physical = g.physical_index(i).unwrap();
        assert_eq!(
            g.data_for_row(physical),
            g.data_for_filtered_row(i)
        );
    }
}

#[test]
fn test_grid_sort_stack_with_add() {
    let mut g = grid(
        r#"{
            "columns": [{"name": "k"}, {"name": "id"}, {"name": "other"}],
            "sortableColumns": 2
        }"#,
    );
    g.set_rows(
        vec![json!({"id": 1, "k": "b"}), json!({"id": 2, "k": "a"}), json!({"id": 3, "k": "a"})],
        false,
    );
    g.sort("k", None, false).unwrap();
    let stack = g.sort("id", Some(true), true).unwrap();
    assert_eq!(stack.len(), 2);
    assert_eq!(field_values(g.rows(), "id"), vec![json!(3), json!(2), json!(1)]);

    // Stack is full: adding a third key starts over
    let stack = g.sort("other", None, true).unwrap();
    assert_eq!(stack.len(), 1);
    assert_eq!(stack[0].column, "other");

    // Re-adding a key that is not on top clears the stack
    g.sort("k", None, false).unwrap();
    g.sort("id", None, true).unwrap();
    let stack = g.sort("k", None, true).unwrap();
    assert_eq!(stack.len(), 1);
}

#[test]
fn test_grid_filter_unknown_column() {
    let mut g = people_grid();
    assert!(matches!(
        g.filter("missing", "x", false),
        Err(GridError::UnknownColumn(_))
    ));
    assert_eq!(g.visible_row_count(), 5);
    assert!(g.filter_spec().is_none());
}

#[test]
fn test_grid_clear_filter_restores_all_rows() {
    let mut g = people_grid();
    g.filter("name", "al", false).unwrap();
    g.clear_filter();
    assert_eq!(g.visible_row_count(), 5);
    assert_eq!(g.active_sequence(), ActiveSequence::Unfiltered);
}

#[test]
fn test_cell_value_follows_data_path() {
    let mut g = grid(r#"{"columns": [{"name": "owner", "dataPath": "owner.name"}]}"#);
    g.set_rows(vec![json!({"owner": {"name": "ann"}})], false);
    assert_eq!(
        g.cell_value(0, "owner").unwrap().compare(&vgrid::CellValue::Text("ann")),
        Ordering::Equal
    );
    assert!(g.cell_value(3, "owner").is_err());
}

//! End-to-end grid behaviour: options, scrolling, and window maintenance
//! across data changes.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{grid, numbered, people_grid};
use serde_json::{json, Value};
use vgrid::{DataGrid, GridError, GridOptions, RowHeights, RowWindow, SortedColumn};

fn scrolling_grid(rows: usize) -> DataGrid<Value> {
    let mut g = grid(r#"{"columns": [{"name": "n", "width": "100%"}], "rowsBufferSize": 2}"#);
    g.set_row_heights(RowHeights::uniform(10.0));
    g.set_rows(numbered(rows), false);
    g.resize(300.0, 100.0);
    g
}

fn window(first: usize, last: usize) -> Option<RowWindow> {
    RowWindow::new(first, last)
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_options_defaults() {
    let options = GridOptions::from_json(r#"{"columns": []}"#).unwrap();
    assert!(options.settings.virtual_table);
    assert_eq!(options.settings.rows_buffer_size, 3);
    assert_eq!(options.settings.min_column_width, 35.0);
    assert_eq!(options.settings.sortable_columns, 1);
    assert!(options.settings.relative_width_grows_to_fill_width);
    assert!(!options.settings.relative_width_shrinks_to_fill_width);
}

#[test]
fn test_negative_min_width_clamps_to_zero() {
    let options = GridOptions::from_json(r#"{"minColumnWidth": -5}"#).unwrap();
    assert_eq!(options.settings.min_column_width, 0.0);
}

#[test]
fn test_malformed_options_report_json_error() {
    let result = DataGrid::<Value>::from_json(r#"{"columns": 3}"#);
    assert!(matches!(result, Err(GridError::Json(_))));
}

#[test]
fn test_initial_sort_applies_and_skips_unknown() {
    let mut g = grid(
        r#"{
            "columns": [{"name": "name"}],
            "sortColumn": ["ghost", {"column": "name", "descending": true}]
        }"#,
    );
    assert_eq!(
        g.sorted_columns(),
        vec![SortedColumn {
            column: "name".into(),
            descending: true
        }]
    );
    g.set_rows(vec![json!({"name": "a"}), json!({"name": "c"}), json!({"name": "b"})], true);
    assert_eq!(g.data_for_row(0).unwrap()["name"], "c");
    assert_eq!(g.data_for_row(2).unwrap()["name"], "a");
}

// ============================================================================
// Scrolling
// ============================================================================

#[test]
fn test_scroll_produces_incremental_updates() {
    let mut g = scrolling_grid(1000);
    let first = g.update_window();
    assert!(first.clear_all);
    assert_eq!(first.window, window(0, 11));

    let next = g.scroll_to(50.0);
    assert!(!next.clear_all);
    assert_eq!(next.window, window(3, 16));
    assert_eq!(next.remove_front, 3);
    assert_eq!(next.add_back, window(12, 16));

    let rows = g.window_rows();
    assert_eq!(rows.len(), 14);
    assert_eq!(rows[0].origin_index, 3);
    assert_eq!(rows[0].row["n"], 3);
}

#[test]
fn test_scroll_clamps_to_content() {
    let mut g = scrolling_grid(50);
    assert_eq!(g.total_scroll_height(), 500.0);
    let update = g.scroll_to(10_000.0);
    assert_eq!(g.viewport().scroll_y, 400.0);
    assert_eq!(update.window.unwrap().last, 49);

    g.scroll_by(-1000.0);
    assert_eq!(g.viewport().scroll_y, 0.0);
}

#[test]
fn test_filter_invalidates_window_and_shrinks_scroll() {
    let mut g = scrolling_grid(1000);
    g.scroll_to(5000.0);
    g.filter("n", "99", false).unwrap();
    // 99, 199, 299, ..., 990..=999
    assert_eq!(g.visible_row_count(), 19);
    assert_eq!(g.viewport().scroll_y, 90.0);

    let update = g.update_window();
    assert!(update.clear_all);
    let w = update.window.unwrap();
    assert_eq!(w.last, 18);
    let origins: Vec<usize> = g.window_rows().iter().map(|r| r.origin_index).collect();
    assert_eq!(origins.last(), Some(&999));
}

#[test]
fn test_empty_grid_renders_nothing() {
    let mut g = scrolling_grid(0);
    let update = g.update_window();
    assert_eq!(update.window, None);
    assert!(g.window_rows().is_empty());
    assert_eq!(g.total_scroll_height(), 1.0);
}

#[test]
fn test_non_virtual_grid_renders_all_rows() {
    let mut g = grid(r#"{"columns": [{"name": "n"}], "virtualTable": false}"#);
    g.set_rows(numbered(250), false);
    g.resize(300.0, 100.0);
    let update = g.scroll_to(0.0);
    assert_eq!(update.window, window(0, 249));
    assert!(g.scroll_to(80.0).is_noop());
}

#[test]
fn test_row_offsets_with_distinct_first_row() {
    let mut g = scrolling_grid(10);
    g.set_row_heights(RowHeights::new(12.0, 10.0, 11.0));
    assert_eq!(g.row_offset(0), 0.0);
    assert_eq!(g.row_offset(1), 12.0);
    assert_eq!(g.row_offset(3), 32.0);
    assert_eq!(g.total_scroll_height(), 103.0);
    assert!(g.update_window().clear_all);
}

// ============================================================================
// Row changes
// ============================================================================

#[test]
fn test_refresh_row_reports_render_state() {
    let mut g = scrolling_grid(1000);
    g.update_window();
    assert_eq!(g.refresh_row(5).unwrap().active_index, Some(5));
    assert!(g.refresh_row(5).unwrap().rendered);
    assert!(!g.refresh_row(500).unwrap().rendered);
    assert!(matches!(
        g.refresh_row(1000),
        Err(GridError::RowOutOfRange { index: 1000, len: 1000 })
    ));
}

#[test]
fn test_remove_row_keeps_filter_consistent() {
    let mut g = people_grid();
    g.filter("name", "al", false).unwrap();
    let removed = g.remove_row(2).unwrap();
    assert_eq!(removed["name"], "ALEX");
    assert_eq!(g.visible_row_count(), 2);
    assert_eq!(g.physical_index(1), Some(3));
    assert_eq!(g.active_index_of(3), Some(1));
    assert!(g.remove_row(42).is_err());
    assert_eq!(g.row_count(), 4);
}

#[test]
fn test_insert_rows_at_front() {
    let mut g = people_grid();
    let range = g.insert_rows(vec![json!({"id": 10, "name": "Zoe"})], 0);
    assert_eq!(range, 0..1);
    assert_eq!(g.data_for_row(0).unwrap()["name"], "Zoe");
    assert_eq!(g.row_count(), 6);
}

// ============================================================================
// Widths
// ============================================================================

#[test]
fn test_resize_recomputes_widths_once() {
    let mut g = people_grid();
    assert!(g.resize(600.0, 300.0));
    assert!(!g.resize(600.0, 200.0));
    assert_eq!(g.column_widths().get("name").unwrap().actual_width, 550.0);
}

#[test]
fn test_scrollbar_narrows_last_column() {
    let mut g = people_grid();
    g.resize(600.0, 300.0);
    g.set_scrollbar_width(15.0);
    let name = g.columns().get("name").unwrap();
    assert_eq!(name.actual_width, 550.0);
    assert_eq!(name.actual_width_considering_scrollbar, Some(535.0));
    assert_eq!(g.content_width(), 585.0);
}

#[test]
fn test_measurer_drives_auto_columns() {
    let mut g = grid(r#"{"columns": [{"name": "title", "label": "Title"}, {"name": "rest", "width": "100%"}]}"#);
    g.set_measurer(Box::new(|text: &str| text.len() as f64 * 10.0));
    g.table_width_changed(500.0, true);
    // 5 chars * 10px + 20px padding
    assert_eq!(g.column_widths().get("title").unwrap().actual_width, 70.0);
    assert_eq!(g.column_widths().get("rest").unwrap().actual_width, 430.0);
}

#[test]
fn test_min_column_width_change_relayouts() {
    let mut g = grid(r#"{"columns": [{"name": "a", "width": "5%"}, {"name": "b", "width": "95%"}]}"#);
    g.table_width_changed(1000.0, true);
    assert_eq!(g.column_widths().get("a").unwrap().actual_width, 50.0);
    g.set_min_column_width(80.0);
    assert_eq!(g.column_widths().get("a").unwrap().actual_width, 80.0);
    assert_eq!(g.column_widths().total(), 1000.0);
}

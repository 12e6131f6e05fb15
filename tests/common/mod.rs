//! Common test builders for grids, columns and rows.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

use serde_json::{json, Value};
use vgrid::layout::{compute_column_widths, CharWidthMeasurer, ColumnWidths};
use vgrid::{Column, ColumnSpec, DataGrid, GridOptions, GridSettings};

// ============================================================================
// Grids
// ============================================================================

/// Build a JSON-row grid from an options document.
pub fn grid(options: &str) -> DataGrid<Value> {
    DataGrid::from_json(options).expect("valid grid options")
}

/// Build a grid from column specs with default settings.
pub fn grid_with_columns(columns: Vec<ColumnSpec>) -> DataGrid<Value> {
    DataGrid::new(GridOptions {
        columns,
        ..Default::default()
    })
    .expect("valid columns")
}

/// A `name` column filling the width, with the five people rows loaded.
pub fn people_grid() -> DataGrid<Value> {
    let mut g = grid(r#"{"columns": [{"name": "id", "width": 50}, {"name": "name", "width": "100%"}]}"#);
    g.set_rows(people(), false);
    g
}

// ============================================================================
// Rows
// ============================================================================

/// `["Alice", "bob", "ALEX", "Carol", "al"]` with ids 0..5.
pub fn people() -> Vec<Value> {
    ["Alice", "bob", "ALEX", "Carol", "al"]
        .iter()
        .enumerate()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect()
}

/// `count` rows `{ "n": i }`.
pub fn numbered(count: usize) -> Vec<Value> {
    (0..count).map(|n| json!({ "n": n })).collect()
}

/// Values of `field` for each row, in order.
pub fn field_values<'a>(rows: impl IntoIterator<Item = &'a Value>, field: &str) -> Vec<Value> {
    rows.into_iter().map(|r| r[field].clone()).collect()
}

// ============================================================================
// Widths
// ============================================================================

pub fn column(spec: ColumnSpec, settings: &GridSettings) -> Column {
    Column::from_spec(&spec, settings).expect("valid column")
}

/// Allocate widths with an 8px-per-character measurer and no scrollbar.
pub fn allocate(specs: Vec<ColumnSpec>, available: f64, settings: &GridSettings) -> ColumnWidths {
    let columns: Vec<Column> = specs.into_iter().map(|s| column(s, settings)).collect();
    let refs: Vec<&Column> = columns.iter().collect();
    compute_column_widths(&refs, available, settings, &CharWidthMeasurer::new(8.0), 0.0)
}

pub fn actual_widths(widths: &ColumnWidths) -> Vec<f64> {
    widths.columns.iter().map(|c| c.actual_width).collect()
}

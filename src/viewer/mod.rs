//! `GridView` - the WebAssembly entry point.
//!
//! Wraps a [`DataGrid`] over JSON rows. The page owns the DOM and the
//! rendering; this facade answers with widths, row windows and row data:
//! - Loading and mutating rows
//! - Sorting and filtering
//! - Column model changes and width allocation
//! - Scroll tracking and window diffs
//! - Deferred layout when the container is not attached yet

mod bridge;
mod schedule;

use js_sys::Function;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::columns::ColumnRef;
use crate::grid::DataGrid;
use crate::layout::{CachedMeasurer, RowHeights};
use crate::types::{ColumnSpec, GridOptions, WidthValue};

use bridge::{JsComparators, JsMeasurer};
use schedule::DeferredLayout;

/// Header widths measured through JS are cached up to this many labels.
const MEASURE_CACHE_SIZE: usize = 512;

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Column reference from JS: a name or a numeric position.
enum JsColumn {
    Name(String),
    Position(usize),
}

impl JsColumn {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_js(value: &JsValue) -> Result<Self, JsValue> {
        if let Some(name) = value.as_string() {
            return Ok(Self::Name(name));
        }
        match value.as_f64() {
            Some(n) if n.is_finite() && n >= 0.0 => Ok(Self::Position(n as usize)),
            _ => Err(JsValue::from_str("column must be a name or a position")),
        }
    }

    fn column_ref(&self) -> ColumnRef<'_> {
        match self {
            Self::Name(name) => ColumnRef::Name(name),
            Self::Position(position) => ColumnRef::Position(*position),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WindowRow<'a> {
    index: usize,
    origin_index: usize,
    row: &'a Value,
}

#[wasm_bindgen]
pub struct GridView {
    grid: DataGrid<Value>,
    layout: DeferredLayout,
    destroyed: bool,
}

impl GridView {
    fn with_grid(grid: DataGrid<Value>) -> Self {
        Self {
            grid,
            layout: DeferredLayout::default(),
            destroyed: false,
        }
    }

    fn check_alive(&self) -> Result<(), JsValue> {
        if self.destroyed {
            Err(JsValue::from_str("grid view was destroyed"))
        } else {
            Ok(())
        }
    }
}

#[wasm_bindgen]
impl GridView {
    /// Create a view from an options object (`{ columns, sortColumn, ... }`).
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<GridView, JsValue> {
        console_error_panic_hook::set_once();
        let options: GridOptions = serde_wasm_bindgen::from_value(options)?;
        Ok(Self::with_grid(DataGrid::new(options)?))
    }

    /// Create a view from an options JSON string.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(options: &str) -> Result<GridView, JsValue> {
        console_error_panic_hook::set_once();
        Ok(Self::with_grid(DataGrid::from_json(options)?))
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    /// `measure(text) -> number`, e.g. backed by `ctx.measureText`.
    #[wasm_bindgen(js_name = setMeasurer)]
    pub fn set_measurer(&mut self, measure: Function) {
        let measurer = CachedMeasurer::new(JsMeasurer::new(measure), MEASURE_CACHE_SIZE);
        self.grid.set_measurer(Box::new(measurer));
    }

    /// `lookup(column, descending) -> ((a, b) => number) | undefined`.
    #[wasm_bindgen(js_name = setComparator)]
    pub fn set_comparator(&mut self, lookup: Function) {
        self.grid
            .set_comparator_lookup(Box::new(JsComparators::new(lookup)));
    }

    // ========================================================================
    // Rows
    // ========================================================================

    #[wasm_bindgen(js_name = setRows)]
    pub fn set_rows(&mut self, rows: JsValue, resort: bool) -> Result<(), JsValue> {
        self.check_alive()?;
        let rows: Vec<Value> = serde_wasm_bindgen::from_value(rows)?;
        self.grid.set_rows(rows, resort);
        Ok(())
    }

    #[wasm_bindgen(js_name = addRows)]
    pub fn add_rows(&mut self, rows: JsValue, resort: bool) -> Result<usize, JsValue> {
        self.check_alive()?;
        let rows: Vec<Value> = serde_wasm_bindgen::from_value(rows)?;
        Ok(self.grid.add_rows(rows, resort))
    }

    #[wasm_bindgen(js_name = insertRows)]
    pub fn insert_rows(&mut self, rows: JsValue, at: usize) -> Result<usize, JsValue> {
        self.check_alive()?;
        let rows: Vec<Value> = serde_wasm_bindgen::from_value(rows)?;
        Ok(self.grid.insert_rows(rows, at).start)
    }

    /// Remove a row by physical index and return it.
    #[wasm_bindgen(js_name = removeRow)]
    pub fn remove_row(&mut self, physical: usize) -> Result<JsValue, JsValue> {
        self.check_alive()?;
        let row = self.grid.remove_row(physical)?;
        to_js(&row)
    }

    #[wasm_bindgen(js_name = refreshRow)]
    pub fn refresh_row(&self, physical: usize) -> Result<JsValue, JsValue> {
        to_js(&self.grid.refresh_row(physical)?)
    }

    #[wasm_bindgen(js_name = rowCount)]
    pub fn row_count(&self) -> usize {
        self.grid.row_count()
    }

    #[wasm_bindgen(js_name = visibleRowCount)]
    pub fn visible_row_count(&self) -> usize {
        self.grid.visible_row_count()
    }

    #[wasm_bindgen(js_name = dataForRow)]
    pub fn data_for_row(&self, physical: usize) -> Result<JsValue, JsValue> {
        match self.grid.data_for_row(physical) {
            Some(row) => to_js(row),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = dataForFilteredRow)]
    pub fn data_for_filtered_row(&self, active: usize) -> Result<JsValue, JsValue> {
        match self.grid.data_for_filtered_row(active) {
            Some(row) => to_js(row),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    // ========================================================================
    // Sort and filter
    // ========================================================================

    /// Sort by a column. `descending` left undefined toggles a repeated sort.
    /// Returns the sort stack.
    pub fn sort(
        &mut self,
        column: &str,
        descending: Option<bool>,
        add: bool,
    ) -> Result<JsValue, JsValue> {
        self.check_alive()?;
        let sorted = self.grid.sort(column, descending, add)?;
        to_js(&sorted)
    }

    #[wasm_bindgen(js_name = sortedColumns)]
    pub fn sorted_columns(&self) -> Result<JsValue, JsValue> {
        to_js(&self.grid.sorted_columns())
    }

    /// Filter by substring. Returns the number of rows kept.
    pub fn filter(
        &mut self,
        column: &str,
        text: &str,
        case_sensitive: bool,
    ) -> Result<usize, JsValue> {
        self.check_alive()?;
        self.grid.filter(column, text, case_sensitive)?;
        Ok(self.grid.visible_row_count())
    }

    #[wasm_bindgen(js_name = clearFilter)]
    pub fn clear_filter(&mut self) {
        self.grid.clear_filter();
    }

    // ========================================================================
    // Columns
    // ========================================================================

    /// Add a column before `before` (a name or an order), or at the end.
    #[wasm_bindgen(js_name = addColumn)]
    pub fn add_column(&mut self, spec: JsValue, before: JsValue) -> Result<(), JsValue> {
        self.check_alive()?;
        let spec: ColumnSpec = serde_wasm_bindgen::from_value(spec)?;
        let before = if before.is_undefined() || before.is_null() {
            None
        } else {
            Some(JsColumn::from_js(&before)?)
        };
        self.grid.add_column(&spec, before.as_ref().map(JsColumn::column_ref))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = removeColumn)]
    pub fn remove_column(&mut self, name: &str) -> Result<(), JsValue> {
        self.check_alive()?;
        self.grid.remove_column(name)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = moveColumn)]
    pub fn move_column(&mut self, src: JsValue, dest: JsValue) -> Result<bool, JsValue> {
        self.check_alive()?;
        let src = JsColumn::from_js(&src)?;
        let dest = JsColumn::from_js(&dest)?;
        Ok(self.grid.move_column(src.column_ref(), dest.column_ref())?)
    }

    #[wasm_bindgen(js_name = setColumnVisible)]
    pub fn set_column_visible(&mut self, name: &str, visible: bool) -> Result<bool, JsValue> {
        self.check_alive()?;
        Ok(self.grid.set_column_visible(name, visible)?)
    }

    #[wasm_bindgen(js_name = setColumnLabel)]
    pub fn set_column_label(&mut self, name: &str, label: Option<String>) -> Result<(), JsValue> {
        self.check_alive()?;
        self.grid.set_column_label(name, label.as_deref())?;
        Ok(())
    }

    /// Accepts `120`, `0.25`, `"25%"` or `"auto"`.
    #[wasm_bindgen(js_name = setColumnWidth)]
    pub fn set_column_width(&mut self, name: &str, width: JsValue) -> Result<(), JsValue> {
        self.check_alive()?;
        let width: WidthValue = serde_wasm_bindgen::from_value(width)?;
        self.grid.set_column_width(name, &width)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = columnsConfig)]
    pub fn columns_config(&self) -> Result<JsValue, JsValue> {
        to_js(&self.grid.columns_config())
    }

    // ========================================================================
    // Widths
    // ========================================================================

    /// Returns whether widths were recomputed.
    #[wasm_bindgen(js_name = tableWidthChanged)]
    pub fn table_width_changed(&mut self, available: f64, force: bool) -> bool {
        !self.destroyed && self.grid.table_width_changed(available, force)
    }

    #[wasm_bindgen(js_name = setScrollbarWidth)]
    pub fn set_scrollbar_width(&mut self, width: f64) {
        self.grid.set_scrollbar_width(width);
    }

    #[wasm_bindgen(js_name = setSortArrowWidth)]
    pub fn set_sort_arrow_width(&mut self, width: f64) {
        self.grid.set_sort_arrow_width(width);
    }

    #[wasm_bindgen(js_name = relativeWidthForPixels)]
    pub fn relative_width_for_pixels(&self, name: &str, pixels: f64) -> Result<f64, JsValue> {
        Ok(self.grid.relative_width_for_pixels(name, pixels)?)
    }

    #[wasm_bindgen(js_name = columnWidths)]
    pub fn column_widths(&self) -> Result<JsValue, JsValue> {
        to_js(self.grid.column_widths())
    }

    // ========================================================================
    // Viewport and window
    // ========================================================================

    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        !self.destroyed && self.grid.resize(width, height)
    }

    #[wasm_bindgen(js_name = scrollTo)]
    pub fn scroll_to(&mut self, y: f64) -> Result<JsValue, JsValue> {
        self.check_alive()?;
        to_js(&self.grid.scroll_to(y))
    }

    #[wasm_bindgen(js_name = updateWindow)]
    pub fn update_window(&mut self) -> Result<JsValue, JsValue> {
        self.check_alive()?;
        to_js(&self.grid.update_window())
    }

    #[wasm_bindgen(js_name = setRowHeights)]
    pub fn set_row_heights(&mut self, first: f64, middle: f64, last: f64) {
        self.grid.set_row_heights(RowHeights::new(first, middle, last));
    }

    #[wasm_bindgen(js_name = totalScrollHeight)]
    pub fn total_scroll_height(&self) -> f64 {
        self.grid.total_scroll_height()
    }

    #[wasm_bindgen(js_name = rowOffset)]
    pub fn row_offset(&self, active: usize) -> f64 {
        self.grid.row_offset(active)
    }

    /// Rows of the rendered window: `{ index, originIndex, row }`.
    #[wasm_bindgen(js_name = windowRows)]
    pub fn window_rows(&self) -> Result<JsValue, JsValue> {
        let first = self.grid.rendered_window().map_or(0, |w| w.first);
        let rows: Vec<WindowRow<'_>> = self
            .grid
            .window_rows()
            .into_iter()
            .enumerate()
            .map(|(offset, r)| WindowRow {
                index: first + offset,
                origin_index: r.origin_index,
                row: r.row,
            })
            .collect();
        to_js(&rows)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Run `callback` after `delay_ms`, once the container had a chance to
    /// be laid out. Re-arming replaces the pending run.
    #[wasm_bindgen(js_name = scheduleLayout)]
    pub fn schedule_layout(&self, callback: Function, delay_ms: i32) {
        if !self.destroyed {
            self.layout.schedule(callback, delay_ms);
        }
    }

    #[wasm_bindgen(js_name = layoutPending)]
    pub fn layout_pending(&self) -> bool {
        self.layout.is_pending()
    }

    /// Cancel pending work. Later calls that mutate the grid fail.
    pub fn destroy(&mut self) {
        self.layout.tear_down();
        self.grid.invalidate_window();
        self.destroyed = true;
        log::debug!("grid view destroyed");
    }
}

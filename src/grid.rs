//! Grid facade composing the column model, the width engine, the
//! sort/filter pipeline and the virtual row window.
//!
//! Every mutation fully applies (including any implicit re-sort or
//! re-filter) before returning, and invalidates the row window so the next
//! [`DataGrid::update_window`] starts from a clean slate.

use std::ops::Range;

use serde::Serialize;

use crate::columns::{Column, ColumnCollection, ColumnRef};
use crate::error::{GridError, Result};
use crate::layout::{
    compute_column_widths, CharWidthMeasurer, ColumnWidths, RowHeights, RowWindow, TextMeasurer,
    Viewport, VirtualWindow, WindowUpdate,
};
use crate::rows::{
    ActiveSequence, CellValue, ComparatorLookup, DefaultComparators, FilterSpec, FilteredRow,
    FilteredView, RowData, RowPipeline, SortKey,
};
use crate::types::{
    ColumnConfig, ColumnSpec, GridOptions, GridSettings, SortedColumn, WidthMode, WidthValue,
};

/// Where a refreshed row currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRefresh {
    /// Position in the active sequence, `None` if filtered out
    pub active_index: Option<usize>,
    /// The row is inside the rendered window and must be rebuilt
    pub rendered: bool,
}

/// A data grid over rows of type `R`
pub struct DataGrid<R> {
    settings: GridSettings,
    columns: ColumnCollection,
    pipeline: RowPipeline<R>,
    comparators: Box<dyn ComparatorLookup<R>>,
    measurer: Box<dyn TextMeasurer>,
    widths: ColumnWidths,
    last_detected_width: Option<f64>,
    scrollbar_width: f64,
    viewport: Viewport,
    row_heights: RowHeights,
    window: VirtualWindow,
}

impl<R: RowData + 'static> DataGrid<R> {
    /// Build a grid from options. Initial sort keys naming unknown columns
    /// are skipped.
    ///
    /// # Errors
    /// Fails on duplicate column names or unparseable widths.
    pub fn new(options: GridOptions) -> Result<Self> {
        let settings = options.settings.sanitized();
        let columns = ColumnCollection::from_specs(&options.columns, &settings)?;
        let mut grid = Self {
            settings,
            columns,
            pipeline: RowPipeline::new(),
            comparators: Box::new(DefaultComparators),
            measurer: Box::new(CharWidthMeasurer::default()),
            widths: ColumnWidths::default(),
            last_detected_width: None,
            scrollbar_width: 0.0,
            viewport: Viewport::new(),
            row_heights: RowHeights::default(),
            window: VirtualWindow::new(),
        };

        let mut keys = Vec::new();
        for spec in &options.sort_column {
            match grid.columns.get(spec.column()) {
                Some(column) => keys.push(
                    SortKey::new(column.name.clone(), spec.descending())
                        .with_compare_path(column.compare_path.clone()),
                ),
                None => log::warn!("ignoring sort on unknown column '{}'", spec.column()),
            }
        }
        grid.pipeline.set_sort_keys(keys);
        grid.apply_sort_arrows();
        Ok(grid)
    }

    /// Parse options from JSON and build the grid.
    ///
    /// # Errors
    /// Returns `GridError::Json` for malformed options, plus the errors of
    /// [`DataGrid::new`].
    pub fn from_json(options: &str) -> Result<Self> {
        Self::new(GridOptions::from_json(options)?)
    }

    /// Override comparators per column. Applies from the next sort.
    pub fn set_comparator_lookup(&mut self, lookup: Box<dyn ComparatorLookup<R>>) {
        self.comparators = lookup;
    }

    /// Replace the header text measurer and recompute widths.
    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.measurer = measurer;
        self.relayout();
    }

    // ========================================================================
    // Sorting and filtering
    // ========================================================================

    /// Sort by `column`.
    ///
    /// With `descending` unset, sorting again by the current last key
    /// toggles its direction; otherwise the default is ascending. With `add`
    /// the key is pushed on top of the existing stack, which is cleared
    /// first when it is full.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn`; nothing changes.
    pub fn sort(
        &mut self,
        column: &str,
        descending: Option<bool>,
        add: bool,
    ) -> Result<Vec<SortedColumn>> {
        let column = self.columns.require(column)?;
        let name = column.name.clone();
        let compare_path = column.compare_path.clone();

        let mut keys = self.pipeline.sort_keys().to_vec();
        let mut descending = descending;
        if let Some(last) = keys.last() {
            if last.column == name && descending.is_none() {
                descending = Some(!last.descending);
            }
        }

        if add {
            if let Some(position) = keys.iter().position(|k| k.column == name) {
                if position + 1 < keys.len() {
                    keys.clear();
                } else {
                    keys.pop();
                }
            }
            let limit = self.settings.sortable_columns;
            let visible = self.columns.visible_columns().len();
            if (limit > 0 && keys.len() >= limit) || keys.len() >= visible {
                keys.clear();
            }
        } else {
            keys.clear();
        }

        keys.push(SortKey::new(name, descending.unwrap_or(false)).with_compare_path(compare_path));
        log::debug!("sort stack: {:?}", keys.iter().map(|k| &k.column).collect::<Vec<_>>());
        self.pipeline.sort(keys, self.comparators.as_ref());
        self.apply_sort_arrows();
        self.invalidate_window();
        Ok(self.sorted_columns())
    }

    /// Re-apply the current sort stack. Returns `false` if there is none.
    pub fn resort(&mut self) -> bool {
        let sorted = self.pipeline.resort(self.comparators.as_ref());
        if sorted {
            self.invalidate_window();
        }
        sorted
    }

    pub fn sorted_columns(&self) -> Vec<SortedColumn> {
        self.pipeline
            .sort_keys()
            .iter()
            .map(|k| SortedColumn {
                column: k.column.clone(),
                descending: k.descending,
            })
            .collect()
    }

    /// Filter rows whose `column` value contains `text`. Empty text clears
    /// the filter.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn`; nothing changes.
    pub fn filter(
        &mut self,
        column: &str,
        text: &str,
        case_sensitive: bool,
    ) -> Result<Option<&FilteredView>> {
        self.columns.require(column)?;
        let spec = FilterSpec::new(column, text, case_sensitive);
        let matched = self.pipeline.filter(spec).map(FilteredView::len);
        match matched {
            Some(count) => log::debug!("filter '{text}' on '{column}' kept {count} row(s)"),
            None => log::debug!("filter on '{column}' cleared"),
        }
        self.after_row_change();
        Ok(self.pipeline.filtered_view())
    }

    pub fn clear_filter(&mut self) {
        self.pipeline.clear_filter();
        self.after_row_change();
    }

    /// Rebuild the filtered view from the current store.
    pub fn refilter(&mut self) {
        self.pipeline.refilter();
        self.after_row_change();
    }

    pub fn filter_spec(&self) -> Option<&FilterSpec> {
        self.pipeline.filter_spec()
    }

    pub fn active_sequence(&self) -> ActiveSequence {
        self.pipeline.state()
    }

    // ========================================================================
    // Rows
    // ========================================================================

    /// Append rows, re-sorting when `resort` is set and a sort is active.
    /// Returns how many rows were added.
    pub fn add_rows(&mut self, rows: Vec<R>, resort: bool) -> usize {
        let added = self.pipeline.add(rows, None).len();
        if resort {
            self.pipeline.resort(self.comparators.as_ref());
        }
        log::debug!("added {added} row(s), {} total", self.row_count());
        self.after_row_change();
        added
    }

    /// Insert rows at a physical position without re-sorting.
    pub fn insert_rows(&mut self, rows: Vec<R>, at: usize) -> Range<usize> {
        let range = self.pipeline.add(rows, Some(at));
        self.after_row_change();
        range
    }

    /// Replace every row.
    pub fn set_rows(&mut self, rows: Vec<R>, resort: bool) {
        self.pipeline.reset(rows);
        if resort {
            self.pipeline.resort(self.comparators.as_ref());
        }
        log::debug!("reset to {} row(s)", self.row_count());
        self.after_row_change();
    }

    /// Remove the row at a physical index.
    ///
    /// # Errors
    /// Returns `GridError::RowOutOfRange`; nothing changes.
    pub fn remove_row(&mut self, physical: usize) -> Result<R> {
        let row = self.pipeline.remove_at(physical)?;
        self.after_row_change();
        Ok(row)
    }

    /// Report where a physical row is displayed so the renderer can rebuild it.
    ///
    /// # Errors
    /// Returns `GridError::RowOutOfRange`.
    pub fn refresh_row(&self, physical: usize) -> Result<RowRefresh> {
        let len = self.row_count();
        if physical >= len {
            return Err(GridError::RowOutOfRange {
                index: physical,
                len,
            });
        }
        let active_index = self.pipeline.active_index_of(physical);
        let rendered = match (active_index, self.window.rendered()) {
            (Some(active), Some(window)) => window.contains(active),
            _ => false,
        };
        Ok(RowRefresh {
            active_index,
            rendered,
        })
    }

    // ========================================================================
    // Columns
    // ========================================================================

    /// Add a column before another (by name or order), or at the end.
    ///
    /// # Errors
    /// Fails on a duplicate name or an invalid width.
    pub fn add_column(&mut self, spec: &ColumnSpec, before: Option<ColumnRef<'_>>) -> Result<()> {
        let column = Column::from_spec(spec, &self.settings)?;
        self.columns.insert(column, before)?;
        log::debug!("added column '{}'", spec.name);
        self.after_column_change();
        Ok(())
    }

    /// Remove a column. It is also dropped from the sort stack.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn`.
    pub fn remove_column(&mut self, name: &str) -> Result<Column> {
        let column = self.columns.remove(name)?;
        let keys = self.pipeline.sort_keys();
        if keys.iter().any(|k| k.column == name) {
            let kept = keys.iter().filter(|k| k.column != name).cloned().collect();
            self.pipeline.set_sort_keys(kept);
        }
        self.after_column_change();
        Ok(column)
    }

    /// Move a column into the slot of another. Positions are visible indices.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn` if either side does not resolve.
    pub fn move_column(&mut self, src: ColumnRef<'_>, dest: ColumnRef<'_>) -> Result<bool> {
        let moved = self.columns.move_column(src, dest)?;
        if moved {
            self.after_column_change();
        }
        Ok(moved)
    }

    /// # Errors
    /// Returns `GridError::UnknownColumn`.
    pub fn set_column_visible(&mut self, name: &str, visible: bool) -> Result<bool> {
        let changed = self.columns.set_visible(name, visible)?;
        if changed {
            self.after_column_change();
        }
        Ok(changed)
    }

    pub fn is_column_visible(&self, name: &str) -> bool {
        self.columns.get(name).is_some_and(|c| c.visible)
    }

    /// Set a header label; `None` restores the column name.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn`.
    pub fn set_column_label(&mut self, name: &str, label: Option<&str>) -> Result<()> {
        self.columns.set_label(name, label.unwrap_or(name))?;
        self.relayout();
        Ok(())
    }

    /// Change a column's width spec. Widths are recomputed when the
    /// serialized width actually changed.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn` or `GridError::InvalidWidth`.
    pub fn set_column_width(&mut self, name: &str, width: &WidthValue) -> Result<()> {
        let previous = self.columns.set_width(name, width, &self.settings)?;
        let current = self.columns.require(name)?.width;
        if previous.serialize() != current.serialize() {
            log::debug!("column '{name}' width {previous:?} -> {current:?}");
            self.apply_sort_arrows();
        }
        Ok(())
    }

    /// Serialized width spec of a column.
    pub fn column_width(&self, name: &str) -> Option<WidthValue> {
        self.columns.get(name).map(|c| c.width.serialize())
    }

    pub fn column_config(&self, name: &str) -> Option<ColumnConfig> {
        self.columns.column_config(name)
    }

    pub fn columns_config(&self) -> std::collections::BTreeMap<String, ColumnConfig> {
        self.columns.columns_config()
    }

    /// Set the global minimum column width (negative values clamp to 0).
    pub fn set_min_column_width(&mut self, min_width: f64) {
        let min_width = if min_width.is_nan() { 0.0 } else { min_width.max(0.0) };
        if (self.settings.min_column_width - min_width).abs() > f64::EPSILON {
            self.settings.min_column_width = min_width;
            self.relayout();
        }
    }

    pub fn set_sortable_columns(&mut self, count: usize) {
        self.settings.sortable_columns = count;
    }

    /// Width of the sort indicator as measured by the renderer.
    pub fn set_sort_arrow_width(&mut self, width: f64) {
        self.settings.sort_arrow_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        self.apply_sort_arrows();
    }

    // ========================================================================
    // Widths
    // ========================================================================

    /// Recompute column widths for `available` pixels. Skipped when the
    /// width matches the last one seen, unless `force` is set.
    ///
    /// Returns whether widths were recomputed.
    pub fn table_width_changed(&mut self, available: f64, force: bool) -> bool {
        let unchanged = self
            .last_detected_width
            .is_some_and(|last| (last - available).abs() < f64::EPSILON);
        if unchanged && !force {
            log::trace!("table width {available}px unchanged, keeping widths");
            return false;
        }
        self.last_detected_width = Some(available);
        let widths = {
            let visible = self.columns.visible_columns();
            compute_column_widths(
                &visible,
                available,
                &self.settings,
                self.measurer.as_ref(),
                self.scrollbar_width,
            )
        };
        log::debug!(
            "column widths for {available}px: {:?}",
            widths
                .columns
                .iter()
                .map(|c| (&c.name, c.actual_width))
                .collect::<Vec<_>>()
        );
        self.apply_widths(widths);
        true
    }

    /// Width of the vertical scrollbar, subtracted from the last column.
    pub fn set_scrollbar_width(&mut self, width: f64) {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        if (self.scrollbar_width - width).abs() > f64::EPSILON {
            self.scrollbar_width = width;
            self.relayout();
        }
    }

    /// Convert a pixel width (e.g. the end of a resize drag) into a fraction
    /// of the space left after the non-relative columns.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn`.
    pub fn relative_width_for_pixels(&self, name: &str, pixels: f64) -> Result<f64> {
        self.columns.require(name)?;
        let available = self.last_detected_width.unwrap_or(self.viewport.width);
        let fixed: f64 = self
            .columns
            .visible_columns()
            .into_iter()
            .filter(|c| {
                let mode = self.widths.get(&c.name).map_or(c.width_mode(), |w| w.mode);
                mode != WidthMode::Relative
            })
            .map(|c| c.actual_width)
            .sum();
        Ok(pixels / (available - fixed).max(1.0))
    }

    pub fn column_widths(&self) -> &ColumnWidths {
        &self.widths
    }

    /// Sum of effective widths, the minimum width of the body.
    pub fn content_width(&self) -> f64 {
        self.widths.effective_total()
    }

    fn relayout(&mut self) {
        let available = self.last_detected_width.unwrap_or(self.viewport.width);
        self.table_width_changed(available, true);
    }

    fn apply_widths(&mut self, widths: ColumnWidths) {
        let last = widths.columns.last().map(|c| c.name.clone());
        for column in self.columns.iter_mut() {
            column.actual_width_considering_scrollbar = None;
            if let Some(computed) = widths.get(&column.name) {
                column.actual_width = computed.actual_width;
                if last.as_deref() == Some(column.name.as_str()) {
                    column.actual_width_considering_scrollbar = Some(computed.effective_width);
                }
            }
        }
        self.widths = widths;
    }

    /// Reserve room for the sort indicator on sorted fixed-width columns,
    /// then recompute widths.
    fn apply_sort_arrows(&mut self) {
        let sorted: Vec<String> = self
            .pipeline
            .sort_keys()
            .iter()
            .map(|k| k.column.clone())
            .collect();
        let adjust = self.settings.adjust_column_width_for_sort_arrow;
        let arrow = self.settings.sort_arrow_width;
        for column in self.columns.iter_mut() {
            let reserve = adjust
                && column.width_mode() != WidthMode::Relative
                && sorted.contains(&column.name);
            column.arrow_reserved_width = if reserve { arrow } else { 0.0 };
        }
        self.relayout();
    }

    // ========================================================================
    // Viewport and window
    // ========================================================================

    /// Resize the viewport. Returns whether column widths were recomputed.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.viewport.resize(width, height);
        self.viewport.clamp_scroll(self.total_scroll_height());
        self.table_width_changed(width, false)
    }

    pub fn scroll_to(&mut self, y: f64) -> WindowUpdate {
        let total = self.total_scroll_height();
        self.viewport.set_scroll(y, total);
        self.update_window()
    }

    pub fn scroll_by(&mut self, delta_y: f64) -> WindowUpdate {
        let total = self.total_scroll_height();
        self.viewport.scroll_by(delta_y, total);
        self.update_window()
    }

    /// Measured row heights from the renderer. Drops the rendered window.
    pub fn set_row_heights(&mut self, heights: RowHeights) {
        self.row_heights = heights;
        self.viewport.clamp_scroll(self.total_scroll_height());
        self.invalidate_window();
    }

    /// Bring the rendered window in line with the current scroll state.
    pub fn update_window(&mut self) -> WindowUpdate {
        let active_len = self.pipeline.active_len();
        if self.settings.virtual_table {
            let params = self.viewport.window_params(
                self.row_heights,
                self.settings.rows_buffer_size,
                active_len,
            );
            self.window.update(&params)
        } else {
            self.window.update_full(active_len)
        }
    }

    /// Force the next window update to rebuild every row.
    pub fn invalidate_window(&mut self) {
        self.window.invalidate();
    }

    pub fn rendered_window(&self) -> Option<RowWindow> {
        self.window.rendered()
    }

    /// Rows inside the rendered window, paired with their physical index.
    pub fn window_rows(&self) -> Vec<FilteredRow<'_, R>> {
        match self.window.rendered() {
            Some(window) => self
                .pipeline
                .active_rows(window.first..window.last + 1)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Height of the scrollable body for the active sequence.
    pub fn total_scroll_height(&self) -> f64 {
        self.row_heights.total_height(self.pipeline.active_len())
    }

    pub fn row_offset(&self, active: usize) -> f64 {
        self.row_heights.row_offset(active)
    }

    fn after_row_change(&mut self) {
        self.viewport.clamp_scroll(self.total_scroll_height());
        self.invalidate_window();
    }

    fn after_column_change(&mut self) {
        self.invalidate_window();
        self.apply_sort_arrows();
    }
}

impl<R> DataGrid<R> {
    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn columns(&self) -> &ColumnCollection {
        &self.columns
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn row_heights(&self) -> RowHeights {
        self.row_heights
    }

    /// Physical store length.
    pub fn row_count(&self) -> usize {
        self.pipeline.store().len()
    }

    /// Length of the active sequence.
    pub fn visible_row_count(&self) -> usize {
        self.pipeline.active_len()
    }

    pub fn data_for_row(&self, physical: usize) -> Option<&R> {
        self.pipeline.store().get(physical)
    }

    pub fn data_for_filtered_row(&self, active: usize) -> Option<&R> {
        self.pipeline.active_row(active)
    }

    pub fn physical_index(&self, active: usize) -> Option<usize> {
        self.pipeline.physical_index(active)
    }

    pub fn active_index_of(&self, physical: usize) -> Option<usize> {
        self.pipeline.active_index_of(physical)
    }

    pub fn rows(&self) -> &[R] {
        self.pipeline.store().as_slice()
    }
}

impl<R: RowData> DataGrid<R> {
    /// Value of `column` in a physical row, following its data path.
    ///
    /// # Errors
    /// Returns `GridError::RowOutOfRange` or `GridError::UnknownColumn`.
    pub fn cell_value(&self, physical: usize, column: &str) -> Result<CellValue<'_>> {
        let column = self.columns.require(column)?;
        let row = self
            .pipeline
            .store()
            .get(physical)
            .ok_or(GridError::RowOutOfRange {
                index: physical,
                len: self.row_count(),
            })?;
        Ok(row.value_at(&column.data_path))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn grid() -> DataGrid<Value> {
        let mut grid = DataGrid::from_json(
            r#"{
                "columns": [
                    {"name": "id", "width": 60},
                    {"name": "name", "width": "100%"}
                ],
                "sortArrowWidth": 10
            }"#,
        )
        .unwrap();
        grid.set_rows(
            vec![
                json!({"id": 2, "name": "bob"}),
                json!({"id": 1, "name": "alice"}),
                json!({"id": 3, "name": "carol"}),
            ],
            false,
        );
        grid.table_width_changed(400.0, true);
        grid
    }

    #[test]
    fn test_sort_toggles_direction() {
        let mut g = grid();
        let sorted = g.sort("id", None, false).unwrap();
        assert!(!sorted[0].descending);
        let sorted = g.sort("id", None, false).unwrap();
        assert!(sorted[0].descending);
        assert_eq!(g.data_for_row(0).unwrap()["id"], 3);
    }

    #[test]
    fn test_sort_unknown_column_is_noop() {
        let mut g = grid();
        assert!(matches!(
            g.sort("missing", None, false),
            Err(GridError::UnknownColumn(_))
        ));
        assert!(g.sorted_columns().is_empty());
        assert_eq!(g.data_for_row(0).unwrap()["id"], 2);
    }

    #[test]
    fn test_sort_arrow_reserves_width_on_fixed_columns() {
        let mut g = grid();
        assert_eq!(g.columns().get("id").unwrap().actual_width, 60.0);
        g.sort("id", None, false).unwrap();
        assert_eq!(g.columns().get("id").unwrap().actual_width, 70.0);
        assert_eq!(g.columns().get("name").unwrap().actual_width, 330.0);
        g.sort("name", None, false).unwrap();
        assert_eq!(g.columns().get("id").unwrap().actual_width, 60.0);
        assert_eq!(g.columns().get("name").unwrap().arrow_reserved_width, 0.0);
    }

    #[test]
    fn test_width_cache_short_circuit() {
        let mut g = grid();
        assert!(!g.table_width_changed(400.0, false));
        assert!(g.table_width_changed(400.0, true));
        assert!(g.table_width_changed(500.0, false));
        assert_eq!(g.content_width(), 500.0);
    }

    #[test]
    fn test_refresh_row_reports_filtered_out() {
        let mut g = grid();
        g.filter("name", "o", false).unwrap();
        let refresh = g.refresh_row(1).unwrap();
        assert_eq!(refresh.active_index, None);
        assert!(!refresh.rendered);
        assert!(g.refresh_row(9).is_err());
    }

    #[test]
    fn test_relative_width_for_pixels() {
        let g = grid();
        let fraction = g.relative_width_for_pixels("name", 170.0).unwrap();
        assert_eq!(fraction, 0.5);
    }
}

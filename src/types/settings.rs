use serde::{Deserialize, Serialize};

/// Extra pixels added to a measured auto-column label
pub const DEFAULT_AUTO_COLUMN_PADDING: f64 = 20.0;

/// Default minimum column width in pixels
pub const DEFAULT_MIN_COLUMN_WIDTH: f64 = 35.0;

/// Default number of buffer rows kept beyond each viewport edge
pub const DEFAULT_ROWS_BUFFER_SIZE: usize = 3;

/// Global grid settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GridSettings {
    /// Materialize only the rows around the viewport
    pub virtual_table: bool,
    /// Extra rows materialized beyond each visible edge
    pub rows_buffer_size: usize,
    /// Minimum width for every column that does not set `ignoreMin`
    pub min_column_width: f64,
    /// Maximum number of stacked sort keys (0 = unlimited)
    pub sortable_columns: usize,
    /// Reserve room for the sort arrow on sorted fixed-width columns
    pub adjust_column_width_for_sort_arrow: bool,
    /// Turn auto columns into relative ones sized by their measured share
    pub convert_column_widths_to_relative: bool,
    /// Scale relative fractions up to fill the remaining width
    pub relative_width_grows_to_fill_width: bool,
    /// Scale relative fractions down to fit the remaining width
    pub relative_width_shrinks_to_fill_width: bool,
    /// Padding added to measured auto-column labels
    pub auto_column_padding: f64,
    /// Width of the sort indicator as measured by the renderer
    pub sort_arrow_width: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            virtual_table: true,
            rows_buffer_size: DEFAULT_ROWS_BUFFER_SIZE,
            min_column_width: DEFAULT_MIN_COLUMN_WIDTH,
            sortable_columns: 1,
            adjust_column_width_for_sort_arrow: true,
            convert_column_widths_to_relative: false,
            relative_width_grows_to_fill_width: true,
            relative_width_shrinks_to_fill_width: false,
            auto_column_padding: DEFAULT_AUTO_COLUMN_PADDING,
            sort_arrow_width: 0.0,
        }
    }
}

impl GridSettings {
    /// Normalize values that arrived out of range from configuration.
    pub fn sanitized(mut self) -> Self {
        if self.min_column_width.is_nan() || self.min_column_width < 0.0 {
            self.min_column_width = 0.0;
        }
        if self.sort_arrow_width.is_nan() || self.sort_arrow_width < 0.0 {
            self.sort_arrow_width = 0.0;
        }
        if self.auto_column_padding.is_nan() {
            self.auto_column_padding = DEFAULT_AUTO_COLUMN_PADDING;
        }
        self
    }

    /// Minimum width that applies to a column.
    pub fn min_width_for(&self, ignore_min: bool) -> f64 {
        if ignore_min {
            0.0
        } else {
            self.min_column_width
        }
    }
}

use crate::error::Result;
use crate::rows::split_path;
use crate::types::{ColumnConfig, ColumnSpec, ColumnWidth, GridSettings, WidthMode};

/// A column definition plus the layout state the width engine writes back
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Unique key
    pub name: String,
    /// Header text, also what auto-width columns are measured from
    pub label: String,
    pub width: ColumnWidth,
    /// Display position among all columns (dense after normalization)
    pub order: usize,
    pub visible: bool,
    pub ignore_min: bool,
    pub sortable: bool,
    /// Steps used to read the cell value
    pub data_path: Vec<String>,
    /// Steps used by the default sort comparator
    pub compare_path: Vec<String>,
    /// Pixels reserved for the sort indicator while this column is sorted
    pub arrow_reserved_width: f64,
    /// Last computed pixel width
    pub actual_width: f64,
    /// Last computed width minus the vertical scrollbar (last visible column only)
    pub actual_width_considering_scrollbar: Option<f64>,
}

impl Column {
    /// Build a column from its spec. `order` is assigned by the collection.
    ///
    /// # Errors
    /// Returns `GridError::InvalidWidth` if the width string cannot be parsed.
    pub fn from_spec(spec: &ColumnSpec, settings: &GridSettings) -> Result<Self> {
        let width = match &spec.width {
            Some(value) => {
                ColumnWidth::parse(value, settings.min_width_for(spec.ignore_min))?
            }
            None => ColumnWidth::Auto,
        };
        let data_path = split_path(spec.data_path.as_deref().unwrap_or(&spec.name));
        let compare_path = match &spec.compare_path {
            Some(path) => split_path(path),
            None => data_path.clone(),
        };
        Ok(Self {
            name: spec.name.clone(),
            label: spec.label.clone().unwrap_or_else(|| spec.name.clone()),
            width,
            order: spec.order.unwrap_or(0),
            visible: spec.visible,
            ignore_min: spec.ignore_min,
            sortable: spec.sortable,
            data_path,
            compare_path,
            arrow_reserved_width: 0.0,
            actual_width: 0.0,
            actual_width_considering_scrollbar: None,
        })
    }

    pub fn width_mode(&self) -> WidthMode {
        self.width.mode()
    }

    /// Width the renderer should use for this column's cells.
    pub fn effective_width(&self) -> f64 {
        self.actual_width_considering_scrollbar
            .unwrap_or(self.actual_width)
    }

    pub fn config(&self) -> ColumnConfig {
        ColumnConfig {
            order: self.order,
            width: self.width.serialize(),
            visible: self.visible,
            label: self.label.clone(),
        }
    }
}

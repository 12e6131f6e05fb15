use serde::{Deserialize, Serialize};

use super::{ColumnSpec, GridSettings, SortColumnSpec};
use crate::error::Result;

/// Top-level grid configuration
///
/// ```json
/// {
///   "columns": [{ "name": "id", "width": 60 }, { "name": "title", "width": "100%" }],
///   "sortColumn": ["id", { "column": "title", "descending": true }],
///   "minColumnWidth": 40,
///   "rowsBufferSize": 5
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub sort_column: Vec<SortColumnSpec>,
    #[serde(flatten)]
    pub settings: GridSettings,
}

impl GridOptions {
    /// Parse options from a JSON document.
    ///
    /// # Errors
    /// Returns `GridError::Json` if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut options: Self = serde_json::from_str(json)?;
        options.settings = options.settings.sanitized();
        Ok(options)
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

    #[test]
    fn test_options_flatten_settings() {
        let options = GridOptions::from_json(
            r#"{
                "columns": [{"name": "a"}, {"name": "b", "width": 0.5}],
                "sortColumn": ["a", {"column": "b", "descending": true}],
                "minColumnWidth": -4,
                "rowsBufferSize": 7
            }"#,
        )
        .unwrap();
        assert_eq!(options.columns.len(), 2);
        assert_eq!(options.settings.rows_buffer_size, 7);
        assert_eq!(options.settings.min_column_width, 0.0);
        assert!(options.settings.virtual_table);
        assert_eq!(options.sort_column[0].column(), "a");
        assert!(!options.sort_column[0].descending());
        assert!(options.sort_column[1].descending());
    }

    #[test]
    fn test_options_empty_document() {
        let options = GridOptions::from_json("{}").unwrap();
        assert!(options.columns.is_empty());
        assert_eq!(options.settings, GridSettings::default());
    }
}

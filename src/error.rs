//! Structured error types for vgrid.
//!
//! Every fallible grid operation reports a bad reference through `GridError`
//! and leaves the grid state untouched.

/// All errors that can occur in grid configuration and mutation.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Operation addressed a column name that does not exist.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A column with this name is already registered.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// Row index outside the store (or the active sequence).
    #[error("Row index {index} out of range (len {len})")]
    RowOutOfRange { index: usize, len: usize },

    /// Width specification that could not be understood.
    #[error("Invalid column width: {0}")]
    InvalidWidth(String),

    /// JSON configuration or row data error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_bad_reference() {
        assert_eq!(
            GridError::UnknownColumn("price".into()).to_string(),
            "Unknown column: price"
        );
        assert_eq!(
            GridError::RowOutOfRange { index: 7, len: 3 }.to_string(),
            "Row index 7 out of range (len 3)"
        );
    }

    #[test]
    fn test_json_errors_convert_with_question_mark() {
        fn parse(text: &str) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(text)?)
        }
        assert!(matches!(parse("{"), Err(GridError::Json(_))));
        assert!(parse("{}").is_ok());
    }
}

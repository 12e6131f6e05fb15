use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// How a column's width is interpreted by the width engine
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum WidthMode {
    /// Sized from the measured header label
    #[default]
    Auto,
    /// Fixed pixel width
    Absolute,
    /// Fraction of the space left after fixed columns
    Relative,
}

/// Raw width value as it appears in configuration: `120`, `0.25`, `"25%"`, `"auto"`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum WidthValue {
    Number(f64),
    Text(String),
}

impl From<f64> for WidthValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for WidthValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Parsed column width specification
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColumnWidth {
    #[default]
    Auto,
    /// Pixels, already clamped to the minimum width at parse time
    Absolute(f64),
    /// Fraction in `(0, 1]` for well-formed input; may exceed 1 for percentages over 100
    Relative(f64),
}

impl ColumnWidth {
    /// Classify a bare numeric magnitude.
    ///
    /// - `<= 0` (or NaN) → auto
    /// - `0 < w < 1` → relative fraction
    /// - otherwise → absolute pixels, raised to `min_width`
    pub fn from_magnitude(width: f64, min_width: f64) -> Self {
        if width.is_nan() || width <= 0.0 {
            Self::Auto
        } else if width < 1.0 {
            Self::Relative(width)
        } else {
            Self::Absolute(width.max(min_width))
        }
    }

    /// Parse a configuration value.
    ///
    /// Strings accept `"auto"`, `"25%"`, `"120"`, `"120px"` and `"0.25"`.
    ///
    /// # Errors
    /// Returns `GridError::InvalidWidth` for strings that are not numbers,
    /// percentages or `"auto"`.
    pub fn parse(value: &WidthValue, min_width: f64) -> Result<Self> {
        match value {
            WidthValue::Number(n) => Ok(Self::from_magnitude(*n, min_width)),
            WidthValue::Text(text) => Self::parse_str(text, min_width),
        }
    }

    /// Parse a textual width. See [`ColumnWidth::parse`].
    ///
    /// # Errors
    /// Returns `GridError::InvalidWidth` when the text is not understood.
    pub fn parse_str(text: &str, min_width: f64) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        if let Some(percent) = trimmed.strip_suffix('%') {
            let value: f64 = percent
                .trim()
                .parse()
                .map_err(|_| GridError::InvalidWidth(text.to_string()))?;
            return Ok(if value > 0.0 {
                Self::Relative(value / 100.0)
            } else {
                Self::Auto
            });
        }
        let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
        let value: f64 = number
            .parse()
            .map_err(|_| GridError::InvalidWidth(text.to_string()))?;
        Ok(Self::from_magnitude(value, min_width))
    }

    pub fn mode(&self) -> WidthMode {
        match self {
            Self::Auto => WidthMode::Auto,
            Self::Absolute(_) => WidthMode::Absolute,
            Self::Relative(_) => WidthMode::Relative,
        }
    }

    /// Serialized form: `"auto"`, `"<percent>%"` or the pixel number
    pub fn serialize(&self) -> WidthValue {
        match self {
            Self::Auto => WidthValue::Text("auto".to_string()),
            Self::Absolute(px) => WidthValue::Number(*px),
            Self::Relative(fraction) => WidthValue::Text(format!("{}%", fraction * 100.0)),
        }
    }
}

/// Column definition as supplied by the caller
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Unique column key
    pub name: String,
    /// Header text (defaults to `name`)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    /// Width specification (defaults to auto)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub width: Option<WidthValue>,
    /// Explicit display order
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub order: Option<usize>,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Exempt this column from the global minimum width
    #[serde(default)]
    pub ignore_min: bool,
    /// Whether header clicks may sort this column. A renderer hint:
    /// `DataGrid::sort` accepts any column.
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// Dotted property path used to read the cell value (defaults to `name`)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data_path: Option<String>,
    /// Dotted property path used when sorting (defaults to `data_path`)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub compare_path: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ColumnSpec {
    /// Minimal spec with an auto width.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            width: None,
            order: None,
            visible: true,
            ignore_min: false,
            sortable: true,
            data_path: None,
            compare_path: None,
        }
    }

    pub fn with_width(mut self, width: impl Into<WidthValue>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn ignoring_min(mut self) -> Self {
        self.ignore_min = true;
        self
    }

    pub fn with_compare_path(mut self, path: impl Into<String>) -> Self {
        self.compare_path = Some(path.into());
        self
    }

    pub fn with_data_path(mut self, path: impl Into<String>) -> Self {
        self.data_path = Some(path.into());
        self
    }
}

/// Snapshot of a column's user-facing configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub order: usize,
    pub width: WidthValue,
    pub visible: bool,
    pub label: String,
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
    fn test_parse_percentage() {
        let width = ColumnWidth::parse_str("25%", 35.0).unwrap();
        assert_eq!(width, ColumnWidth::Relative(0.25));
    }

    #[test]
    fn test_parse_decimal_is_relative() {
        let width = ColumnWidth::parse(&WidthValue::Number(0.4), 35.0).unwrap();
        assert_eq!(width, ColumnWidth::Relative(0.4));
    }

    #[test]
    fn test_parse_absolute_clamps_to_min() {
        assert_eq!(
            ColumnWidth::parse_str("20px", 35.0).unwrap(),
            ColumnWidth::Absolute(35.0)
        );
        assert_eq!(
            ColumnWidth::parse(&WidthValue::Number(120.0), 35.0).unwrap(),
            ColumnWidth::Absolute(120.0)
        );
    }

    #[test]
    fn test_parse_zero_and_auto() {
        assert_eq!(
            ColumnWidth::parse(&WidthValue::Number(0.0), 35.0).unwrap(),
            ColumnWidth::Auto
        );
        assert_eq!(ColumnWidth::parse_str("AUTO", 35.0).unwrap(), ColumnWidth::Auto);
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(matches!(
            ColumnWidth::parse_str("wide", 35.0),
            Err(GridError::InvalidWidth(_))
        ));
    }

    #[test]
    fn test_serialize_forms() {
        assert_eq!(ColumnWidth::Auto.serialize(), WidthValue::from("auto"));
        assert_eq!(ColumnWidth::Relative(0.5).serialize(), WidthValue::from("50%"));
        assert_eq!(
            ColumnWidth::Absolute(80.0).serialize(),
            WidthValue::Number(80.0)
        );
    }

    #[test]
    fn test_column_spec_defaults_from_json() {
        let spec: ColumnSpec = serde_json::from_str(r#"{"name":"id","width":"10%"}"#).unwrap();
        assert!(spec.visible);
        assert!(spec.sortable);
        assert!(!spec.ignore_min);
        assert_eq!(spec.width, Some(WidthValue::from("10%")));
    }

    #[test]
    fn test_column_spec_ignores_gesture_flags() {
        let spec: ColumnSpec = serde_json::from_str(
            r#"{"name":"id","sortable":false,"resizable":false,"movable":false}"#,
        )
        .unwrap();
        assert!(!spec.sortable);
        let json = serde_json::to_value(&spec).unwrap();
        assert!(json.get("resizable").is_none());
        assert!(json.get("movable").is_none());
    }
}

//! Read access to caller-owned row records.
//!
//! The grid never mutates rows. It only needs to walk a property path to a
//! leaf value, compare two leaves, and stringify a leaf for filtering.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::{Map, Value};

/// A leaf value reached by walking a property path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    /// Path did not resolve, or resolved to `null`
    Missing,
    Bool(bool),
    Number(f64),
    Text(&'a str),
    /// Arrays and objects
    Json(&'a Value),
}

impl<'a> CellValue<'a> {
    fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
            Self::Json(_) => 4,
        }
    }

    /// Three-way comparison used by the default sort comparator.
    ///
    /// Values of different kinds order by kind (missing < bool < number <
    /// text < composite) so the result is a total order.
    pub fn compare(&self, other: &CellValue<'_>) -> Ordering {
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// String form used for substring filtering. `None` for missing values.
    pub fn to_text(&self) -> Option<Cow<'a, str>> {
        match *self {
            Self::Missing => None,
            Self::Bool(b) => Some(Cow::Borrowed(if b { "true" } else { "false" })),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Text(s) => Some(Cow::Borrowed(s)),
            Self::Json(v) => Some(Cow::Owned(v.to_string())),
        }
    }

    fn from_json(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Self::Missing, Self::Number),
            Value::String(s) => Self::Text(s),
            Value::Array(_) | Value::Object(_) => Self::Json(value),
        }
    }
}

/// Row record the grid can read cells from
pub trait RowData {
    /// Walk `path` from the row root. An empty path yields `Missing`.
    fn value_at(&self, path: &[String]) -> CellValue<'_>;

    /// Direct single-step property access.
    fn field(&self, name: &str) -> CellValue<'_> {
        self.value_at(std::slice::from_ref(&name.to_string()))
    }
}

fn walk_json<'a>(mut current: &'a Value, path: &[String]) -> CellValue<'a> {
    for step in path {
        let next = match current {
            Value::Object(map) => map.get(step),
            Value::Array(items) => step.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return CellValue::Missing,
        }
    }
    CellValue::from_json(current)
}

impl RowData for Value {
    fn value_at(&self, path: &[String]) -> CellValue<'_> {
        if path.is_empty() {
            return CellValue::Missing;
        }
        walk_json(self, path)
    }

    fn field(&self, name: &str) -> CellValue<'_> {
        self.get(name).map_or(CellValue::Missing, CellValue::from_json)
    }
}

impl RowData for Map<String, Value> {
    fn value_at(&self, path: &[String]) -> CellValue<'_> {
        let Some((head, rest)) = path.split_first() else {
            return CellValue::Missing;
        };
        self.get(head)
            .map_or(CellValue::Missing, |value| walk_json(value, rest))
    }

    fn field(&self, name: &str) -> CellValue<'_> {
        self.get(name).map_or(CellValue::Missing, CellValue::from_json)
    }
}

impl RowData for HashMap<String, String> {
    fn value_at(&self, path: &[String]) -> CellValue<'_> {
        match path {
            [name] => self.field(name),
            _ => CellValue::Missing,
        }
    }

    fn field(&self, name: &str) -> CellValue<'_> {
        self.get(name)
            .map_or(CellValue::Missing, |s| CellValue::Text(s.as_str()))
    }
}

/// Split a dotted property path (`"owner.name"`) into steps.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
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
    use serde_json::json;

    #[test]
    fn test_walk_nested_path() {
        let row = json!({"owner": {"name": "ada", "tags": ["x", "y"]}});
        assert_eq!(
            row.value_at(&split_path("owner.name")),
            CellValue::Text("ada")
        );
        assert_eq!(
            row.value_at(&split_path("owner.tags.1")),
            CellValue::Text("y")
        );
        assert_eq!(row.value_at(&split_path("owner.age")), CellValue::Missing);
    }

    #[test]
    fn test_mixed_kinds_order_by_kind() {
        assert_eq!(
            CellValue::Missing.compare(&CellValue::Number(-5.0)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Text("a").compare(&CellValue::Number(100.0)),
            Ordering::Greater
        );
        assert_eq!(
            CellValue::Number(2.0).compare(&CellValue::Number(10.0)),
            Ordering::Less
        );
    }

    #[test]
    fn test_compare_rows_with_unrelated_lifetimes() {
        let outer = json!({"name": "bea"});
        let left = outer.field("name");
        let ordering = {
            let inner = json!({"name": "al"});
            let right = inner.field("name");
            (left.compare(&right), right.compare(&left))
        };
        assert_eq!(ordering, (Ordering::Greater, Ordering::Less));
        assert_eq!(left.compare(&CellValue::Text("bea")), Ordering::Equal);
    }

    #[test]
    fn test_number_text_has_no_trailing_zero() {
        let row = json!({"n": 5, "f": 2.5});
        assert_eq!(row.field("n").to_text().unwrap(), "5");
        assert_eq!(row.field("f").to_text().unwrap(), "2.5");
        assert!(json!({"n": null}).field("n").to_text().is_none());
    }
}

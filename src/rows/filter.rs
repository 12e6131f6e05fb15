//! Substring filtering into positional views.

use super::record::RowData;
use super::store::RowStore;

/// Filter request: keep rows whose `column` value contains `text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub column: String,
    pub text: String,
    pub case_sensitive: bool,
}

impl FilterSpec {
    pub fn new(column: impl Into<String>, text: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            column: column.into(),
            text: text.into(),
            case_sensitive,
        }
    }

    /// An empty filter string means "no filter".
    pub fn is_clear(&self) -> bool {
        self.text.is_empty()
    }

    fn needle(&self) -> String {
        if self.case_sensitive {
            self.text.clone()
        } else {
            self.text.to_uppercase()
        }
    }

    /// Whether a single row passes this filter.
    pub fn matches<R: RowData>(&self, row: &R) -> bool {
        matches_needle(row, &self.column, &self.needle(), self.case_sensitive)
    }
}

fn matches_needle<R: RowData>(row: &R, column: &str, needle: &str, case_sensitive: bool) -> bool {
    let Some(text) = row.field(column).to_text() else {
        return false;
    };
    if case_sensitive {
        text.contains(needle)
    } else {
        text.to_uppercase().contains(needle)
    }
}

/// A row of a filtered view paired with its physical store position
#[derive(Debug, Clone, Copy)]
pub struct FilteredRow<'a, R> {
    pub row: &'a R,
    pub origin_index: usize,
}

/// Filtered sub-view of a [`RowStore`].
///
/// Holds only the physical positions of the retained rows, in store order.
/// The view is tied to the store state it was built from; rebuild it after
/// any store mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    origins: Vec<usize>,
}

impl FilteredView {
    /// Scan `store` and keep every row matching `spec`.
    pub fn build<R: RowData>(store: &RowStore<R>, spec: &FilterSpec) -> Self {
        let needle = spec.needle();
        let origins: Vec<usize> = store
            .iter()
            .enumerate()
            .filter(|(_, row)| matches_needle(*row, &spec.column, &needle, spec.case_sensitive))
            .map(|(index, _)| index)
            .collect();
        log::debug!(
            "filter {:?} on '{}' kept {} of {} rows",
            spec.text,
            spec.column,
            origins.len(),
            store.len()
        );
        Self { origins }
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Physical store index of the view entry at `position`.
    pub fn origin_index(&self, position: usize) -> Option<usize> {
        self.origins.get(position).copied()
    }

    /// View position of the row stored at `physical`, if it passed the filter.
    pub fn position_of(&self, physical: usize) -> Option<usize> {
        self.origins.binary_search(&physical).ok()
    }

    pub fn origin_indices(&self) -> &[usize] {
        &self.origins
    }

    /// Retained rows paired with their origin index.
    pub fn rows<'a, R>(&'a self, store: &'a RowStore<R>) -> impl Iterator<Item = FilteredRow<'a, R>> + 'a {
        self.origins.iter().filter_map(move |&origin_index| {
            store.get(origin_index).map(|row| FilteredRow { row, origin_index })
        })
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
    use serde_json::json;

    #[test]
    fn test_case_sensitive_filter() {
        let store = RowStore::from_rows(vec![
            json!({"name": "Alice"}),
            json!({"name": "alfred"}),
            json!({"name": "Bob"}),
        ]);
        let view = FilteredView::build(&store, &FilterSpec::new("name", "Al", true));
        assert_eq!(view.origin_indices(), &[0]);
    }

    #[test]
    fn test_numbers_and_missing_values() {
        let store = RowStore::from_rows(vec![
            json!({"qty": 120}),
            json!({"qty": null}),
            json!({}),
            json!({"qty": 12.5}),
        ]);
        let view = FilteredView::build(&store, &FilterSpec::new("qty", "12", false));
        assert_eq!(view.origin_indices(), &[0, 3]);
        assert_eq!(view.position_of(3), Some(1));
        assert_eq!(view.position_of(1), None);
    }

    #[test]
    fn test_filter_uses_direct_property_not_path() {
        let store = RowStore::from_rows(vec![json!({"a.b": "hit", "a": {"b": "miss"}})]);
        let view = FilteredView::build(&store, &FilterSpec::new("a.b", "hit", false));
        assert_eq!(view.len(), 1);
    }
}

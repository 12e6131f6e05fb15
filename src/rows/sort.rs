//! Multi-key stable sorting.
//!
//! Each sort key resolves to one comparator: a caller-supplied override for
//! the column if the [`ComparatorLookup`] has one, otherwise a default that
//! walks the key's compare path on both rows. Keys fold into a single
//! composite comparator where the first non-equal result wins, and the
//! underlying sort is stable so full ties keep their previous order.

use std::cmp::Ordering;

use super::record::{split_path, RowData};
use super::store::RowStore;

/// Boxed row comparator
pub type Comparator<R> = Box<dyn Fn(&R, &R) -> Ordering>;

/// Strategy lookup for per-column comparator overrides.
///
/// A returned comparator must already account for `descending`.
pub trait ComparatorLookup<R> {
    fn comparator_for(&self, column: &str, descending: bool) -> Option<Comparator<R>>;
}

/// Lookup that never overrides the default comparator
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComparators;

impl<R> ComparatorLookup<R> for DefaultComparators {
    fn comparator_for(&self, _column: &str, _descending: bool) -> Option<Comparator<R>> {
        None
    }
}

impl<R, F> ComparatorLookup<R> for F
where
    F: Fn(&str, bool) -> Option<Comparator<R>>,
{
    fn comparator_for(&self, column: &str, descending: bool) -> Option<Comparator<R>> {
        self(column, descending)
    }
}

/// One key of a multi-column sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    /// Property-access steps used by the default comparator
    pub compare_path: Vec<String>,
    pub descending: bool,
}

impl SortKey {
    /// Key comparing on the column's own name as a dotted path.
    pub fn new(column: impl Into<String>, descending: bool) -> Self {
        let column = column.into();
        let compare_path = split_path(&column);
        Self {
            column,
            compare_path,
            descending,
        }
    }

    pub fn with_compare_path(mut self, path: Vec<String>) -> Self {
        self.compare_path = path;
        self
    }
}

/// Comparator that walks `key.compare_path` and orders the leaves.
pub fn default_comparator<R: RowData + 'static>(key: &SortKey) -> Comparator<R> {
    let path = key.compare_path.clone();
    let descending = key.descending;
    Box::new(move |left: &R, right: &R| {
        let ordering = left.value_at(&path).compare(&right.value_at(&path));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    })
}

/// Resolve every key to a comparator, preferring overrides.
pub fn resolve_comparators<R: RowData + 'static>(
    keys: &[SortKey],
    lookup: &dyn ComparatorLookup<R>,
) -> Vec<Comparator<R>> {
    keys.iter()
        .map(|key| {
            lookup
                .comparator_for(&key.column, key.descending)
                .unwrap_or_else(|| default_comparator(key))
        })
        .collect()
}

/// Sort `store` in place by `keys`. Returns `false` (and leaves the store
/// untouched) when there are no keys.
pub fn sort_rows<R: RowData + 'static>(
    store: &mut RowStore<R>,
    keys: &[SortKey],
    lookup: &dyn ComparatorLookup<R>,
) -> bool {
    if keys.is_empty() {
        return false;
    }
    let comparators = resolve_comparators(keys, lookup);
    store.sort_by(|left, right| {
        comparators
            .iter()
            .map(|compare| compare(left, right))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    log::debug!(
        "sorted {} rows by {} key(s)",
        store.len(),
        comparators.len()
    );
    true
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

    fn ids(store: &RowStore<Value>) -> Vec<i64> {
        store.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_second_key_breaks_ties() {
        let mut store = RowStore::from_rows(vec![
            json!({"id": 1, "a": 1, "b": "z"}),
            json!({"id": 2, "a": 0, "b": "y"}),
            json!({"id": 3, "a": 1, "b": "a"}),
        ]);
        let keys = vec![SortKey::new("a", false), SortKey::new("b", false)];
        assert!(sort_rows(&mut store, &keys, &DefaultComparators));
        assert_eq!(ids(&store), vec![2, 3, 1]);
    }

    #[test]
    fn test_override_replaces_default() {
        let mut store = RowStore::from_rows(vec![
            json!({"id": 1, "name": "bb"}),
            json!({"id": 2, "name": "a"}),
            json!({"id": 3, "name": "ccc"}),
        ]);
        let by_length = |column: &str, descending: bool| -> Option<Comparator<Value>> {
            if column != "name" {
                return None;
            }
            Some(Box::new(move |l: &Value, r: &Value| {
                let len = |v: &Value| v["name"].as_str().map_or(0, str::len);
                let ordering = len(l).cmp(&len(r));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            }))
        };
        sort_rows(&mut store, &[SortKey::new("name", true)], &by_length);
        assert_eq!(ids(&store), vec![3, 1, 2]);
    }

    #[test]
    fn test_no_keys_leaves_order() {
        let mut store = RowStore::from_rows(vec![json!({"id": 2}), json!({"id": 1})]);
        assert!(!sort_rows(&mut store, &[], &DefaultComparators));
        assert_eq!(ids(&store), vec![2, 1]);
    }
}

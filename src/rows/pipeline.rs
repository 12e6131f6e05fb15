//! Sort/filter pipeline over the row store.
//!
//! The pipeline owns the store, the current sort keys and the optional
//! filter. It decides which sequence is "active": the store itself, or the
//! filtered view when a non-empty filter is set. Every store mutation while
//! filtered rebuilds the view from scratch so `origin_index` values always
//! match the current physical positions.

use std::ops::Range;

use super::filter::{FilterSpec, FilteredRow, FilteredView};
use super::record::RowData;
use super::sort::{sort_rows, ComparatorLookup, SortKey};
use super::store::RowStore;
use crate::error::Result;

/// Which sequence is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveSequence {
    Unfiltered,
    Filtered,
}

#[derive(Debug, Clone)]
struct ActiveFilter {
    spec: FilterSpec,
    view: FilteredView,
}

/// Row store plus its ordering and filtering state
#[derive(Debug, Clone)]
pub struct RowPipeline<R> {
    store: RowStore<R>,
    sort_keys: Vec<SortKey>,
    filter: Option<ActiveFilter>,
}

impl<R> Default for RowPipeline<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> RowPipeline<R> {
    pub fn new() -> Self {
        Self {
            store: RowStore::new(),
            sort_keys: Vec::new(),
            filter: None,
        }
    }

    pub fn store(&self) -> &RowStore<R> {
        &self.store
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort_keys
    }

    pub fn filter_spec(&self) -> Option<&FilterSpec> {
        self.filter.as_ref().map(|f| &f.spec)
    }

    /// The filtered view, or `None` when unfiltered.
    pub fn filtered_view(&self) -> Option<&FilteredView> {
        self.filter.as_ref().map(|f| &f.view)
    }

    pub fn state(&self) -> ActiveSequence {
        if self.filter.is_some() {
            ActiveSequence::Filtered
        } else {
            ActiveSequence::Unfiltered
        }
    }

    /// Length of the active sequence.
    pub fn active_len(&self) -> usize {
        match &self.filter {
            Some(filter) => filter.view.len(),
            None => self.store.len(),
        }
    }

    /// Physical store index for an active-sequence position.
    pub fn physical_index(&self, active: usize) -> Option<usize> {
        match &self.filter {
            Some(filter) => filter.view.origin_index(active),
            None => (active < self.store.len()).then_some(active),
        }
    }

    /// Active-sequence position of a physical row, `None` if filtered out.
    pub fn active_index_of(&self, physical: usize) -> Option<usize> {
        match &self.filter {
            Some(filter) => filter.view.position_of(physical),
            None => (physical < self.store.len()).then_some(physical),
        }
    }

    /// Row at an active-sequence position.
    pub fn active_row(&self, active: usize) -> Option<&R> {
        self.physical_index(active).and_then(|i| self.store.get(i))
    }

    /// Active rows in `range` paired with their physical index.
    pub fn active_rows(&self, range: Range<usize>) -> impl Iterator<Item = FilteredRow<'_, R>> + '_ {
        range.filter_map(move |active| {
            let origin_index = self.physical_index(active)?;
            self.store
                .get(origin_index)
                .map(|row| FilteredRow { row, origin_index })
        })
    }

    /// Replace the sort keys without re-sorting.
    pub fn set_sort_keys(&mut self, keys: Vec<SortKey>) {
        self.sort_keys = keys;
    }
}

impl<R: RowData + 'static> RowPipeline<R> {
    pub fn with_rows(rows: Vec<R>) -> Self {
        Self {
            store: RowStore::from_rows(rows),
            sort_keys: Vec::new(),
            filter: None,
        }
    }

    /// Set new sort keys, sort the store, and rebuild any filtered view.
    pub fn sort(&mut self, keys: Vec<SortKey>, lookup: &dyn ComparatorLookup<R>) {
        self.sort_keys = keys;
        self.resort(lookup);
    }

    /// Re-apply the current sort keys. Returns `false` if there are none.
    pub fn resort(&mut self, lookup: &dyn ComparatorLookup<R>) -> bool {
        let sorted = sort_rows(&mut self.store, &self.sort_keys, lookup);
        if sorted {
            self.refilter();
        }
        sorted
    }

    /// Filter the store. An empty `spec.text` clears filtering.
    ///
    /// Returns the new view, or `None` when the full store is active.
    pub fn filter(&mut self, spec: FilterSpec) -> Option<&FilteredView> {
        if spec.is_clear() {
            self.clear_filter();
            return None;
        }
        let view = FilteredView::build(&self.store, &spec);
        let active = self.filter.insert(ActiveFilter { spec, view });
        Some(&active.view)
    }

    /// Return to the unfiltered state.
    pub fn clear_filter(&mut self) {
        if self.filter.take().is_some() {
            log::debug!("filter cleared");
        }
    }

    /// Rebuild the filtered view against the current store, if filtered.
    pub fn refilter(&mut self) {
        if let Some(filter) = self.filter.as_mut() {
            filter.view = FilteredView::build(&self.store, &filter.spec);
        }
    }

    /// Insert rows (append when `at` is `None`). Does not re-sort.
    pub fn add(&mut self, rows: Vec<R>, at: Option<usize>) -> Range<usize> {
        let range = self.store.add(rows, at);
        self.refilter();
        range
    }

    /// Remove the row at a physical index.
    ///
    /// # Errors
    /// Returns `GridError::RowOutOfRange` for a bad index; nothing changes.
    pub fn remove_at(&mut self, physical: usize) -> Result<R> {
        let row = self.store.remove_at(physical)?;
        self.refilter();
        Ok(row)
    }

    /// Replace all rows. Does not re-sort.
    pub fn reset(&mut self, rows: Vec<R>) {
        self.store.reset(rows);
        self.refilter();
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
    use crate::rows::DefaultComparators;
    use serde_json::{json, Value};

    fn pipeline() -> RowPipeline<Value> {
        RowPipeline::with_rows(vec![
            json!({"name": "pear", "n": 3}),
            json!({"name": "apple", "n": 1}),
            json!({"name": "plum", "n": 2}),
        ])
    }

    #[test]
    fn test_state_transitions() {
        let mut p = pipeline();
        assert_eq!(p.state(), ActiveSequence::Unfiltered);
        assert!(p.filter(FilterSpec::new("name", "p", false)).is_some());
        assert_eq!(p.state(), ActiveSequence::Filtered);
        assert_eq!(p.active_len(), 3);
        assert!(p.filter(FilterSpec::new("name", "", false)).is_none());
        assert_eq!(p.state(), ActiveSequence::Unfiltered);
    }

    #[test]
    fn test_sort_then_filter_maps_origins() {
        let mut p = pipeline();
        p.filter(FilterSpec::new("name", "pl", false));
        p.sort(vec![SortKey::new("n", false)], &DefaultComparators);
        // store is now apple, plum, pear; filter keeps apple + plum
        let origins: Vec<usize> = p.filtered_view().unwrap().origin_indices().to_vec();
        assert_eq!(origins, vec![0, 1]);
        assert_eq!(p.active_row(1).unwrap()["name"], "plum");
    }

    #[test]
    fn test_remove_refilters() {
        let mut p = pipeline();
        p.filter(FilterSpec::new("name", "p", false));
        p.remove_at(0).unwrap();
        assert_eq!(p.filtered_view().unwrap().origin_indices(), &[0, 1]);
        assert!(p.remove_at(10).is_err());
        assert_eq!(p.store().len(), 2);
    }

    #[test]
    fn test_active_rows_pairs_origin() {
        let mut p = pipeline();
        p.filter(FilterSpec::new("name", "pl", false));
        let pairs: Vec<(usize, String)> = p
            .active_rows(0..5)
            .map(|r| (r.origin_index, r.row["name"].as_str().unwrap().to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![(1, "apple".to_string()), (2, "plum".to_string())]
        );
    }
}

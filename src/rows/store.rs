//! Ordered row storage.
//!
//! Rows have no identity beyond their position. Callers that hold on to an
//! index across a mutation must re-resolve it.

use std::cmp::Ordering;
use std::ops::Range;

use crate::error::{GridError, Result};

/// Ordered sequence of row records
#[derive(Debug, Clone, Default)]
pub struct RowStore<R> {
    rows: Vec<R>,
}

impl<R> RowStore<R> {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[R] {
        &self.rows
    }

    /// Insert rows at `at` (clamped to the end), or append when `at` is `None`.
    ///
    /// Returns the physical range the new rows now occupy.
    pub fn add(&mut self, rows: Vec<R>, at: Option<usize>) -> Range<usize> {
        let count = rows.len();
        let start = at.map_or(self.rows.len(), |i| i.min(self.rows.len()));
        self.rows.splice(start..start, rows);
        log::trace!("row store: inserted {count} rows at {start}");
        start..start + count
    }

    /// Remove the row at `index`.
    ///
    /// # Errors
    /// Returns `GridError::RowOutOfRange` if `index` is past the end; the
    /// store is left unchanged.
    pub fn remove_at(&mut self, index: usize) -> Result<R> {
        if index >= self.rows.len() {
            return Err(GridError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Replace every row. Previously returned indices are invalid afterwards.
    pub fn reset(&mut self, rows: Vec<R>) {
        self.rows = rows;
    }

    /// Stable in-place sort.
    pub(crate) fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&R, &R) -> Ordering,
    {
        self.rows.sort_by(compare);
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
    fn test_add_at_front_and_clamped() {
        let mut store = RowStore::from_rows(vec![1, 2, 3]);
        assert_eq!(store.add(vec![0], Some(0)), 0..1);
        assert_eq!(store.add(vec![9, 10], Some(100)), 4..6);
        assert_eq!(store.as_slice(), &[0, 1, 2, 3, 9, 10]);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut store = RowStore::from_rows(vec!["a", "b"]);
        let err = store.remove_at(2).unwrap_err();
        assert!(matches!(err, GridError::RowOutOfRange { index: 2, len: 2 }));
        assert_eq!(store.len(), 2);
        assert_eq!(store.remove_at(0).unwrap(), "a");
        assert_eq!(store.as_slice(), &["b"]);
    }
}

//! Ordered column collection.

use std::collections::BTreeMap;

use super::column::Column;
use crate::error::{GridError, Result};
use crate::types::{ColumnConfig, ColumnSpec, ColumnWidth, GridSettings, WidthValue};

/// Reference to a column by name or by numeric position.
///
/// What a position means depends on the operation: [`ColumnCollection::insert`]
/// reads it as a display order, [`ColumnCollection::move_column`] as an index
/// into the visible columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRef<'a> {
    Name(&'a str),
    Position(usize),
}

impl<'a> From<&'a str> for ColumnRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for ColumnRef<'_> {
    fn from(position: usize) -> Self {
        Self::Position(position)
    }
}

/// All columns of a grid, keyed by unique name, ordered by `order`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnCollection {
    columns: Vec<Column>,
}

impl ColumnCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the collection from specs.
    ///
    /// Specs without an explicit order are numbered after the highest order
    /// seen so far; orders are then normalized to `0..n` and at least one
    /// column is made visible.
    ///
    /// # Errors
    /// Fails on duplicate names or unparseable widths.
    pub fn from_specs(specs: &[ColumnSpec], settings: &GridSettings) -> Result<Self> {
        let mut collection = Self::new();
        let mut next_order = 0;
        for spec in specs {
            if collection.get(&spec.name).is_some() {
                return Err(GridError::DuplicateColumn(spec.name.clone()));
            }
            let mut column = Column::from_spec(spec, settings)?;
            match spec.order {
                Some(order) => {
                    if order >= next_order {
                        next_order = order + 1;
                    }
                    column.order = order;
                }
                None => {
                    column.order = next_order;
                    next_order += 1;
                }
            }
            collection.columns.push(column);
        }
        collection.normalize_order();
        collection.ensure_visible();
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Column> {
        self.columns.iter_mut()
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Look up a column, reporting an unknown name as an error.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn`.
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.get(name)
            .ok_or_else(|| GridError::UnknownColumn(name.to_string()))
    }

    /// See [`ColumnCollection::require`].
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn`.
    pub fn require_mut(&mut self, name: &str) -> Result<&mut Column> {
        self.get_mut(name)
            .ok_or_else(|| GridError::UnknownColumn(name.to_string()))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn get_by_order(&self, order: usize) -> Option<&Column> {
        self.columns.iter().find(|c| c.order == order)
    }

    pub fn max_order(&self) -> usize {
        self.columns.iter().map(|c| c.order).max().unwrap_or(0)
    }

    /// Renumber orders to a dense `0..n` keeping their relative sequence.
    pub fn normalize_order(&mut self) {
        let mut by_order: Vec<usize> = (0..self.columns.len()).collect();
        by_order.sort_by_key(|&i| self.columns.get(i).map_or(usize::MAX, |c| c.order));
        for (order, index) in by_order.into_iter().enumerate() {
            if let Some(column) = self.columns.get_mut(index) {
                column.order = order;
            }
        }
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> Vec<&Column> {
        let mut visible: Vec<&Column> = self.columns.iter().filter(|c| c.visible).collect();
        visible.sort_by_key(|c| c.order);
        visible
    }

    pub fn visible_names(&self) -> Vec<String> {
        self.visible_columns()
            .into_iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Visible column at a display position.
    pub fn visible_at(&self, position: usize) -> Option<&Column> {
        self.visible_columns().into_iter().nth(position)
    }

    /// Make the first column (by order) visible if every column is hidden.
    ///
    /// Returns the name of the promoted column.
    pub fn ensure_visible(&mut self) -> Option<String> {
        if self.columns.is_empty() || self.columns.iter().any(|c| c.visible) {
            return None;
        }
        let column = self.columns.iter_mut().min_by_key(|c| c.order)?;
        column.visible = true;
        log::debug!("all columns hidden, showing '{}'", column.name);
        Some(column.name.clone())
    }

    fn resolve_name(&self, reference: ColumnRef<'_>, position_is_order: bool) -> Option<String> {
        match reference {
            ColumnRef::Name(name) => self.get(name).map(|c| c.name.clone()),
            ColumnRef::Position(position) if position_is_order => {
                self.get_by_order(position).map(|c| c.name.clone())
            }
            ColumnRef::Position(position) => self.visible_at(position).map(|c| c.name.clone()),
        }
    }

    /// Insert a column before `before` (a name, or a display order), or at the end.
    ///
    /// # Errors
    /// Returns `GridError::DuplicateColumn` if the name is taken.
    pub fn insert(&mut self, mut column: Column, before: Option<ColumnRef<'_>>) -> Result<()> {
        if self.get(&column.name).is_some() {
            return Err(GridError::DuplicateColumn(column.name));
        }
        let before_order = before
            .and_then(|r| self.resolve_name(r, true))
            .and_then(|name| self.get(&name).map(|c| c.order));
        column.order = match before_order {
            Some(order) => order,
            None if self.columns.is_empty() => 0,
            None => self.max_order() + 1,
        };
        for existing in self.columns.iter_mut() {
            if existing.order >= column.order {
                existing.order += 1;
            }
        }
        self.columns.push(column);
        self.normalize_order();
        self.ensure_visible();
        Ok(())
    }

    /// Remove a column by name.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn`.
    pub fn remove(&mut self, name: &str) -> Result<Column> {
        let index = self
            .index_of(name)
            .ok_or_else(|| GridError::UnknownColumn(name.to_string()))?;
        let column = self.columns.remove(index);
        self.normalize_order();
        self.ensure_visible();
        Ok(column)
    }

    /// Move `src` into the display slot currently held by `dest`, shifting
    /// the columns in between by one. Positions refer to visible columns.
    ///
    /// Returns `Ok(false)` when source and destination are the same column.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn` if either side does not resolve.
    pub fn move_column(&mut self, src: ColumnRef<'_>, dest: ColumnRef<'_>) -> Result<bool> {
        let src_name = self
            .resolve_name(src, false)
            .ok_or_else(|| GridError::UnknownColumn(format!("{src:?}")))?;
        let dest_name = self
            .resolve_name(dest, false)
            .ok_or_else(|| GridError::UnknownColumn(format!("{dest:?}")))?;
        if src_name == dest_name {
            return Ok(false);
        }
        let src_order = self.require(&src_name)?.order;
        let dest_order = self.require(&dest_name)?.order;
        for column in self.columns.iter_mut() {
            if src_order < dest_order && column.order > src_order && column.order <= dest_order {
                column.order -= 1;
            } else if src_order > dest_order && column.order >= dest_order && column.order < src_order
            {
                column.order += 1;
            }
        }
        self.require_mut(&src_name)?.order = dest_order;
        log::debug!("moved column '{src_name}' from {src_order} to {dest_order}");
        Ok(true)
    }

    /// Show or hide a column. Hiding the last visible column is undone by
    /// [`ColumnCollection::ensure_visible`].
    ///
    /// Returns whether the visibility actually changed.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn`.
    pub fn set_visible(&mut self, name: &str, visible: bool) -> Result<bool> {
        let column = self.require_mut(name)?;
        if column.visible == visible {
            return Ok(false);
        }
        column.visible = visible;
        self.ensure_visible();
        Ok(self.require(name)?.visible == visible)
    }

    /// # Errors
    /// Returns `GridError::UnknownColumn`.
    pub fn set_label(&mut self, name: &str, label: impl Into<String>) -> Result<()> {
        self.require_mut(name)?.label = label.into();
        Ok(())
    }

    /// Re-parse a column's width. Returns the width mode before the change
    /// so callers can tell whether the mode flipped.
    ///
    /// # Errors
    /// Returns `GridError::UnknownColumn` or `GridError::InvalidWidth`; the
    /// column is left unchanged on error.
    pub fn set_width(
        &mut self,
        name: &str,
        width: &WidthValue,
        settings: &GridSettings,
    ) -> Result<ColumnWidth> {
        let column = self.require_mut(name)?;
        let parsed = ColumnWidth::parse(width, settings.min_width_for(column.ignore_min))?;
        Ok(std::mem::replace(&mut column.width, parsed))
    }

    pub fn column_config(&self, name: &str) -> Option<ColumnConfig> {
        self.get(name).map(Column::config)
    }

    /// Snapshot of every column's user-adjustable settings, keyed by name.
    pub fn columns_config(&self) -> BTreeMap<String, ColumnConfig> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.config()))
            .collect()
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

    fn collection(names: &[&str]) -> ColumnCollection {
        let specs: Vec<ColumnSpec> = names.iter().map(|n| ColumnSpec::new(*n)).collect();
        ColumnCollection::from_specs(&specs, &GridSettings::default()).unwrap()
    }

    fn order_of(c: &ColumnCollection) -> Vec<String> {
        c.visible_names()
    }

    #[test]
    fn test_explicit_orders_normalize_dense() {
        let specs = vec![
            ColumnSpec::new("a").with_order(10),
            ColumnSpec::new("b"),
            ColumnSpec::new("c").with_order(2),
        ];
        let c = ColumnCollection::from_specs(&specs, &GridSettings::default()).unwrap();
        assert_eq!(order_of(&c), vec!["c", "a", "b"]);
        let mut orders: Vec<usize> = c.iter().map(|col| col.order).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let specs = vec![ColumnSpec::new("a"), ColumnSpec::new("a")];
        assert!(matches!(
            ColumnCollection::from_specs(&specs, &GridSettings::default()),
            Err(GridError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_move_forward_and_back() {
        let mut c = collection(&["a", "b", "c", "d"]);
        assert!(c.move_column("a".into(), "c".into()).unwrap());
        assert_eq!(order_of(&c), vec!["b", "c", "a", "d"]);
        assert!(c.move_column(ColumnRef::Position(3), ColumnRef::Position(0)).unwrap());
        assert_eq!(order_of(&c), vec!["d", "b", "c", "a"]);
        assert!(!c.move_column("b".into(), "b".into()).unwrap());
    }

    #[test]
    fn test_insert_before_named_column() {
        let mut c = collection(&["a", "b"]);
        let column =
            Column::from_spec(&ColumnSpec::new("x"), &GridSettings::default()).unwrap();
        c.insert(column, Some("b".into())).unwrap();
        assert_eq!(order_of(&c), vec!["a", "x", "b"]);
    }

    #[test]
    fn test_hiding_everything_promotes_first() {
        let mut c = collection(&["a", "b"]);
        assert!(c.set_visible("b", false).unwrap());
        assert!(!c.set_visible("a", false).unwrap());
        assert!(c.get("a").unwrap().visible);
        assert!(c.set_visible("zzz", true).is_err());
    }

    #[test]
    fn test_set_width_and_config_snapshot() {
        let mut c = collection(&["a", "b"]);
        let previous = c
            .set_width("b", &WidthValue::from("25%"), &GridSettings::default())
            .unwrap();
        assert_eq!(previous, ColumnWidth::Auto);
        assert!(c
            .set_width("b", &WidthValue::from("wide"), &GridSettings::default())
            .is_err());
        c.set_label("a", "Alpha").unwrap();
        let config = c.columns_config();
        assert_eq!(config["a"].label, "Alpha");
        assert_eq!(config["b"].width, WidthValue::from("25%"));
        assert_eq!(config["b"].order, 1);
    }
}

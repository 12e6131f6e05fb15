//! Column width allocation.
//!
//! Turns the width specs of the visible columns into pixel widths for a
//! given container width:
//!
//! 1. Absolute columns take their width plus any sort-arrow reservation.
//! 2. Auto columns take their measured label width plus padding, or become
//!    relative when `convert_column_widths_to_relative` is set.
//! 3. Relative fractions are renormalized to 1.0 when the grow/shrink
//!    settings allow it.
//! 4. Relative columns below the minimum are raised, and the deficit is
//!    taken back from columns with slack.
//! 5. Fractions are rounded to pixels of the remaining budget; rounding
//!    drift is absorbed by the last relative column with room above its minimum.
//! 6. The last column's effective width loses the vertical scrollbar.
//!
//! The computation is pure: the same inputs always produce the same widths.

use serde::Serialize;

use crate::columns::Column;
use crate::types::{ColumnWidth, GridSettings, WidthMode};

use super::measure::TextMeasurer;

/// Computed width of one visible column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedWidth {
    pub name: String,
    /// Mode the column was laid out in (auto columns may report `Relative`)
    pub mode: WidthMode,
    /// Final fraction of the relative budget, for relative columns
    pub fraction: Option<f64>,
    pub actual_width: f64,
    /// `actual_width` minus the scrollbar on the last column, else equal
    pub effective_width: f64,
}

/// Result of one width allocation pass
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnWidths {
    pub columns: Vec<ComputedWidth>,
    pub available_width: f64,
    /// Width left for relative columns after fixed ones were placed
    pub relative_budget: f64,
}

impl ColumnWidths {
    pub fn get(&self, name: &str) -> Option<&ComputedWidth> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Sum of `actual_width` over all columns.
    pub fn total(&self) -> f64 {
        self.columns.iter().map(|c| c.actual_width).sum()
    }

    /// Sum of `effective_width` over all columns.
    pub fn effective_total(&self) -> f64 {
        self.columns.iter().map(|c| c.effective_width).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

struct Slot {
    mode: WidthMode,
    fraction: f64,
    width: f64,
    min_width: f64,
    ignore_min: bool,
}

/// Allocate pixel widths to `columns`, which must be the visible columns in
/// display order.
///
/// Degenerate input never fails: an empty column list yields no widths, and
/// a non-positive budget gives relative columns their minimum width.
pub fn compute_column_widths(
    columns: &[&Column],
    available_width: f64,
    settings: &GridSettings,
    measurer: &dyn TextMeasurer,
    scrollbar_width: f64,
) -> ColumnWidths {
    let available_width = if available_width.is_finite() {
        available_width
    } else {
        0.0
    };
    let mut slots = Vec::with_capacity(columns.len());
    let mut size_left = available_width;
    let mut fixed_total = 0.0;

    for column in columns {
        let min_width = settings.min_width_for(column.ignore_min);
        let slot = match column.width {
            ColumnWidth::Absolute(width) => {
                let width = (width + column.arrow_reserved_width).max(min_width);
                size_left -= width;
                fixed_total += width;
                Slot {
                    mode: WidthMode::Absolute,
                    fraction: 0.0,
                    width,
                    min_width,
                    ignore_min: column.ignore_min,
                }
            }
            ColumnWidth::Auto => {
                let measured = measurer.text_width(&column.label);
                let measured = if measured.is_finite() { measured } else { 0.0 };
                let width = (measured + settings.auto_column_padding + column.arrow_reserved_width)
                    .max(min_width);
                size_left -= width;
                fixed_total += width;
                Slot {
                    mode: WidthMode::Auto,
                    fraction: 0.0,
                    width,
                    min_width,
                    ignore_min: column.ignore_min,
                }
            }
            ColumnWidth::Relative(fraction) => Slot {
                mode: WidthMode::Relative,
                fraction: fraction.max(0.0),
                width: 0.0,
                min_width,
                ignore_min: column.ignore_min,
            },
        };
        slots.push(slot);
    }

    if settings.convert_column_widths_to_relative && fixed_total > 0.0 {
        for slot in slots.iter_mut().filter(|s| s.mode == WidthMode::Auto) {
            size_left += slot.width;
            slot.fraction = slot.width / fixed_total;
            slot.mode = WidthMode::Relative;
        }
    }

    normalize_fractions(&mut slots, settings);

    let budget = size_left;
    if budget > 0.0 {
        enforce_relative_minimum(&mut slots, settings.min_column_width / budget);
        round_relative_widths(&mut slots, budget);
    } else {
        for slot in slots.iter_mut().filter(|s| s.mode == WidthMode::Relative) {
            slot.width = slot.min_width;
        }
    }

    let last = slots.len().checked_sub(1);
    let computed = columns
        .iter()
        .zip(slots)
        .enumerate()
        .map(|(index, (column, slot))| {
            let effective_width = if Some(index) == last {
                (slot.width - scrollbar_width.max(0.0)).max(0.0)
            } else {
                slot.width
            };
            ComputedWidth {
                name: column.name.clone(),
                mode: slot.mode,
                fraction: (slot.mode == WidthMode::Relative).then_some(slot.fraction),
                actual_width: slot.width,
                effective_width,
            }
        })
        .collect::<Vec<_>>();

    log::trace!(
        "allocated {} column(s) in {available_width}px, relative budget {budget}px",
        computed.len()
    );

    ColumnWidths {
        columns: computed,
        available_width,
        relative_budget: budget,
    }
}

fn normalize_fractions(slots: &mut [Slot], settings: &GridSettings) {
    let relatives = slots.iter().filter(|s| s.mode == WidthMode::Relative);
    let total: f64 = relatives.map(|s| s.fraction).sum();
    if total <= 0.0 {
        return;
    }
    let grow = total < 1.0 && settings.relative_width_grows_to_fill_width;
    let shrink = total > 1.0 && settings.relative_width_shrinks_to_fill_width;
    if grow || shrink {
        for slot in slots.iter_mut().filter(|s| s.mode == WidthMode::Relative) {
            slot.fraction /= total;
        }
    }
}

/// Raise relative columns below `min_fraction` and take the deficit back
/// from columns above it, never pushing a donor below the minimum.
fn enforce_relative_minimum(slots: &mut [Slot], min_fraction: f64) {
    if min_fraction.is_nan() || min_fraction <= 0.0 {
        return;
    }
    let mut deficit = 0.0;
    for slot in slots
        .iter_mut()
        .filter(|s| s.mode == WidthMode::Relative && !s.ignore_min)
    {
        if slot.fraction < min_fraction {
            deficit += min_fraction - slot.fraction;
            slot.fraction = min_fraction;
        }
    }
    for slot in slots
        .iter_mut()
        .filter(|s| s.mode == WidthMode::Relative && !s.ignore_min)
    {
        if deficit <= 0.0 {
            break;
        }
        if slot.fraction > min_fraction {
            let delta = deficit.min(slot.fraction - min_fraction);
            slot.fraction -= delta;
            deficit -= delta;
        }
    }
}

/// Convert fractions to whole pixels. The last relative column absorbs the
/// drift between the rounded widths and the rounded relative target. When a
/// column is pinned at its minimum, the nearest preceding relative column
/// with room takes the rest.
///
/// Drift of up to one pixel per relative column is corrected, not just one
/// pixel, since every column rounds independently.
fn round_relative_widths(slots: &mut [Slot], budget: f64) {
    let count = slots
        .iter()
        .filter(|s| s.mode == WidthMode::Relative)
        .count();
    if count == 0 {
        return;
    }
    let target: f64 = slots
        .iter()
        .filter(|s| s.mode == WidthMode::Relative)
        .map(|s| s.fraction)
        .sum::<f64>()
        * budget;
    let target = target.round();

    let mut allocated = 0.0;
    for slot in slots.iter_mut().filter(|s| s.mode == WidthMode::Relative) {
        slot.width = (budget * slot.fraction).round();
        allocated += slot.width;
    }

    let tolerance = count as f64;
    let mut drift = target - allocated;
    if drift.abs() < 0.5 || drift.abs() > tolerance {
        return;
    }
    for slot in slots
        .iter_mut()
        .rev()
        .filter(|s| s.mode == WidthMode::Relative)
    {
        let floor = if slot.ignore_min { 0.0 } else { slot.min_width };
        let adjusted = (slot.width + drift).max(floor);
        drift -= adjusted - slot.width;
        slot.width = adjusted;
        if drift.abs() < 0.5 {
            break;
        }
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
    use crate::layout::CharWidthMeasurer;
    use crate::types::ColumnSpec;

    fn column(name: &str, width: &str) -> Column {
        let spec = ColumnSpec::new(name).with_width(width);
        Column::from_spec(&spec, &GridSettings::default()).unwrap()
    }

    fn widths(columns: &[Column], available: f64, settings: &GridSettings) -> ColumnWidths {
        let refs: Vec<&Column> = columns.iter().collect();
        compute_column_widths(&refs, available, settings, &CharWidthMeasurer::new(8.0), 0.0)
    }

    #[test]
    fn test_absolute_respects_minimum() {
        let columns = vec![column("a", "10"), column("b", "100")];
        let w = widths(&columns, 500.0, &GridSettings::default());
        assert_eq!(w.get("a").unwrap().actual_width, 35.0);
        assert_eq!(w.get("b").unwrap().actual_width, 100.0);
        assert_eq!(w.relative_budget, 365.0);
    }

    #[test]
    fn test_auto_uses_label_plus_padding() {
        let columns = vec![column("name", "auto")];
        let w = widths(&columns, 500.0, &GridSettings::default());
        // 4 chars * 8px + 20px padding
        assert_eq!(w.get("name").unwrap().actual_width, 52.0);
    }

    #[test]
    fn test_relative_fills_remaining_budget() {
        let columns = vec![column("a", "100"), column("b", "30%"), column("c", "30%")];
        let w = widths(&columns, 401.0, &GridSettings::default());
        assert_eq!(w.total(), 401.0);
        let b = w.get("b").unwrap();
        assert_eq!(b.fraction, Some(0.5));
    }

    #[test]
    fn test_rounding_drift_lands_on_last_relative() {
        let columns = vec![column("a", "30%"), column("b", "30%"), column("c", "30%")];
        let w = widths(&columns, 200.0, &GridSettings::default());
        assert_eq!(w.total(), 200.0);
        assert_eq!(w.columns[0].actual_width, 67.0);
        assert_eq!(w.columns[1].actual_width, 67.0);
        assert_eq!(w.columns[2].actual_width, 66.0);
    }

    #[test]
    fn test_no_grow_leaves_underfill() {
        let settings = GridSettings {
            relative_width_grows_to_fill_width: false,
            ..GridSettings::default()
        };
        let columns = vec![column("a", "25%"), column("b", "25%")];
        let w = widths(&columns, 400.0, &settings);
        assert_eq!(w.total(), 200.0);
    }

    #[test]
    fn test_minimum_deficit_taken_from_wide_columns() {
        let columns = vec![column("a", "1%"), column("b", "99%")];
        let w = widths(&columns, 1000.0, &GridSettings::default());
        assert_eq!(w.get("a").unwrap().actual_width, 35.0);
        assert_eq!(w.get("b").unwrap().actual_width, 965.0);
    }

    #[test]
    fn test_scrollbar_only_affects_last_effective_width() {
        let columns = vec![column("a", "50%"), column("b", "50%")];
        let refs: Vec<&Column> = columns.iter().collect();
        let w = compute_column_widths(
            &refs,
            300.0,
            &GridSettings::default(),
            &CharWidthMeasurer::default(),
            15.0,
        );
        assert_eq!(w.columns[0].effective_width, 150.0);
        assert_eq!(w.columns[1].actual_width, 150.0);
        assert_eq!(w.columns[1].effective_width, 135.0);
    }

    #[test]
    fn test_zero_budget_degrades_to_minimum() {
        let columns = vec![column("a", "50%"), column("b", "50%")];
        let w = widths(&columns, 0.0, &GridSettings::default());
        assert!(w.columns.iter().all(|c| c.actual_width == 35.0));
    }

    #[test]
    fn test_empty_columns() {
        let w = widths(&[], 500.0, &GridSettings::default());
        assert!(w.is_empty());
        assert_eq!(w.total(), 0.0);
    }
}

//! Row store and the sort/filter pipeline.
//!
//! This module handles:
//! - Ordered row storage with positional identity
//! - Stable multi-key sorting with per-column comparator overrides
//! - Substring filtering into views that map back to physical positions
//! - Active-sequence selection (full store or filtered view)

mod filter;
mod pipeline;
mod record;
mod sort;
mod store;

pub use filter::{FilterSpec, FilteredRow, FilteredView};
pub use pipeline::{ActiveSequence, RowPipeline};
pub use record::{split_path, CellValue, RowData};
pub use sort::{
    default_comparator, resolve_comparators, sort_rows, Comparator, ComparatorLookup,
    DefaultComparators, SortKey,
};
pub use store::RowStore;

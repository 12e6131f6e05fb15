//! Layout engines for column widths and the virtual row window.
//!
//! This module handles:
//! - Allocating pixel widths to columns under mixed sizing rules
//! - Measuring header text for auto-width columns
//! - Tracking which rows around the viewport must be materialized
//! - Managing viewport state (scroll position, size)

mod measure;
mod viewport;
mod widths;
mod window;

pub use measure::{CachedMeasurer, CharWidthMeasurer, TextMeasurer};
pub use viewport::Viewport;
pub use widths::{compute_column_widths, ColumnWidths, ComputedWidth};
pub use window::{
    compute_window, visible_range, RowHeights, RowWindow, VirtualWindow, WindowParams,
    WindowUpdate,
};

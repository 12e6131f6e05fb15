//! vgrid - virtualized data grid core
//!
//! The engines behind a scrolling table widget, usable natively or from the
//! browser via WebAssembly:
//! - Column width allocation over absolute, relative and auto widths
//! - Virtual row window with minimal diffs on scroll
//! - Stable multi-column sort and substring filtering over a row store
//! - Ordered column model with visibility and reordering
//!
//! # Usage (Rust)
//!
//! ```
//! use serde_json::json;
//! use vgrid::DataGrid;
//!
//! let mut grid = DataGrid::from_json(r#"{"columns": [{"name": "name", "width": "100%"}]}"#)?;
//! grid.set_rows(vec![json!({"name": "bob"}), json!({"name": "alice"})], false);
//! grid.sort("name", None, false)?;
//! grid.table_width_changed(400.0, false);
//! assert_eq!(grid.data_for_row(0), Some(&json!({"name": "alice"})));
//! # Ok::<(), vgrid::GridError>(())
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'vgrid';
//! await init();
//! const view = new GridView({ columns: [{ name: 'name', width: '100%' }] });
//! view.setMeasurer((text) => ctx.measureText(text).width);
//! view.setRows(rows, false);
//! view.resize(container.clientWidth, container.clientHeight);
//! const diff = view.scrollTo(body.scrollTop);
//! ```

pub mod columns;
pub mod error;
pub mod grid;
pub mod layout;
pub mod rows;
pub mod types;

// Browser facade
#[cfg(target_arch = "wasm32")]
pub mod viewer;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub use viewer::GridView;

pub use columns::{Column, ColumnCollection, ColumnRef};
pub use error::{GridError, Result};
pub use grid::{DataGrid, RowRefresh};
pub use layout::{RowHeights, RowWindow, WindowUpdate};
pub use rows::{CellValue, RowData};
pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

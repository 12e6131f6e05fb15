//! Column model: definitions, display order and visibility.

mod collection;
mod column;

pub use collection::{ColumnCollection, ColumnRef};
pub use column::Column;

//! Configuration types for the grid.

mod column;
mod options;
mod settings;
mod sort;

pub use column::*;
pub use options::*;
pub use settings::*;
pub use sort::*;

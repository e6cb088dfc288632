//! Value model: tagged scalars, rows and table snapshots.

pub mod row;
pub mod value;

pub use row::{Row, Table};
pub use value::Value;

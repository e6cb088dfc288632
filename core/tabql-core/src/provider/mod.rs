//! Table providers
//!
//! The engine reads and mutates tables only through [`TableProvider`].
//! Two implementations ship with the crate:
//!
//! - [`MemoryProvider`]: tables held in memory, guarded by an `RwLock`
//! - [`CsvProvider`]: one `<table>.csv` file per table under a root directory

use crate::error::TabqlResult;
use crate::sql::executor::RowFilter;
use crate::types::Table;
use serde::Serialize;
use std::sync::Arc;

pub mod batch;
pub mod csv;
pub mod memory;

pub use batch::{batch_to_rows, batches_to_table, rows_to_batch, table_to_batch};
pub use csv::CsvProvider;
pub use memory::MemoryProvider;

/// Result of a single-row insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsertResult {
    pub inserted: usize,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    pub deleted: usize,
}

/// Table storage capability the engine calls into.
pub trait TableProvider: Send + Sync {
    /// Fetch a snapshot of every row of `name`.
    ///
    /// Fails with `TableNotFound` when the table does not exist.
    fn fetch_table(&self, name: &str) -> TabqlResult<Table>;

    /// Append one row. `values` are raw text, one per entry of `columns`.
    fn insert_row(
        &self,
        table: &str,
        columns: &[String],
        values: &[String],
    ) -> TabqlResult<InsertResult>;

    /// Remove the rows `filter` matches.
    fn delete_rows(&self, table: &str, filter: &RowFilter) -> TabqlResult<DeleteResult>;

    /// Names of the tables this provider can serve, sorted.
    fn table_names(&self) -> TabqlResult<Vec<String>>;
}

impl<P: TableProvider + ?Sized> TableProvider for Arc<P> {
    fn fetch_table(&self, name: &str) -> TabqlResult<Table> {
        (**self).fetch_table(name)
    }

    fn insert_row(
        &self,
        table: &str,
        columns: &[String],
        values: &[String],
    ) -> TabqlResult<InsertResult> {
        (**self).insert_row(table, columns, values)
    }

    fn delete_rows(&self, table: &str, filter: &RowFilter) -> TabqlResult<DeleteResult> {
        (**self).delete_rows(table, filter)
    }

    fn table_names(&self) -> TabqlResult<Vec<String>> {
        (**self).table_names()
    }
}

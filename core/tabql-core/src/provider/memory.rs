//! In-memory table provider
//!
//! Tables live in an `AHashMap` behind a `parking_lot::RwLock`; reads hand
//! out cloned snapshots.

use crate::error::{ProviderError, TabqlResult};
use crate::provider::batch::batches_to_table;
use crate::provider::{DeleteResult, InsertResult, TableProvider};
use crate::sql::executor::RowFilter;
use crate::types::{Row, Table, Value};
use ahash::AHashMap;
use arrow::record_batch::RecordBatch;
use parking_lot::RwLock;
use tracing::info;

/// In-memory table provider
pub struct MemoryProvider {
    tables: RwLock<AHashMap<String, Table>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(AHashMap::new()),
        }
    }

    /// Register (or replace) a table.
    pub fn register_table(&self, name: impl Into<String>, table: Table) {
        self.tables.write().insert(name.into(), table);
    }

    /// Register a table from rows; the first row fixes the column order.
    ///
    /// With no rows the table has no columns, so qualified references and
    /// INSERTs against it fail. Use [`create_table`](Self::create_table) to
    /// declare an empty table.
    pub fn register_rows(&self, name: impl Into<String>, rows: Vec<Row>) {
        self.register_table(name, Table::from_rows(rows));
    }

    /// Register a table from Arrow record batches.
    pub fn register_batches(&self, name: impl Into<String>, batches: &[RecordBatch]) -> TabqlResult<()> {
        let table = batches_to_table(batches)?;
        self.register_table(name, table);
        Ok(())
    }

    /// Create an empty table with the given columns.
    pub fn create_table<I, S>(&self, name: impl Into<String>, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        self.register_table(name, Table::new(columns, Vec::new()));
    }

    /// Drop a table. Returns whether it existed.
    pub fn drop_table(&self, name: &str) -> bool {
        self.tables.write().remove(name).is_some()
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TableProvider for MemoryProvider {
    fn fetch_table(&self, name: &str) -> TabqlResult<Table> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::TableNotFound(name.to_string()).into())
    }

    fn insert_row(
        &self,
        table: &str,
        columns: &[String],
        values: &[String],
    ) -> TabqlResult<InsertResult> {
        let mut tables = self.tables.write();
        let target = tables
            .get_mut(table)
            .ok_or_else(|| ProviderError::TableNotFound(table.to_string()))?;

        if let Some(unknown) = columns.iter().find(|c| !target.columns().contains(*c)) {
            return Err(ProviderError::UnknownColumn {
                table: table.to_string(),
                column: unknown.clone(),
            }
            .into());
        }

        let row: Row = target
            .columns()
            .iter()
            .map(|column| {
                let value = columns
                    .iter()
                    .position(|c| c == column)
                    .and_then(|idx| values.get(idx))
                    .map(|text| Value::infer(text))
                    .unwrap_or(Value::Null);
                (column.clone(), value)
            })
            .collect();
        target.rows_mut().push(row);

        info!(table = %table, "row inserted");
        Ok(InsertResult { inserted: 1 })
    }

    fn delete_rows(&self, table: &str, filter: &RowFilter) -> TabqlResult<DeleteResult> {
        let mut tables = self.tables.write();
        let target = tables
            .get_mut(table)
            .ok_or_else(|| ProviderError::TableNotFound(table.to_string()))?;

        // evaluate everything first so a failing predicate leaves the table intact
        let mut keep = Vec::with_capacity(target.len());
        for row in target.rows() {
            keep.push(!filter.matches(row)?);
        }

        let before = target.len();
        let mut flags = keep.into_iter();
        target.rows_mut().retain(|_| flags.next().unwrap_or(true));
        let deleted = before - target.len();

        info!(table = %table, deleted, "rows deleted");
        Ok(DeleteResult { deleted })
    }

    fn table_names(&self) -> TabqlResult<Vec<String>> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

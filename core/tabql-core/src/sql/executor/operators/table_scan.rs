//! TableScan Operator: Sequential row batch emission

use crate::error::TabqlResult;
use crate::sql::executor::operators::PhysicalOperator;
use crate::types::Row;

/// Rows per emitted batch
const BATCH_SIZE: usize = 1024;

/// 테이블 스캔 연산자: 스냅샷 row를 순차적으로 반환
pub struct TableScanOperator {
    table: String,
    /// Snapshot fetched from the provider for this query
    rows: Vec<Row>,
    /// Current position in rows
    position: usize,
}

impl TableScanOperator {
    pub fn new(table: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            table: table.into(),
            rows,
            position: 0,
        }
    }

    /// Get the table name this operator scans.
    pub fn table_name(&self) -> &str {
        &self.table
    }
}

impl PhysicalOperator for TableScanOperator {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn next(&mut self) -> TabqlResult<Option<Vec<Row>>> {
        if self.position >= self.rows.len() {
            return Ok(None);
        }

        let end = (self.position + BATCH_SIZE).min(self.rows.len());
        let batch = self.rows[self.position..end].to_vec();
        self.position = end;
        Ok(Some(batch))
    }

    fn reset(&mut self) -> TabqlResult<()> {
        self.position = 0;
        Ok(())
    }
}

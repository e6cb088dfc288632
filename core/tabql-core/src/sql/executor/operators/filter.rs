//! Filter Operator: WHERE clause evaluation

use crate::error::TabqlResult;
use crate::sql::executor::expr::RowFilter;
use crate::sql::executor::operators::PhysicalOperator;
use crate::types::Row;

/// 필터 연산자 (WHERE 조건)
pub struct FilterOperator {
    input: Box<dyn PhysicalOperator>,
    filter: RowFilter,
}

impl FilterOperator {
    pub fn new(input: Box<dyn PhysicalOperator>, filter: RowFilter) -> Self {
        Self { input, filter }
    }
}

impl PhysicalOperator for FilterOperator {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn next(&mut self) -> TabqlResult<Option<Vec<Row>>> {
        loop {
            match self.input.next()? {
                None => return Ok(None),
                Some(batch) => {
                    let mut kept = Vec::with_capacity(batch.len());
                    for row in batch {
                        if self.filter.matches(&row)? {
                            kept.push(row);
                        }
                    }
                    if !kept.is_empty() {
                        return Ok(Some(kept));
                    }
                    // If all rows filtered out, try next batch
                }
            }
        }
    }

    fn reset(&mut self) -> TabqlResult<()> {
        self.input.reset()
    }
}

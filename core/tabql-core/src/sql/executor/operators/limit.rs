//! Limit Operator: LIMIT clause handling

use crate::error::TabqlResult;
use crate::sql::executor::operators::PhysicalOperator;
use crate::types::Row;

/// Limit 연산자 (LIMIT)
pub struct LimitOperator {
    input: Box<dyn PhysicalOperator>,
    count: usize,
    /// Total rows emitted so far
    emitted: usize,
}

impl LimitOperator {
    /// `limit <= 0` emits nothing.
    pub fn new(input: Box<dyn PhysicalOperator>, limit: i64) -> Self {
        Self {
            input,
            count: usize::try_from(limit).unwrap_or(0),
            emitted: 0,
        }
    }
}

impl PhysicalOperator for LimitOperator {
    fn name(&self) -> &'static str {
        "limit"
    }

    fn next(&mut self) -> TabqlResult<Option<Vec<Row>>> {
        // Already reached the limit
        if self.emitted >= self.count {
            return Ok(None);
        }

        match self.input.next()? {
            None => Ok(None),
            Some(mut batch) => {
                let remaining = self.count - self.emitted;
                batch.truncate(remaining);
                self.emitted += batch.len();
                Ok(Some(batch))
            }
        }
    }

    fn reset(&mut self) -> TabqlResult<()> {
        self.emitted = 0;
        self.input.reset()
    }
}

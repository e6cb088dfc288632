//! Distinct Operator: SELECT DISTINCT

use crate::error::TabqlResult;
use crate::sql::executor::operators::PhysicalOperator;
use crate::types::Row;
use ahash::AHashSet;

/// Distinct 연산자: 첫 번째 등장 행만 유지
pub struct DistinctOperator {
    input: Box<dyn PhysicalOperator>,
    /// Value keys of rows already emitted
    seen: AHashSet<String>,
}

impl DistinctOperator {
    pub fn new(input: Box<dyn PhysicalOperator>) -> Self {
        Self {
            input,
            seen: AHashSet::new(),
        }
    }
}

impl PhysicalOperator for DistinctOperator {
    fn name(&self) -> &'static str {
        "distinct"
    }

    fn next(&mut self) -> TabqlResult<Option<Vec<Row>>> {
        loop {
            match self.input.next()? {
                None => return Ok(None),
                Some(batch) => {
                    let kept: Vec<Row> = batch
                        .into_iter()
                        .filter(|row| self.seen.insert(row.value_key()))
                        .collect();
                    if !kept.is_empty() {
                        return Ok(Some(kept));
                    }
                }
            }
        }
    }

    fn reset(&mut self) -> TabqlResult<()> {
        self.seen.clear();
        self.input.reset()
    }
}

/// Drop rows whose value list repeats an earlier row; first occurrence wins.
pub fn distinct(rows: Vec<Row>) -> Vec<Row> {
    let mut seen = AHashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.value_key()))
        .collect()
}

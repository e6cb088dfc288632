//! Physical Operator Trait: Volcano Execution Model

use crate::error::TabqlResult;
use crate::types::Row;
use tracing::debug;

/// 물리 연산자 트레이트: Volcano 실행 모델 (Pull 기반)
pub trait PhysicalOperator: Send {
    /// 연산자 이름 (tracing용)
    fn name(&self) -> &'static str;

    /// 다음 row batch 반환 (None이면 끝)
    fn next(&mut self) -> TabqlResult<Option<Vec<Row>>>;

    /// 연산자 상태 초기화 (재실행용)
    fn reset(&mut self) -> TabqlResult<()>;
}

/// Pull every remaining batch from `op` into one vector.
pub fn collect_rows(op: &mut dyn PhysicalOperator) -> TabqlResult<Vec<Row>> {
    let mut rows = Vec::new();
    while let Some(batch) = op.next()? {
        rows.extend(batch);
    }
    Ok(rows)
}

/// Counts the rows an operator emits and logs the total once it is drained.
pub struct TracedOperator {
    inner: Box<dyn PhysicalOperator>,
    rows: usize,
    finished: bool,
}

impl TracedOperator {
    pub fn new(inner: Box<dyn PhysicalOperator>) -> Self {
        Self {
            inner,
            rows: 0,
            finished: false,
        }
    }
}

impl PhysicalOperator for TracedOperator {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn next(&mut self) -> TabqlResult<Option<Vec<Row>>> {
        match self.inner.next()? {
            Some(batch) => {
                self.rows += batch.len();
                Ok(Some(batch))
            }
            None => {
                if !self.finished {
                    self.finished = true;
                    debug!(target: "tabql::exec", stage = self.inner.name(), rows = self.rows, "stage complete");
                }
                Ok(None)
            }
        }
    }

    fn reset(&mut self) -> TabqlResult<()> {
        self.rows = 0;
        self.finished = false;
        self.inner.reset()
    }
}

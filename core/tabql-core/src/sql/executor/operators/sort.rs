//! Sort Operator: ORDER BY clause handling

use crate::error::{ExecutionError, TabqlResult};
use crate::sql::executor::operators::{PhysicalOperator, collect_rows};
use crate::sql::types::{OrderSpec, SortDirection};
use crate::types::{Row, Value};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Sort 연산자 (ORDER BY): stable multi-key sort
pub struct SortOperator {
    input: Box<dyn PhysicalOperator>,
    order_by: Vec<OrderSpec>,
    nulls_first: bool,
    /// Materialized sorted result (sort requires all data)
    sorted: Option<Vec<Row>>,
    emitted: bool,
}

impl SortOperator {
    pub fn new(input: Box<dyn PhysicalOperator>, order_by: Vec<OrderSpec>, nulls_first: bool) -> Self {
        Self {
            input,
            order_by,
            nulls_first,
            sorted: None,
            emitted: false,
        }
    }
}

impl PhysicalOperator for SortOperator {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn next(&mut self) -> TabqlResult<Option<Vec<Row>>> {
        if self.emitted {
            return Ok(None);
        }
        if self.sorted.is_none() {
            let rows = collect_rows(self.input.as_mut())?;
            self.sorted = Some(sort_rows(rows, &self.order_by, self.nulls_first)?);
        }
        self.emitted = true;
        Ok(self.sorted.take())
    }

    fn reset(&mut self) -> TabqlResult<()> {
        self.sorted = None;
        self.emitted = false;
        self.input.reset()
    }
}

/// Stable sort by `order_by`, first key primary. DESC reverses only its own
/// key. NULLs sort before other values ascending when `nulls_first` is set.
pub fn sort_rows(
    rows: Vec<Row>,
    order_by: &[OrderSpec],
    nulls_first: bool,
) -> Result<Vec<Row>, ExecutionError> {
    if order_by.is_empty() || rows.len() < 2 {
        // still validate the fields on a single row
        if let Some(row) = rows.first() {
            for spec in order_by {
                row.lookup(&spec.field)?;
            }
        }
        return Ok(rows);
    }

    // Extract sort keys once per row
    let mut keyed: Vec<(SmallVec<[Value; 4]>, Row)> = Vec::with_capacity(rows.len());
    for row in rows {
        let key = order_by
            .iter()
            .map(|spec| row.lookup(&spec.field).cloned())
            .collect::<Result<SmallVec<[Value; 4]>, _>>()?;
        keyed.push((key, row));
    }

    // Vec::sort_by is stable
    keyed.sort_by(|(a, _), (b, _)| {
        for (spec, (x, y)) in order_by.iter().zip(a.iter().zip(b.iter())) {
            let ord = x.sort_cmp(y, nulls_first);
            let ord = match spec.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

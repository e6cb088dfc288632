//! SQL Query Executor Module
//!
//! Builds the SELECT operator pipeline:
//!
//! ```text
//! scan [→ join] [→ filter] → ([sort →] project | aggregate [→ sort]) [→ distinct] [→ limit]
//! ```

use crate::engine::config::EngineConfig;
use crate::error::{ExecutionError, TabqlResult};
use crate::sql::types::{JoinSpec, SelectStatement};
use crate::types::{Row, Table};

pub mod expr;
pub mod operators;

pub use expr::{EvalOptions, RowFilter, evaluate, like_match};
pub use operators::{
    DistinctOperator, FilterOperator, HashAggregateOperator, HashJoinOperator, JoinInput,
    LimitOperator, PhysicalOperator, ProjectionOperator, SortOperator, TableScanOperator,
    TracedOperator, aggregate, collect_rows, distinct, sort_rows,
};

/// Join two fetched tables per `spec`. `left` is the FROM table.
pub fn join(left: &Table, right: &Table, spec: &JoinSpec) -> Result<Table, ExecutionError> {
    operators::join_tables(
        &spec.left_key.table,
        left,
        &spec.left_key.column,
        &spec.right_key.table,
        right,
        &spec.right_key.column,
        spec.kind,
    )
}

/// Assemble the operator tree for `stmt` over already-fetched tables.
///
/// `joined` must be present exactly when the statement has a join.
pub fn build_select_plan(
    stmt: &SelectStatement,
    base: Table,
    joined: Option<Table>,
    config: &EngineConfig,
) -> TabqlResult<Box<dyn PhysicalOperator>> {
    fn traced(op: impl PhysicalOperator + 'static) -> Box<dyn PhysicalOperator> {
        Box::new(TracedOperator::new(Box::new(op)))
    }

    let mut plan: Box<dyn PhysicalOperator> = match (&stmt.join, joined) {
        (Some(spec), Some(right)) => {
            let left_columns = base.columns().to_vec();
            let right_columns = right.columns().to_vec();
            let left = JoinInput::new(
                traced(TableScanOperator::new(&stmt.table, base.into_rows())),
                spec.left_key.table.clone(),
                left_columns,
                spec.left_key.column.clone(),
            );
            let right = JoinInput::new(
                traced(TableScanOperator::new(&spec.table, right.into_rows())),
                spec.right_key.table.clone(),
                right_columns,
                spec.right_key.column.clone(),
            );
            traced(HashJoinOperator::new(left, right, spec.kind))
        }
        (None, _) => traced(TableScanOperator::new(&stmt.table, base.into_rows())),
        (Some(spec), None) => {
            return Err(crate::error::ProviderError::TableNotFound(spec.table.clone()).into());
        }
    };

    if let Some(predicate) = &stmt.where_clause {
        let filter = RowFilter::new(Some(predicate.clone()), EvalOptions::from(config));
        plan = traced(FilterOperator::new(plan, filter));
    }

    // ORDER BY resolves against whole source rows unless the aggregate
    // stage has already reshaped them, so keys need not be projected.
    let sort = |input: Box<dyn PhysicalOperator>| -> Box<dyn PhysicalOperator> {
        match &stmt.order_by {
            Some(order_by) => {
                traced(SortOperator::new(input, order_by.clone(), config.nulls_first))
            }
            None => input,
        }
    };

    plan = if stmt.needs_aggregation() {
        sort(traced(HashAggregateOperator::new(
            plan,
            stmt.group_by.clone().unwrap_or_default(),
            stmt.fields.clone(),
        )))
    } else {
        traced(ProjectionOperator::new(sort(plan), &stmt.fields))
    };

    // DISTINCT keeps first occurrences, so sorted order survives it
    if stmt.distinct {
        plan = traced(DistinctOperator::new(plan));
    }

    if let Some(limit) = stmt.limit {
        plan = traced(LimitOperator::new(plan, limit));
    }

    Ok(plan)
}

/// Run a SELECT over fetched tables and collect the result rows.
pub fn execute_select(
    stmt: &SelectStatement,
    base: Table,
    joined: Option<Table>,
    config: &EngineConfig,
) -> TabqlResult<Vec<Row>> {
    let mut plan = build_select_plan(stmt, base, joined, config)?;
    collect_rows(plan.as_mut())
}

//! HashAggregate Operator: GROUP BY and aggregate functions

use crate::error::{ExecutionError, TabqlResult};
use crate::sql::executor::operators::{PhysicalOperator, collect_rows};
use crate::sql::types::{AggregateArg, AggregateExpr, AggregateFunction, SelectField};
use crate::types::{Row, Value};
use ahash::AHashMap;
use std::cmp::Ordering;

/// Hash Aggregate 연산자 (GROUP BY): AHashMap 기반 집계
pub struct HashAggregateOperator {
    input: Box<dyn PhysicalOperator>,
    /// Fields to group by (empty = one implicit group)
    group_by: Vec<String>,
    /// Projected field list
    fields: Vec<SelectField>,
    /// Whether result has been produced
    done: bool,
}

impl HashAggregateOperator {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        group_by: Vec<String>,
        fields: Vec<SelectField>,
    ) -> Self {
        Self {
            input,
            group_by,
            fields,
            done: false,
        }
    }
}

impl PhysicalOperator for HashAggregateOperator {
    fn name(&self) -> &'static str {
        "aggregate"
    }

    fn next(&mut self) -> TabqlResult<Option<Vec<Row>>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;
        let rows = collect_rows(self.input.as_mut())?;
        Ok(Some(aggregate(&rows, &self.group_by, &self.fields)?))
    }

    fn reset(&mut self) -> TabqlResult<()> {
        self.done = false;
        self.input.reset()
    }
}

/// Group `rows` by `group_by` and evaluate the aggregate fields per group.
///
/// Groups come out in order of first appearance. With no group fields every
/// row falls in one group, which is emitted even when `rows` is empty.
/// Non-aggregate fields take the group's first value when they are group
/// fields and are dropped otherwise.
pub fn aggregate(
    rows: &[Row],
    group_by: &[String],
    fields: &[SelectField],
) -> Result<Vec<Row>, ExecutionError> {
    let groups = build_groups(rows, group_by)?;

    let mut output = Vec::with_capacity(groups.len());
    for members in &groups {
        let mut out = Row::with_capacity(fields.len());
        for field in fields {
            match field {
                SelectField::Aggregate(expr) => {
                    out.insert(expr.to_string(), compute_aggregate(expr, members)?);
                }
                SelectField::Column(name) if group_by.contains(name) => {
                    // group_by is non-empty here, so members is too
                    if let Some(first) = members.first() {
                        out.insert(name.clone(), first.lookup(name)?.clone());
                    }
                }
                _ => {}
            }
        }
        output.push(out);
    }
    Ok(output)
}

/// Bucket rows by group key, keeping first-appearance order.
fn build_groups<'a>(
    rows: &'a [Row],
    group_by: &[String],
) -> Result<Vec<Vec<&'a Row>>, ExecutionError> {
    if group_by.is_empty() {
        return Ok(vec![rows.iter().collect()]);
    }

    let mut index: AHashMap<String, usize> = AHashMap::new();
    let mut groups: Vec<Vec<&Row>> = Vec::new();
    for row in rows {
        let mut key = String::new();
        for field in group_by {
            row.lookup(field)?.append_to_key(&mut key);
        }
        match index.get(&key) {
            Some(&slot) => groups[slot].push(row),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![row]);
            }
        }
    }
    Ok(groups)
}

fn compute_aggregate(expr: &AggregateExpr, members: &[&Row]) -> Result<Value, ExecutionError> {
    let column = match &expr.argument {
        AggregateArg::Star if expr.function == AggregateFunction::Count => {
            return Ok(Value::Int64(members.len() as i64));
        }
        AggregateArg::Star => {
            return Err(ExecutionError::TypeMismatch {
                field: expr.to_string(),
                expected: "column".to_string(),
                actual: "*".to_string(),
            });
        }
        AggregateArg::Column(column) => column,
    };

    let mut values = Vec::with_capacity(members.len());
    for row in members {
        let value = row.lookup(column)?;
        if !value.is_null() {
            values.push(value);
        }
    }

    Ok(match expr.function {
        // COUNT(field) counts rows like COUNT(*), once the field resolves
        AggregateFunction::Count => Value::Int64(members.len() as i64),
        AggregateFunction::Sum => sum(expr, &values)?,
        AggregateFunction::Avg => match numeric(expr, &values)? {
            nums if nums.is_empty() => Value::Null,
            nums => Value::Float64(nums.iter().sum::<f64>() / nums.len() as f64),
        },
        AggregateFunction::Min => extremum(&values, Ordering::Less),
        AggregateFunction::Max => extremum(&values, Ordering::Greater),
        AggregateFunction::Median => median(numeric(expr, &values)?),
    })
}

/// SUM: Int64 while every input is integral, Float64 otherwise.
fn sum(expr: &AggregateExpr, values: &[&Value]) -> Result<Value, ExecutionError> {
    if values.is_empty() {
        return Ok(Value::Null);
    }
    let integral = values.iter().all(|v| !matches!(v, Value::Float64(_)) && v.as_i64().is_some());
    if integral {
        let total = values
            .iter()
            .filter_map(|v| v.as_i64())
            .try_fold(0i64, i64::checked_add);
        if let Some(total) = total {
            return Ok(Value::Int64(total));
        }
        // overflowed i64, fall through to float
    }
    Ok(Value::Float64(numeric(expr, values)?.iter().sum()))
}

fn numeric(expr: &AggregateExpr, values: &[&Value]) -> Result<Vec<f64>, ExecutionError> {
    values
        .iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| ExecutionError::TypeMismatch {
                field: expr.to_string(),
                expected: "number".to_string(),
                actual: format!("'{v}'"),
            })
        })
        .collect()
}

/// MIN (`Less`) or MAX (`Greater`) under the type-aware ordering.
fn extremum(values: &[&Value], wanted: Ordering) -> Value {
    let mut best: Option<&Value> = None;
    for &value in values {
        best = match best {
            Some(current) if value.compare(current) != Some(wanted) => Some(current),
            _ => Some(value),
        };
    }
    best.cloned().unwrap_or(Value::Null)
}

fn median(mut nums: Vec<f64>) -> Value {
    if nums.is_empty() {
        return Value::Null;
    }
    nums.sort_by(f64::total_cmp);
    let mid = nums.len() / 2;
    if nums.len() % 2 == 1 {
        Value::Float64(nums[mid])
    } else {
        Value::Float64((nums[mid - 1] + nums[mid]) / 2.0)
    }
}

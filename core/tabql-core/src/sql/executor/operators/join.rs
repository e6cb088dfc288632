//! HashJoin Operator: Hash-based join implementation
//!
//! One routine covers INNER, LEFT and RIGHT joins. The join kind picks the
//! driving side and whether unmatched driving rows are kept (with the other
//! side filled with NULL). The matched side is indexed by key in an
//! `AHashMap`; output keeps the driving side's order and, per driving row,
//! the matched side's order. Output columns are `table.column`, left table
//! first.

use crate::error::{ExecutionError, TabqlResult};
use crate::sql::executor::operators::{PhysicalOperator, collect_rows};
use crate::sql::types::JoinType;
use crate::types::{Row, Table, Value};
use ahash::AHashMap;
use smallvec::SmallVec;

/// One input of a join: where its rows come from and how to qualify them.
pub struct JoinInput {
    pub input: Box<dyn PhysicalOperator>,
    /// Table name used as the column prefix
    pub table: String,
    /// Column list, used for NULL filling when a row has no partner
    pub columns: Vec<String>,
    /// Unqualified key column
    pub key: String,
}

impl JoinInput {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        table: impl Into<String>,
        columns: Vec<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            input,
            table: table.into(),
            columns,
            key: key.into(),
        }
    }
}

/// Hash Join 연산자: build from the matched side, probe with the driving side
pub struct HashJoinOperator {
    left: JoinInput,
    right: JoinInput,
    join_type: JoinType,
    /// Materialized join result
    output: Option<Vec<Row>>,
    emitted: bool,
}

impl HashJoinOperator {
    pub fn new(left: JoinInput, right: JoinInput, join_type: JoinType) -> Self {
        Self {
            left,
            right,
            join_type,
            output: None,
            emitted: false,
        }
    }

    fn materialize(&mut self) -> TabqlResult<Vec<Row>> {
        let left_rows = collect_rows(self.left.input.as_mut())?;
        let right_rows = collect_rows(self.right.input.as_mut())?;

        let left = Side {
            table: &self.left.table,
            columns: &self.left.columns,
            key: &self.left.key,
        };
        let right = Side {
            table: &self.right.table,
            columns: &self.right.columns,
            key: &self.right.key,
        };

        Ok(hash_join(left, &left_rows, right, &right_rows, self.join_type)?)
    }
}

impl PhysicalOperator for HashJoinOperator {
    fn name(&self) -> &'static str {
        "join"
    }

    fn next(&mut self) -> TabqlResult<Option<Vec<Row>>> {
        if self.emitted {
            return Ok(None);
        }
        if self.output.is_none() {
            self.output = Some(self.materialize()?);
        }
        self.emitted = true;
        Ok(self.output.take())
    }

    fn reset(&mut self) -> TabqlResult<()> {
        self.output = None;
        self.emitted = false;
        self.left.input.reset()?;
        self.right.input.reset()
    }
}

/// Borrowed description of one join side.
#[derive(Clone, Copy)]
struct Side<'a> {
    table: &'a str,
    columns: &'a [String],
    key: &'a str,
}

impl Side<'_> {
    fn key_of(&self, row: &Row) -> Result<Option<String>, ExecutionError> {
        match row.lookup(self.key) {
            Ok(value) => Ok(value.join_key()),
            Err(ExecutionError::MissingField(_)) => Err(ExecutionError::MissingField(format!(
                "{}.{}",
                self.table, self.key
            ))),
            Err(e) => Err(e),
        }
    }

    /// Append this side's columns to `out`, qualified; NULLs when `row` is None.
    fn qualify_into(&self, out: &mut Row, row: Option<&Row>) {
        match row {
            Some(row) => {
                for (column, value) in row.iter() {
                    out.insert(format!("{}.{column}", self.table), value.clone());
                }
            }
            None => {
                for column in self.columns {
                    out.insert(format!("{}.{column}", self.table), Value::Null);
                }
            }
        }
    }
}

/// Join two row sets per `join_type`.
fn hash_join(
    left: Side<'_>,
    left_rows: &[Row],
    right: Side<'_>,
    right_rows: &[Row],
    join_type: JoinType,
) -> Result<Vec<Row>, ExecutionError> {
    // (driving side, matched side, driving side is left, keep unmatched)
    let (driving, driving_rows, matched, matched_rows, driving_is_left, keep_unmatched) =
        match join_type {
            JoinType::Inner => (left, left_rows, right, right_rows, true, false),
            JoinType::Left => (left, left_rows, right, right_rows, true, true),
            JoinType::Right => (right, right_rows, left, left_rows, false, true),
        };

    // Build phase: key → matched row indices in original order
    let mut build_table: AHashMap<String, SmallVec<[usize; 4]>> =
        AHashMap::with_capacity(matched_rows.len());
    for (idx, row) in matched_rows.iter().enumerate() {
        if let Some(key) = matched.key_of(row)? {
            build_table.entry(key).or_default().push(idx);
        }
    }

    let width = left.columns.len() + right.columns.len();
    let merge = |driving_row: &Row, matched_row: Option<&Row>| {
        let mut out = Row::with_capacity(width);
        if driving_is_left {
            driving.qualify_into(&mut out, Some(driving_row));
            matched.qualify_into(&mut out, matched_row);
        } else {
            matched.qualify_into(&mut out, matched_row);
            driving.qualify_into(&mut out, Some(driving_row));
        }
        out
    };

    // Probe phase
    let mut output = Vec::with_capacity(driving_rows.len());
    for row in driving_rows {
        let matches = driving
            .key_of(row)?
            .and_then(|key| build_table.get(&key));
        match matches {
            Some(indices) => {
                for &idx in indices {
                    output.push(merge(row, Some(&matched_rows[idx])));
                }
            }
            None if keep_unmatched => output.push(merge(row, None)),
            None => {}
        }
    }

    Ok(output)
}

/// Join two fetched tables. `left_key`/`right_key` are unqualified columns.
pub fn join_tables(
    left_name: &str,
    left: &Table,
    left_key: &str,
    right_name: &str,
    right: &Table,
    right_key: &str,
    join_type: JoinType,
) -> Result<Table, ExecutionError> {
    let l = Side {
        table: left_name,
        columns: left.columns(),
        key: left_key,
    };
    let r = Side {
        table: right_name,
        columns: right.columns(),
        key: right_key,
    };
    let rows = hash_join(l, left.rows(), r, right.rows(), join_type)?;

    let columns = left
        .columns()
        .iter()
        .map(|c| format!("{left_name}.{c}"))
        .chain(right.columns().iter().map(|c| format!("{right_name}.{c}")))
        .collect();
    Ok(Table::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use crate::sql::executor::operators::TableScanOperator;

    fn users() -> Table {
        Table::from_rows(vec![
            row! { "id" => 1, "name" => "Alice" },
            row! { "id" => 2, "name" => "Bob" },
            row! { "id" => 3, "name" => "Carol" },
        ])
    }

    fn orders() -> Table {
        Table::from_rows(vec![
            row! { "id" => 10, "user_id" => 1, "total" => 5.0 },
            row! { "id" => 11, "user_id" => 1, "total" => 7.5 },
            row! { "id" => 12, "user_id" => 3, "total" => 2.0 },
            row! { "id" => 13, "user_id" => 9, "total" => 1.0 },
        ])
    }

    fn join(kind: JoinType) -> Table {
        join_tables("users", &users(), "id", "orders", &orders(), "user_id", kind).unwrap()
    }

    fn names(table: &Table) -> Vec<Value> {
        table
            .rows()
            .iter()
            .map(|r| r.get("users.name").cloned().unwrap_or(Value::Null))
            .collect()
    }

    #[test]
    fn test_inner_join() {
        let t = join(JoinType::Inner);
        assert_eq!(t.len(), 3);
        assert_eq!(
            names(&t),
            vec![Value::from("Alice"), Value::from("Alice"), Value::from("Carol")]
        );
        // matched side order preserved
        assert_eq!(t.rows()[0].get("orders.id"), Some(&Value::Int64(10)));
        assert_eq!(t.rows()[1].get("orders.id"), Some(&Value::Int64(11)));
        // qualified, left columns first
        assert_eq!(
            t.rows()[0].columns().collect::<Vec<_>>(),
            vec!["users.id", "users.name", "orders.id", "orders.user_id", "orders.total"]
        );
    }

    #[test]
    fn test_left_join_fills_nulls() {
        let t = join(JoinType::Left);
        assert_eq!(t.len(), 4);
        let bob = &t.rows()[2];
        assert_eq!(bob.get("users.name"), Some(&Value::from("Bob")));
        assert_eq!(bob.get("orders.id"), Some(&Value::Null));
        assert_eq!(bob.get("orders.total"), Some(&Value::Null));
    }

    #[test]
    fn test_right_join_driven_by_right() {
        let t = join(JoinType::Right);
        assert_eq!(t.len(), 4);
        let orphan = &t.rows()[3];
        assert_eq!(orphan.get("orders.id"), Some(&Value::Int64(13)));
        assert_eq!(orphan.get("users.id"), Some(&Value::Null));
        assert_eq!(orphan.get("users.name"), Some(&Value::Null));
        // left columns still come first
        assert_eq!(orphan.columns().next(), Some("users.id"));
    }

    #[test]
    fn test_null_keys_never_match() {
        let left = Table::from_rows(vec![row! { "k" => Value::Null, "v" => 1 }]);
        let right = Table::from_rows(vec![row! { "k" => Value::Null, "w" => 2 }]);
        let t = join_tables("a", &left, "k", "b", &right, "k", JoinType::Inner).unwrap();
        assert!(t.is_empty());
        let t = join_tables("a", &left, "k", "b", &right, "k", JoinType::Left).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.rows()[0].get("b.w"), Some(&Value::Null));
    }

    #[test]
    fn test_numeric_keys_match_across_types() {
        let left = Table::from_rows(vec![row! { "k" => 1 }]);
        let right = Table::from_rows(vec![row! { "k" => "1" }]);
        let t = join_tables("a", &left, "k", "b", &right, "k", JoinType::Inner).unwrap();
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_missing_key_column() {
        let err =
            join_tables("users", &users(), "uid", "orders", &orders(), "user_id", JoinType::Inner)
                .unwrap_err();
        assert_eq!(err, ExecutionError::MissingField("users.uid".to_string()));
    }

    #[test]
    fn test_join_operator_pulls_inputs() {
        let left = JoinInput::new(
            Box::new(TableScanOperator::new("users", users().into_rows())),
            "users",
            users().columns().to_vec(),
            "id",
        );
        let right = JoinInput::new(
            Box::new(TableScanOperator::new("orders", orders().into_rows())),
            "orders",
            orders().columns().to_vec(),
            "user_id",
        );
        let mut op = HashJoinOperator::new(left, right, JoinType::Left);
        let rows = collect_rows(&mut op).unwrap();
        assert_eq!(rows.len(), 4);

        op.reset().unwrap();
        assert_eq!(collect_rows(&mut op).unwrap().len(), 4);
    }
}

//! Projection Operator: SELECT column selection

use crate::error::{ExecutionError, TabqlResult};
use crate::sql::executor::operators::PhysicalOperator;
use crate::sql::types::SelectField;
use crate::types::Row;

/// Projection 연산자 (SELECT 컬럼 선택)
pub struct ProjectionOperator {
    input: Box<dyn PhysicalOperator>,
    /// Output columns; `None` for `SELECT *`
    columns: Option<Vec<String>>,
}

impl ProjectionOperator {
    pub fn new(input: Box<dyn PhysicalOperator>, fields: &[SelectField]) -> Self {
        let columns = if fields.iter().any(|f| matches!(f, SelectField::Wildcard)) {
            None
        } else {
            Some(fields.iter().map(SelectField::name).collect())
        };
        Self { input, columns }
    }
}

impl PhysicalOperator for ProjectionOperator {
    fn name(&self) -> &'static str {
        "project"
    }

    fn next(&mut self) -> TabqlResult<Option<Vec<Row>>> {
        match self.input.next()? {
            None => Ok(None),
            Some(batch) => match &self.columns {
                // SELECT *: pass through all columns
                None => Ok(Some(batch)),
                Some(columns) => Ok(Some(
                    batch
                        .iter()
                        .map(|row| project(row, columns))
                        .collect::<Result<_, _>>()?,
                )),
            },
        }
    }

    fn reset(&mut self) -> TabqlResult<()> {
        self.input.reset()
    }
}

/// Build a row holding only `columns`, in that order, named as written.
pub fn project(row: &Row, columns: &[String]) -> Result<Row, ExecutionError> {
    let mut out = Row::with_capacity(columns.len());
    for column in columns {
        out.insert(column.clone(), row.lookup(column)?.clone());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use crate::sql::executor::operators::{TableScanOperator, collect_rows};
    use crate::types::Value;

    #[test]
    fn test_project_selects_and_orders() {
        let scan = TableScanOperator::new("t", vec![row! { "id" => 1, "name" => "A", "age" => 30 }]);
        let fields = [
            SelectField::Column("age".into()),
            SelectField::Column("name".into()),
        ];
        let mut op = ProjectionOperator::new(Box::new(scan), &fields);
        let rows = collect_rows(&mut op).unwrap();
        assert_eq!(rows, vec![row! { "age" => 30, "name" => "A" }]);
    }

    #[test]
    fn test_project_wildcard_passes_through() {
        let input = vec![row! { "id" => 1, "name" => "A" }];
        let scan = TableScanOperator::new("t", input.clone());
        let mut op = ProjectionOperator::new(Box::new(scan), &[SelectField::Wildcard]);
        assert_eq!(collect_rows(&mut op).unwrap(), input);
    }

    #[test]
    fn test_project_qualified_keeps_written_name() {
        let joined = row! { "users.name" => "A", "orders.total" => 2.5 };
        let out = project(&joined, &["name".to_string(), "orders.total".to_string()]).unwrap();
        assert_eq!(out.get("name"), Some(&Value::from("A")));
        assert_eq!(out.get("orders.total"), Some(&Value::Float64(2.5)));
    }

    #[test]
    fn test_project_missing_field() {
        let err = project(&row! { "id" => 1 }, &["email".to_string()]).unwrap_err();
        assert_eq!(err, ExecutionError::MissingField("email".to_string()));
    }
}

//! Parsed statement types.
//!
//! A statement is built once per query and is immutable afterwards.

use crate::types::Value;
use std::fmt;

/// Parsed query.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Delete(DeleteStatement),
}

impl Statement {
    /// Statement kind as written in SQL.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Select(_) => "SELECT",
            Statement::Insert(_) => "INSERT",
            Statement::Delete(_) => "DELETE",
        }
    }

    /// Table the statement reads from or writes to.
    pub fn table(&self) -> &str {
        match self {
            Statement::Select(s) => &s.table,
            Statement::Insert(s) => &s.table,
            Statement::Delete(s) => &s.table,
        }
    }
}

/// SELECT [DISTINCT] ... FROM ... [JOIN] [WHERE] [GROUP BY] [ORDER BY] [LIMIT]
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub fields: Vec<SelectField>,
    pub table: String,
    pub where_clause: Option<Predicate>,
    pub join: Option<JoinSpec>,
    pub group_by: Option<Vec<String>>,
    /// Aggregate in the field list with no GROUP BY: one implicit group.
    pub has_aggregate_without_group_by: bool,
    pub order_by: Option<Vec<OrderSpec>>,
    pub limit: Option<i64>,
    pub distinct: bool,
}

impl SelectStatement {
    pub fn has_aggregate(&self) -> bool {
        self.fields.iter().any(SelectField::is_aggregate)
    }

    /// Whether the aggregation stage runs for this statement.
    pub fn needs_aggregation(&self) -> bool {
        self.group_by.is_some() || self.has_aggregate_without_group_by
    }
}

/// INSERT INTO table (columns) VALUES (values)
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    /// Quote-stripped literal text; typing is left to the provider.
    pub values: Vec<String>,
}

/// DELETE FROM table [WHERE]
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub where_clause: Option<Predicate>,
}

/// One entry of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectField {
    /// `*`
    Wildcard,
    /// Column reference, optionally `table.column`
    Column(String),
    /// `FUNC(arg)`
    Aggregate(AggregateExpr),
}

impl SelectField {
    pub fn is_aggregate(&self) -> bool {
        matches!(self, SelectField::Aggregate(_))
    }

    /// Output column name for this field.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SelectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectField::Wildcard => write!(f, "*"),
            SelectField::Column(name) => write!(f, "{name}"),
            SelectField::Aggregate(agg) => write!(f, "{agg}"),
        }
    }
}

/// 집계 표현식
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpr {
    pub function: AggregateFunction,
    pub argument: AggregateArg,
}

impl fmt::Display for AggregateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function, self.argument)
    }
}

/// 집계 함수
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Median,
}

impl AggregateFunction {
    /// Case-insensitive lookup by SQL name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "COUNT" => Some(AggregateFunction::Count),
            "SUM" => Some(AggregateFunction::Sum),
            "AVG" => Some(AggregateFunction::Avg),
            "MIN" => Some(AggregateFunction::Min),
            "MAX" => Some(AggregateFunction::Max),
            "MEDIAN" => Some(AggregateFunction::Median),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Median => "MEDIAN",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate argument: `*` or a column.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateArg {
    Star,
    Column(String),
}

impl fmt::Display for AggregateArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateArg::Star => write!(f, "*"),
            AggregateArg::Column(name) => write!(f, "{name}"),
        }
    }
}

/// Comparison operator of a WHERE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    Like,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::NotEq => "!=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::GtEq => ">=",
            ComparisonOperator::LtEq => "<=",
            ComparisonOperator::Like => "LIKE",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single comparison: `field op value`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub field: String,
    pub operator: ComparisonOperator,
    pub value: Value,
}

/// WHERE expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare(WhereClause),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Predicate::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Predicate, right: Predicate) -> Self {
        Predicate::Or(Box::new(left), Box::new(right))
    }

    /// Leaf comparisons in written order.
    pub fn comparisons(&self) -> Vec<&WhereClause> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out);
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a WhereClause>) {
        match self {
            Predicate::Compare(clause) => out.push(clause),
            Predicate::And(left, right) | Predicate::Or(left, right) => {
                left.collect_comparisons(out);
                right.collect_comparisons(out);
            }
        }
    }
}

/// JOIN 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
        })
    }
}

/// `table.column` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// `<kind> JOIN table ON left_key = right_key`
///
/// `left_key` always refers to the FROM table, `right_key` to `table`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub kind: JoinType,
    pub table: String,
    pub left_key: ColumnRef,
    pub right_key: ColumnRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// 정렬 표현식
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    pub field: String,
    pub direction: SortDirection,
}

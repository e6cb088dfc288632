// SQL 모듈 진입점
pub mod executor;
pub mod parser;
pub mod types;

pub use executor::{EvalOptions, PhysicalOperator, RowFilter, build_select_plan, execute_select};
pub use parser::{SqlParser, parse_delete, parse_insert, parse_select, parse_statement};
pub use types::{
    AggregateArg, AggregateExpr, AggregateFunction, ColumnRef, ComparisonOperator,
    DeleteStatement, InsertStatement, JoinSpec, JoinType, OrderSpec, Predicate, SelectField,
    SelectStatement, SortDirection, Statement, WhereClause,
};

//! Query Engine Module
//!
//! [`QueryEngine`] sequences a parsed statement against a [`TableProvider`]:
//! SELECT runs the operator pipeline over fetched snapshots, INSERT and
//! DELETE are validated and handed to the provider.

pub mod config;

pub use config::{EngineConfig, WhereMode};

use crate::api::FromRow;
use crate::error::{ExecutionError, ParseError, TabqlResult};
use crate::provider::{DeleteResult, InsertResult, TableProvider};
use crate::sql::executor::{EvalOptions, RowFilter, execute_select};
use crate::sql::parser::SqlParser;
use crate::sql::types::{DeleteStatement, InsertStatement, SelectStatement, Statement};
use crate::types::Row;
use serde::Serialize;
use tracing::{debug, instrument};

/// Outcome of one statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryResult {
    /// SELECT result rows
    Rows(Vec<Row>),
    /// INSERT outcome, as reported by the provider
    Inserted(InsertResult),
    /// DELETE outcome, as reported by the provider
    Deleted(DeleteResult),
}

impl QueryResult {
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            QueryResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            QueryResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Rows touched by INSERT/DELETE.
    pub fn affected(&self) -> Option<usize> {
        match self {
            QueryResult::Rows(_) => None,
            QueryResult::Inserted(r) => Some(r.inserted),
            QueryResult::Deleted(r) => Some(r.deleted),
        }
    }
}

/// 쿼리 엔진
pub struct QueryEngine<P: TableProvider> {
    provider: P,
    config: EngineConfig,
    parser: SqlParser,
}

impl<P: TableProvider> QueryEngine<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: EngineConfig::default(),
            parser: SqlParser::new(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse and run one statement.
    ///
    /// # Example
    /// ```rust
    /// use tabql_core::{MemoryProvider, QueryEngine, row};
    ///
    /// # fn main() -> tabql_core::TabqlResult<()> {
    /// let provider = MemoryProvider::new();
    /// provider.register_rows("users", vec![row! { "id" => 1, "name" => "A" }]);
    ///
    /// let engine = QueryEngine::new(provider);
    /// let rows = engine.query("SELECT name FROM users WHERE id = 1")?;
    /// assert_eq!(rows, vec![row! { "name" => "A" }]);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self))]
    pub fn execute(&self, sql: &str) -> TabqlResult<QueryResult> {
        let stmt = self.parser.parse(sql)?;
        debug!(kind = stmt.kind(), table = stmt.table(), "statement parsed");
        self.execute_statement(&stmt)
    }

    /// Run an already-parsed statement.
    pub fn execute_statement(&self, stmt: &Statement) -> TabqlResult<QueryResult> {
        match stmt {
            Statement::Select(select) => self.run_select(select).map(QueryResult::Rows),
            Statement::Insert(insert) => self.run_insert(insert).map(QueryResult::Inserted),
            Statement::Delete(delete) => self.run_delete(delete).map(QueryResult::Deleted),
        }
    }

    /// Run a SELECT and return its rows.
    pub fn query(&self, sql: &str) -> TabqlResult<Vec<Row>> {
        match self.execute(sql)? {
            QueryResult::Rows(rows) => Ok(rows),
            QueryResult::Inserted(_) => {
                Err(ExecutionError::UnsupportedQueryType("INSERT".to_string()).into())
            }
            QueryResult::Deleted(_) => {
                Err(ExecutionError::UnsupportedQueryType("DELETE".to_string()).into())
            }
        }
    }

    /// Run a SELECT and decode each row into `T`.
    pub fn query_as<T: FromRow>(&self, sql: &str) -> TabqlResult<Vec<T>> {
        self.query(sql)?.iter().map(T::from_row).collect()
    }

    fn run_select(&self, stmt: &SelectStatement) -> TabqlResult<Vec<Row>> {
        let base = self.provider.fetch_table(&stmt.table)?;
        let joined = match &stmt.join {
            Some(spec) => Some(self.provider.fetch_table(&spec.table)?),
            None => None,
        };
        debug!(table = %stmt.table, rows = base.len(), "table fetched");

        let rows = execute_select(stmt, base, joined, &self.config)?;
        debug!(rows = rows.len(), "select complete");
        Ok(rows)
    }

    fn run_insert(&self, stmt: &InsertStatement) -> TabqlResult<InsertResult> {
        if stmt.table.is_empty() {
            return Err(ParseError::invalid("INSERT", "missing table name").into());
        }
        if stmt.columns.is_empty() {
            return Err(ParseError::invalid(&stmt.table, "INSERT requires a column list").into());
        }
        if stmt.columns.len() != stmt.values.len() {
            return Err(ParseError::invalid(
                stmt.columns.join(", "),
                format!(
                    "{} columns but {} values",
                    stmt.columns.len(),
                    stmt.values.len()
                ),
            )
            .into());
        }

        self.provider
            .insert_row(&stmt.table, &stmt.columns, &stmt.values)
    }

    fn run_delete(&self, stmt: &DeleteStatement) -> TabqlResult<DeleteResult> {
        if stmt.table.is_empty() {
            return Err(ParseError::invalid("DELETE", "missing table name").into());
        }
        let filter = RowFilter::new(stmt.where_clause.clone(), EvalOptions::from(&self.config));
        self.provider.delete_rows(&stmt.table, &filter)
    }
}

//! Error types for the tabql query engine.
//!
//! All public APIs return `TabqlResult<T>`; no panics in library code.
//! Errors abort the current statement and are never retried internally.

use thiserror::Error;

/// Query text that does not match the SELECT/INSERT/DELETE grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Malformed statement, clause, join or predicate
    #[error("invalid syntax: {reason} (near `{fragment}`)")]
    InvalidSyntax { fragment: String, reason: String },
}

impl ParseError {
    pub(crate) fn invalid(fragment: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::InvalidSyntax {
            fragment: fragment.into(),
            reason: reason.into(),
        }
    }
}

/// Failures while evaluating a well-formed statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Comparison operator outside `=, !=, >, <, >=, <=, LIKE`
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Join kind other than INNER/LEFT/RIGHT
    #[error("unsupported join type: {0}")]
    UnsupportedJoinType(String),

    /// Statement kind other than SELECT/INSERT/DELETE
    #[error("unsupported query type: {0}")]
    UnsupportedQueryType(String),

    /// Referenced field is absent from the row
    #[error("field '{0}' does not exist")]
    MissingField(String),

    /// Unqualified field matches more than one qualified column
    #[error("field '{field}' is ambiguous, candidates: {candidates}")]
    AmbiguousField { field: String, candidates: String },

    /// Value cannot be used where a specific type is required
    #[error("type mismatch on '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },
}

/// Failures reported by a [`TableProvider`](crate::provider::TableProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Requested table does not exist
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Table name cannot be mapped onto the provider's storage
    #[error("invalid table name '{0}'")]
    InvalidTableName(String),

    /// Insert names a column the table does not have
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Apache Arrow error (CSV read/write, RecordBatch conversion)
    #[error("arrow error: {source}")]
    Arrow {
        #[from]
        source: arrow::error::ArrowError,
    },
}

/// Unified error type for all tabql operations.
#[derive(Debug, Error)]
pub enum TabqlError {
    #[error("query parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error("query execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Surfaced unmodified from the table provider
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Configuration could not be loaded or saved
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for all tabql operations.
pub type TabqlResult<T> = Result<T, TabqlError>;

impl From<std::io::Error> for TabqlError {
    fn from(err: std::io::Error) -> Self {
        TabqlError::Provider(ProviderError::from(err))
    }
}

impl From<arrow::error::ArrowError> for TabqlError {
    fn from(err: arrow::error::ArrowError) -> Self {
        TabqlError::Provider(ProviderError::from(err))
    }
}

impl From<serde_json::Error> for TabqlError {
    fn from(err: serde_json::Error) -> Self {
        TabqlError::Config(err.to_string())
    }
}

//! # tabql: Embedded SQL-like Query Engine
//!
//! tabql은 평면 테이블 위에서 SELECT/INSERT/DELETE 문을 해석하는 임베디드 쿼리 엔진입니다.
//! 테이블 저장소는 [`TableProvider`] 트레이트 뒤에 숨겨져 있으며, 인메모리와 CSV 디렉터리
//! 구현이 함께 제공됩니다.
//!
//! ## 주요 특징
//!
//! - **SQL 부분집합**: SELECT, WHERE (AND/OR/괄호), JOIN, GROUP BY, ORDER BY, LIMIT, DISTINCT
//! - **집계 함수**: COUNT, SUM, AVG, MIN, MAX, MEDIAN
//! - **타입 인식 값**: NULL / Int64 / Float64 / Utf8
//! - **Apache Arrow 경계**: RecordBatch 변환 및 CSV 스키마 추론
//!
//! ## 빠른 시작
//!
//! ```rust
//! use tabql_core::{MemoryProvider, QueryEngine, QueryResult, row};
//!
//! # fn main() -> tabql_core::TabqlResult<()> {
//! let provider = MemoryProvider::new();
//! provider.register_rows(
//!     "users",
//!     vec![
//!         row! { "id" => 1, "name" => "Alice", "age" => 30 },
//!         row! { "id" => 2, "name" => "Bob", "age" => 25 },
//!     ],
//! );
//!
//! let engine = QueryEngine::new(provider);
//!
//! // 조회
//! let rows = engine.query("SELECT name FROM users WHERE age > 26")?;
//! assert_eq!(rows, vec![row! { "name" => "Alice" }]);
//!
//! // 삽입
//! let result = engine.execute("INSERT INTO users (id, name, age) VALUES (3, 'Carol', 41)")?;
//! assert_eq!(result.affected(), Some(1));
//!
//! // 삭제
//! let result = engine.execute("DELETE FROM users WHERE age < 28")?;
//! assert!(matches!(result, QueryResult::Deleted(_)));
//! # Ok(())
//! # }
//! ```
//!
//! ## SQL 실행 파이프라인
//!
//! ```text
//! SQL 문자열 → Tokenizer → Parser → Statement
//!          → scan [→ join] [→ filter] → ([sort →] project | aggregate [→ sort])
//!          [→ distinct] [→ limit] → Vec<Row>
//! ```
//!
//! ## 모듈 구조
//!
//! - [`engine`]: 쿼리 엔진 ([`QueryEngine`]) 및 설정
//! - [`sql`]: SQL 파서, 실행기, 물리 연산자
//! - [`provider`]: 테이블 저장소 ([`MemoryProvider`], [`CsvProvider`])
//! - [`types`]: 값 모델 ([`Value`], [`Row`], [`Table`])
//! - [`api`]: 타입 지정 행 디코딩 ([`FromRow`], [`FromValue`])
//! - [`logging`]: tracing 초기화

extern crate self as tabql_core;

pub mod api;
pub mod engine;
pub mod error;
pub mod provider;
pub mod sql;
pub mod types;

// Logging utilities
pub mod logging;

// Re-export commonly used types
pub use api::{FromRow, FromValue};
pub use engine::{EngineConfig, QueryEngine, QueryResult, WhereMode};
pub use error::{ExecutionError, ParseError, ProviderError, TabqlError, TabqlResult};
pub use provider::{CsvProvider, DeleteResult, InsertResult, MemoryProvider, TableProvider};
pub use sql::{Statement, parse_delete, parse_insert, parse_select, parse_statement};
pub use types::{Row, Table, Value};

// Re-export derive macros
pub use tabql_derive::FromRow;

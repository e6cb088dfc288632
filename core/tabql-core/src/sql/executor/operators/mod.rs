//! Physical Operators Module

mod distinct;
mod filter;
mod hash_aggregate;
mod join;
mod limit;
mod physical_operator;
mod projection;
mod sort;
mod table_scan;

pub use distinct::{DistinctOperator, distinct};
pub use filter::FilterOperator;
pub use hash_aggregate::{HashAggregateOperator, aggregate};
pub use join::{HashJoinOperator, JoinInput, join_tables};
pub use limit::LimitOperator;
pub use physical_operator::{PhysicalOperator, TracedOperator, collect_rows};
pub use projection::{ProjectionOperator, project};
pub use sort::{SortOperator, sort_rows};
pub use table_scan::TableScanOperator;

//! API 모듈: typed row decoding
//!
//! FromRow, FromValue 트레이트 제공

pub mod traits;

pub use traits::{FromRow, FromValue};

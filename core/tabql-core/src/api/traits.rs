//! API 트레이트 정의

use crate::error::{ExecutionError, TabqlResult};
use crate::types::{Row, Value};

/// Row에서 구조체로 변환하는 트레이트
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> TabqlResult<Self>;
}

/// Value에서 Rust 타입으로 변환하는 트레이트
pub trait FromValue: Sized {
    /// `field` names the column in error messages.
    fn from_value(value: &Value, field: &str) -> TabqlResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> TabqlResult<Self> {
        Ok(row.clone())
    }
}

fn mismatch(field: &str, expected: &str, value: &Value) -> crate::error::TabqlError {
    ExecutionError::TypeMismatch {
        field: field.to_string(),
        expected: expected.to_string(),
        actual: match value {
            Value::Null => "NULL".to_string(),
            other => format!("{} '{other}'", other.type_name()),
        },
    }
    .into()
}

// 기본 타입 구현
impl FromValue for Value {
    fn from_value(value: &Value, _field: &str) -> TabqlResult<Self> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value, field: &str) -> TabqlResult<Self> {
        match value {
            Value::Int64(i) => Ok(*i),
            Value::Float64(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
            Value::Utf8(_) => value.as_i64().ok_or_else(|| mismatch(field, "i64", value)),
            _ => Err(mismatch(field, "i64", value)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value, field: &str) -> TabqlResult<Self> {
        let wide = i64::from_value(value, field)?;
        i32::try_from(wide).map_err(|_| mismatch(field, "i32", value))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value, field: &str) -> TabqlResult<Self> {
        value.as_f64().ok_or_else(|| mismatch(field, "f64", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value, field: &str) -> TabqlResult<Self> {
        match value {
            Value::Null => Err(mismatch(field, "String", value)),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value, field: &str) -> TabqlResult<Self> {
        match value {
            Value::Int64(0) => Ok(false),
            Value::Int64(1) => Ok(true),
            Value::Utf8(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::Utf8(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(mismatch(field, "bool", value)),
        }
    }
}

// Option<T> 구현
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, field: &str) -> TabqlResult<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(T::from_value(value, field)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TabqlError;

    #[test]
    fn test_integer_conversions() {
        assert_eq!(i64::from_value(&Value::Int64(5), "x").unwrap(), 5);
        assert_eq!(i64::from_value(&Value::Float64(2.0), "x").unwrap(), 2);
        assert_eq!(i64::from_value(&Value::from("7"), "x").unwrap(), 7);
        assert!(i64::from_value(&Value::Float64(2.5), "x").is_err());
        assert!(i32::from_value(&Value::Int64(i64::MAX), "x").is_err());
    }

    #[test]
    fn test_text_and_float() {
        assert_eq!(String::from_value(&Value::Int64(5), "x").unwrap(), "5");
        assert_eq!(f64::from_value(&Value::Int64(5), "x").unwrap(), 5.0);
        assert!(String::from_value(&Value::Null, "x").is_err());
    }

    #[test]
    fn test_bool() {
        assert!(bool::from_value(&Value::from("TRUE"), "x").unwrap());
        assert!(!bool::from_value(&Value::Int64(0), "x").unwrap());
        assert!(bool::from_value(&Value::Int64(7), "x").is_err());
    }

    #[test]
    fn test_option_null() {
        assert_eq!(Option::<i64>::from_value(&Value::Null, "x").unwrap(), None);
        assert_eq!(Option::<i64>::from_value(&Value::Int64(1), "x").unwrap(), Some(1));
    }

    #[test]
    fn test_mismatch_error_names_field() {
        let err = i64::from_value(&Value::from("abc"), "age").unwrap_err();
        match err {
            TabqlError::Execution(ExecutionError::TypeMismatch { field, actual, .. }) => {
                assert_eq!(field, "age");
                assert_eq!(actual, "text 'abc'");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

//! Scalar values stored in table rows.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Separator placed between values in composite group/distinct keys.
/// U+001F (unit separator) does not occur in ordinary field text.
pub(crate) const KEY_SEPARATOR: char = '\u{1f}';

/// Marker used for NULL inside composite keys.
const NULL_MARKER: char = '\u{0}';

/// Bounds of the `f64` range that converts to `i64` without saturating.
const I64_MIN_F64: f64 = -9_223_372_036_854_775_808.0;
const I64_MAX_F64: f64 = 9_223_372_036_854_775_808.0;

/// A scalar value held in a row cell.
///
/// The tag is decided by the table provider when the data is loaded, so
/// comparison, sort and aggregate code dispatch on it instead of guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int64(i64),
    Float64(f64),
    Utf8(String),
}

impl Value {
    /// Type a raw text cell: empty → NULL, then integer, float, text.
    pub fn infer(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int64(i);
        }
        if let Ok(f) = trimmed.parse::<f64>()
            && f.is_finite()
        {
            return Value::Float64(f);
        }
        Value::Utf8(text.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric reading of the value. Text counts when it parses as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Int64(i) => Some(*i as f64),
            Value::Float64(f) => Some(*f),
            Value::Utf8(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }

    /// Integer reading of the value, if it has one without loss.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            Value::Utf8(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Short name of the value's tag, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int64(_) => "integer",
            Value::Float64(_) => "float",
            Value::Utf8(_) => "text",
        }
    }

    /// Type-aware comparison of two non-null values.
    ///
    /// Numeric when both sides read as numbers, lexicographic on the text
    /// rendering otherwise. `None` when either side is NULL.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        // integers compare exactly; f64 loses precision above 2^53
        if let (Some(a), Some(b)) = (self.as_i64(), other.as_i64()) {
            return Some(a.cmp(&b));
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => Some(a.partial_cmp(&b).unwrap_or(Ordering::Equal)),
            _ => Some(self.to_string().cmp(&other.to_string())),
        }
    }

    /// Total ordering for sorting: NULLs placed according to `nulls_first`.
    pub fn sort_cmp(&self, other: &Value, nulls_first: bool) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => {
                if nulls_first {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (false, true) => {
                if nulls_first {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }

    /// Canonical key text for hash joins. NULL has no key and never matches.
    ///
    /// Values that read as numbers are normalized, so `1`, `1.0` and `"1"`
    /// share a key, matching `=` semantics. Integers keep their exact digits.
    pub fn join_key(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        if let Some(i) = self.as_i64() {
            return Some(i.to_string());
        }
        Some(match self.as_f64() {
            Some(f) if f.fract() == 0.0 && (I64_MIN_F64..I64_MAX_F64).contains(&f) => {
                (f as i64).to_string()
            }
            Some(f) => format!("{f}"),
            None => self.to_string(),
        })
    }

    /// Append this value to a composite key (group by, distinct).
    pub(crate) fn append_to_key(&self, key: &mut String) {
        match self {
            Value::Null => key.push(NULL_MARKER),
            Value::Int64(i) => {
                key.push('i');
                key.push_str(&i.to_string());
            }
            Value::Float64(f) => {
                key.push('f');
                key.push_str(&f.to_string());
            }
            Value::Utf8(s) => {
                key.push('s');
                key.push_str(s);
            }
        }
        key.push(KEY_SEPARATOR);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

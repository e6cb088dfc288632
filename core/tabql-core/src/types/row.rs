//! Rows and tables.

use crate::error::ExecutionError;
use crate::types::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One record: an ordered mapping from column name to value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set a column, replacing the value in place if the column exists.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Exact-name lookup.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Resolve a field reference against this row.
    ///
    /// Exact match first. An unqualified name then matches a unique
    /// `table.name` column; a qualified `table.name` falls back to `name`.
    pub fn lookup(&self, field: &str) -> Result<&Value, ExecutionError> {
        if let Some(value) = self.get(field) {
            return Ok(value);
        }
        match field.split_once('.') {
            Some((_, column)) => self
                .get(column)
                .ok_or_else(|| ExecutionError::MissingField(field.to_string())),
            None => {
                let mut candidates = self.fields.iter().filter(|(name, _)| {
                    name.rsplit_once('.')
                        .is_some_and(|(_, column)| column == field)
                });
                match (candidates.next(), candidates.next()) {
                    (Some((_, value)), None) => Ok(value),
                    (Some((first, _)), Some((second, _))) => {
                        Err(ExecutionError::AmbiguousField {
                            field: field.to_string(),
                            candidates: format!("{first}, {second}"),
                        })
                    }
                    _ => Err(ExecutionError::MissingField(field.to_string())),
                }
            }
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Composite key over all values, used by DISTINCT.
    pub(crate) fn value_key(&self) -> String {
        let mut key = String::new();
        for value in self.values() {
            value.append_to_key(&mut key);
        }
        key
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Build a [`Row`] from `column => value` pairs.
///
/// ```rust
/// use tabql_core::{row, Value};
///
/// let r = row! { "id" => 1, "name" => "Alice" };
/// assert_eq!(r.get("name"), Some(&Value::from("Alice")));
/// ```
#[macro_export]
macro_rules! row {
    () => { $crate::Row::new() };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::Row::new();
        $( row.insert($column, $crate::Value::from($value)); )+
        row
    }};
}

/// A table snapshot: column order plus rows, fetched wholesale per query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Build a table whose column order is taken from the first row.
    /// An empty `rows` yields a table without columns.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|row| row.columns().map(str::to_string).collect())
            .unwrap_or_default();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined_row() -> Row {
        row! {
            "users.id" => 1,
            "users.name" => "Alice",
            "orders.id" => 10,
            "orders.total" => 99.5,
        }
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut r = row! { "a" => 1, "b" => 2 };
        r.insert("a", Value::Int64(5));
        assert_eq!(r.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(r.get("a"), Some(&Value::Int64(5)));
    }

    #[test]
    fn lookup_unqualified_resolves_unique_column() {
        let r = joined_row();
        assert_eq!(r.lookup("name").unwrap(), &Value::from("Alice"));
        assert_eq!(r.lookup("total").unwrap(), &Value::Float64(99.5));
    }

    #[test]
    fn lookup_ambiguous_column_fails() {
        let r = joined_row();
        assert!(matches!(
            r.lookup("id"),
            Err(ExecutionError::AmbiguousField { .. })
        ));
        assert_eq!(r.lookup("orders.id").unwrap(), &Value::Int64(10));
    }

    #[test]
    fn lookup_qualified_falls_back_to_plain_column() {
        let r = row! { "id" => 1, "name" => "Alice" };
        assert_eq!(r.lookup("users.name").unwrap(), &Value::from("Alice"));
    }

    #[test]
    fn lookup_missing_field() {
        let r = row! { "id" => 1 };
        assert_eq!(
            r.lookup("age"),
            Err(ExecutionError::MissingField("age".to_string()))
        );
    }

    #[test]
    fn serializes_as_ordered_object() {
        let r = row! { "name" => "A", "age" => 30 };
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"name":"A","age":30}"#
        );
    }

    #[test]
    fn table_columns_from_first_row() {
        let t = Table::from_rows(vec![row! { "x" => 1, "y" => 2 }]);
        assert_eq!(t.columns(), &["x".to_string(), "y".to_string()]);
        assert_eq!(t.len(), 1);
        assert!(Table::from_rows(Vec::new()).columns().is_empty());
    }
}

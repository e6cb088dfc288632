//! CSV directory table provider
//!
//! Each table is a `<root>/<table>.csv` file with a header row. Arrow CSV
//! schema inference decides value tags; cells are kept as text so that
//! insert and delete rewrite the file through the Arrow CSV writer without
//! reformatting existing rows.

use crate::error::{ProviderError, TabqlResult};
use crate::provider::{DeleteResult, InsertResult, TableProvider};
use crate::sql::executor::RowFilter;
use crate::types::{Row, Table, Value};
use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::fs;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const EXTENSION: &str = "csv";

/// Cell text exactly as stored; `None` for an empty cell.
type Record = Vec<Option<String>>;

/// File contents: header, inferred column types and untouched cell text.
///
/// Mutations edit `records` and write them back verbatim, so rows a
/// statement does not touch keep their original spelling (`007`, `1.50`).
#[derive(Debug, Default)]
struct RawTable {
    columns: Vec<String>,
    types: Vec<DataType>,
    records: Vec<Record>,
}

impl RawTable {
    fn typed_row(&self, record: &Record) -> Row {
        let mut row = Row::new();
        for ((column, data_type), cell) in self.columns.iter().zip(&self.types).zip(record) {
            row.insert(column.clone(), typed_value(data_type, cell.as_deref()));
        }
        row
    }

    fn to_table(&self) -> Table {
        let rows = self.records.iter().map(|r| self.typed_row(r)).collect();
        Table::new(self.columns.clone(), rows)
    }
}

/// Tag a cell by its column's inferred type. Types other than Int64 and
/// Float64 are served as text.
fn typed_value(data_type: &DataType, cell: Option<&str>) -> Value {
    let Some(text) = cell else {
        return Value::Null;
    };
    match data_type {
        DataType::Int64 => text
            .parse()
            .map(Value::Int64)
            .unwrap_or_else(|_| Value::infer(text)),
        DataType::Float64 => text
            .parse()
            .map(Value::Float64)
            .unwrap_or_else(|_| Value::infer(text)),
        _ => Value::Utf8(text.to_string()),
    }
}

fn text_schema(columns: &[String]) -> Schema {
    Schema::new(
        columns
            .iter()
            .map(|c| Field::new(c, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    )
}

/// CSV directory table provider
#[derive(Debug, Clone)]
pub struct CsvProvider {
    root: PathBuf,
    delimiter: u8,
}

impl CsvProvider {
    /// Serve `<root>/<table>.csv` files, comma-delimited.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `table`. The name must be a single plain path
    /// component: no separators, no `.` or `..`.
    pub fn table_path(&self, table: &str) -> TabqlResult<PathBuf> {
        let mut components = Path::new(table).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !plain || table.contains(['/', '\\']) {
            return Err(ProviderError::InvalidTableName(table.to_string()).into());
        }
        Ok(self.root.join(format!("{table}.{EXTENSION}")))
    }

    /// Create (or truncate) a table file holding only the header row.
    pub fn create_table<I, S>(&self, table: &str, columns: I) -> TabqlResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = self.table_path(table)?;
        fs::create_dir_all(&self.root)?;
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let raw = RawTable {
            types: vec![DataType::Utf8; columns.len()],
            columns,
            records: Vec::new(),
        };
        self.write_raw(&path, &raw)?;
        info!(table = %table, "table created");
        Ok(())
    }

    fn read_raw(&self, table: &str, path: &Path) -> TabqlResult<RawTable> {
        if !path.is_file() {
            return Err(ProviderError::TableNotFound(table.to_string()).into());
        }

        let bytes = fs::read(path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(RawTable::default());
        }

        let format = Format::default()
            .with_header(true)
            .with_delimiter(self.delimiter);
        let (inferred, _) = format.infer_schema(Cursor::new(&bytes), None)?;
        let columns: Vec<String> = inferred.fields().iter().map(|f| f.name().clone()).collect();
        let types: Vec<DataType> = inferred
            .fields()
            .iter()
            .map(|f| f.data_type().clone())
            .collect();

        // every column as text; typing happens per cell in `typed_value`
        let reader = ReaderBuilder::new(Arc::new(text_schema(&columns)))
            .with_header(true)
            .with_delimiter(self.delimiter)
            .build(Cursor::new(&bytes))?;

        let mut records = Vec::new();
        for batch in reader {
            let batch = batch?;
            let cells: Vec<&StringArray> = batch
                .columns()
                .iter()
                .map(|column| column.as_string::<i32>())
                .collect();
            for idx in 0..batch.num_rows() {
                records.push(
                    cells
                        .iter()
                        .map(|array| (!array.is_null(idx)).then(|| array.value(idx).to_string()))
                        .collect(),
                );
            }
        }

        debug!(table = %table, rows = records.len(), "table loaded");
        Ok(RawTable {
            columns,
            types,
            records,
        })
    }

    fn write_raw(&self, path: &Path, raw: &RawTable) -> TabqlResult<()> {
        if raw.columns.is_empty() {
            fs::write(path, "")?;
            return Ok(());
        }

        let arrays: Vec<ArrayRef> = (0..raw.columns.len())
            .map(|idx| {
                let column: StringArray = raw
                    .records
                    .iter()
                    .map(|record| record.get(idx).and_then(|cell| cell.as_deref()))
                    .collect();
                Arc::new(column) as ArrayRef
            })
            .collect();
        let batch = RecordBatch::try_new(Arc::new(text_schema(&raw.columns)), arrays)?;

        let file = fs::File::create(path)?;
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .with_delimiter(self.delimiter)
            .build(file);
        writer.write(&batch)?;
        Ok(())
    }
}

impl TableProvider for CsvProvider {
    fn fetch_table(&self, name: &str) -> TabqlResult<Table> {
        let path = self.table_path(name)?;
        Ok(self.read_raw(name, &path)?.to_table())
    }

    fn insert_row(
        &self,
        table: &str,
        columns: &[String],
        values: &[String],
    ) -> TabqlResult<InsertResult> {
        let path = self.table_path(table)?;
        let mut raw = self.read_raw(table, &path)?;

        if let Some(unknown) = columns.iter().find(|c| !raw.columns.contains(*c)) {
            return Err(ProviderError::UnknownColumn {
                table: table.to_string(),
                column: unknown.clone(),
            }
            .into());
        }

        let record: Record = raw
            .columns
            .iter()
            .map(|column| {
                columns
                    .iter()
                    .position(|c| c == column)
                    .and_then(|idx| values.get(idx))
                    .filter(|text| !text.is_empty())
                    .cloned()
            })
            .collect();
        raw.records.push(record);

        self.write_raw(&path, &raw)?;
        info!(table = %table, "row inserted");
        Ok(InsertResult { inserted: 1 })
    }

    fn delete_rows(&self, table: &str, filter: &RowFilter) -> TabqlResult<DeleteResult> {
        let path = self.table_path(table)?;
        let mut raw = self.read_raw(table, &path)?;

        let mut kept = Vec::with_capacity(raw.records.len());
        let mut deleted = 0;
        for record in std::mem::take(&mut raw.records) {
            if filter.matches(&raw.typed_row(&record))? {
                deleted += 1;
            } else {
                kept.push(record);
            }
        }

        if deleted > 0 {
            raw.records = kept;
            self.write_raw(&path, &raw)?;
        }
        info!(table = %table, deleted, "rows deleted");
        Ok(DeleteResult { deleted })
    }

    fn table_names(&self) -> TabqlResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file()
                && path.extension().is_some_and(|ext| ext == EXTENSION)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

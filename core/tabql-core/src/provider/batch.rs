//! Arrow RecordBatch ↔ Row conversion
//!
//! Column types decide the value tags: integer columns become `Int64`,
//! floating-point columns `Float64`, string columns `Utf8`. Any other Arrow
//! type is rendered to text.

use crate::error::TabqlResult;
use crate::types::{Row, Table, Value};
use arrow::array::{Array, ArrayRef, AsArray, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{
    DataType, Field, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, Schema,
    UInt8Type, UInt16Type, UInt32Type,
};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use std::sync::Arc;

static NULL: Value = Value::Null;

/// Convert every row of a batch, columns in schema order.
pub fn batch_to_rows(batch: &RecordBatch) -> TabqlResult<Vec<Row>> {
    let schema = batch.schema();
    let mut rows: Vec<Row> = (0..batch.num_rows())
        .map(|_| Row::with_capacity(batch.num_columns()))
        .collect();

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        for (idx, row) in rows.iter_mut().enumerate() {
            row.insert(field.name().clone(), cell_value(column, idx)?);
        }
    }
    Ok(rows)
}

/// Convert a sequence of batches into one table snapshot.
pub fn batches_to_table(batches: &[RecordBatch]) -> TabqlResult<Table> {
    let columns = batches
        .first()
        .map(|b| b.schema().fields().iter().map(|f| f.name().clone()).collect())
        .unwrap_or_default();
    let mut rows = Vec::new();
    for batch in batches {
        rows.extend(batch_to_rows(batch)?);
    }
    Ok(Table::new(columns, rows))
}

fn cell_value(column: &ArrayRef, idx: usize) -> TabqlResult<Value> {
    if column.is_null(idx) {
        return Ok(Value::Null);
    }
    let value = match column.data_type() {
        DataType::Int64 => Value::Int64(column.as_primitive::<Int64Type>().value(idx)),
        DataType::Int32 => Value::Int64(column.as_primitive::<Int32Type>().value(idx) as i64),
        DataType::Int16 => Value::Int64(column.as_primitive::<Int16Type>().value(idx) as i64),
        DataType::Int8 => Value::Int64(column.as_primitive::<Int8Type>().value(idx) as i64),
        DataType::UInt32 => Value::Int64(column.as_primitive::<UInt32Type>().value(idx) as i64),
        DataType::UInt16 => Value::Int64(column.as_primitive::<UInt16Type>().value(idx) as i64),
        DataType::UInt8 => Value::Int64(column.as_primitive::<UInt8Type>().value(idx) as i64),
        DataType::Float64 => Value::Float64(column.as_primitive::<Float64Type>().value(idx)),
        DataType::Float32 => {
            Value::Float64(column.as_primitive::<Float32Type>().value(idx) as f64)
        }
        DataType::Utf8 => Value::Utf8(column.as_string::<i32>().value(idx).to_string()),
        DataType::LargeUtf8 => Value::Utf8(column.as_string::<i64>().value(idx).to_string()),
        _ => Value::Utf8(array_value_to_string(column.as_ref(), idx)?),
    };
    Ok(value)
}

/// Arrow type able to hold every non-null value of a column.
fn column_type<'a>(values: impl Iterator<Item = &'a Value>) -> DataType {
    let mut data_type = DataType::Int64;
    for value in values {
        match (value, &data_type) {
            (Value::Null, _) | (Value::Int64(_), _) => {}
            (Value::Float64(_), DataType::Int64) => data_type = DataType::Float64,
            (Value::Float64(_), _) => {}
            (Value::Utf8(_), _) => return DataType::Utf8,
        }
    }
    data_type
}

/// Build a batch with `columns` in order; cells missing from a row are NULL.
pub fn rows_to_batch(columns: &[String], rows: &[Row]) -> TabqlResult<RecordBatch> {
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());

    for column in columns {
        let cells: Vec<&Value> = rows
            .iter()
            .map(|row| row.get(column).unwrap_or(&NULL))
            .collect();
        let data_type = column_type(cells.iter().copied());

        let array: ArrayRef = match data_type {
            DataType::Int64 => {
                let mut builder = Int64Builder::with_capacity(cells.len());
                for cell in &cells {
                    builder.append_option(cell.as_i64());
                }
                Arc::new(builder.finish())
            }
            DataType::Float64 => {
                let mut builder = Float64Builder::with_capacity(cells.len());
                for cell in &cells {
                    builder.append_option(cell.as_f64());
                }
                Arc::new(builder.finish())
            }
            _ => {
                let mut builder = StringBuilder::with_capacity(cells.len(), cells.len() * 8);
                for cell in &cells {
                    match cell {
                        Value::Null => builder.append_null(),
                        other => builder.append_value(other.to_string()),
                    }
                }
                Arc::new(builder.finish())
            }
        };

        fields.push(Field::new(column, array.data_type().clone(), true));
        arrays.push(array);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Convert a table snapshot into one batch.
pub fn table_to_batch(table: &Table) -> TabqlResult<RecordBatch> {
    rows_to_batch(table.columns(), table.rows())
}

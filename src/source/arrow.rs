//! Conversion from Arrow record batches to a [`Dataset`].
//!
//! Arrow types map onto [`CellValue`] variants as follows:
//!
//! | Arrow type                         | CellValue   |
//! |------------------------------------|-------------|
//! | Int8..Int64, UInt8..UInt32         | `Int`       |
//! | UInt64                             | `Int`, or `Text` above `i64::MAX` |
//! | Float16, Float32, Float64, Decimal | `Float`     |
//! | Boolean                            | `Bool`      |
//! | Date32, Date64, Timestamp          | `Timestamp` |
//! | Utf8, LargeUtf8, Utf8View          | `Text`      |
//! | Null                               | `Null`      |
//! | anything else                      | `Text` via Arrow's display formatting |

use std::fs::File;
use std::path::Path;

use arrow::array::cast::AsArray;
use arrow::array::types::{
    Date32Type, Date64Type, Float16Type, Float32Type, Float64Type, Int16Type, Int32Type,
    Int64Type, Int8Type, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::array::{Array, RecordBatch};
use arrow::datatypes::{DataType, Schema, TimeUnit};
use arrow::ipc::reader::FileReader;
use arrow::util::display::{ArrayFormatter, FormatOptions};

use crate::dataset::{CellValue, Dataset};
use crate::error::LoadError;

/// Build a dataset from record batches sharing `schema`.
///
/// Column names are taken from the schema fields.
///
/// # Errors
///
/// Returns `LoadError::InvalidInput` if a batch does not match the schema.
pub fn dataset_from_record_batches(
    schema: &Schema,
    batches: &[RecordBatch],
) -> Result<Dataset, LoadError> {
    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let mut rows: Vec<Vec<CellValue>> = Vec::new();

    for batch in batches {
        if batch.num_columns() != columns.len() {
            return Err(LoadError::InvalidInput(format!(
                "Record batch has {} columns, schema has {}",
                batch.num_columns(),
                columns.len()
            )));
        }

        let cells: Vec<Vec<CellValue>> = batch
            .columns()
            .iter()
            .map(|array| column_cells(array.as_ref()))
            .collect::<Result<_, _>>()?;

        for row_idx in 0..batch.num_rows() {
            rows.push(cells.iter().map(|column| column[row_idx].clone()).collect());
        }
    }

    Dataset::new(columns, rows)
}

/// Read every record batch of an Arrow IPC file.
///
/// # Errors
///
/// Returns `LoadError::InvalidInput` if the file cannot be opened or decoded.
pub fn read_ipc_file(path: &Path) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|e| {
        LoadError::InvalidInput(format!("Failed to open file '{}': {}", path.display(), e))
    })?;

    let reader = FileReader::try_new(file, None)?;
    let schema = reader.schema();
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    dataset_from_record_batches(&schema, &batches)
}

/// Convert one Arrow column into cells.
fn column_cells(array: &dyn Array) -> Result<Vec<CellValue>, LoadError> {
    let len = array.len();

    macro_rules! collect {
        (|$i:ident| $body:expr) => {
            (0..len)
                .map(|$i| {
                    if array.is_null($i) {
                        CellValue::Null
                    } else {
                        $body
                    }
                })
                .collect()
        };
    }

    let cells = match array.data_type() {
        DataType::Null => vec![CellValue::Null; len],
        DataType::Boolean => {
            let arr = array.as_boolean();
            collect!(|i| CellValue::Bool(arr.value(i)))
        }
        DataType::Int8 => {
            let arr = array.as_primitive::<Int8Type>();
            collect!(|i| CellValue::Int(i64::from(arr.value(i))))
        }
        DataType::Int16 => {
            let arr = array.as_primitive::<Int16Type>();
            collect!(|i| CellValue::Int(i64::from(arr.value(i))))
        }
        DataType::Int32 => {
            let arr = array.as_primitive::<Int32Type>();
            collect!(|i| CellValue::Int(i64::from(arr.value(i))))
        }
        DataType::Int64 => {
            let arr = array.as_primitive::<Int64Type>();
            collect!(|i| CellValue::Int(arr.value(i)))
        }
        DataType::UInt8 => {
            let arr = array.as_primitive::<UInt8Type>();
            collect!(|i| CellValue::Int(i64::from(arr.value(i))))
        }
        DataType::UInt16 => {
            let arr = array.as_primitive::<UInt16Type>();
            collect!(|i| CellValue::Int(i64::from(arr.value(i))))
        }
        DataType::UInt32 => {
            let arr = array.as_primitive::<UInt32Type>();
            collect!(|i| CellValue::Int(i64::from(arr.value(i))))
        }
        DataType::UInt64 => {
            let arr = array.as_primitive::<UInt64Type>();
            collect!(|i| {
                let v = arr.value(i);
                i64::try_from(v).map_or_else(|_| CellValue::Text(v.to_string()), CellValue::Int)
            })
        }
        DataType::Float16 => {
            let arr = array.as_primitive::<Float16Type>();
            collect!(|i| CellValue::from(f64::from(arr.value(i).to_f32())))
        }
        DataType::Float32 => {
            let arr = array.as_primitive::<Float32Type>();
            collect!(|i| CellValue::from(f64::from(arr.value(i))))
        }
        DataType::Float64 => {
            let arr = array.as_primitive::<Float64Type>();
            collect!(|i| CellValue::from(arr.value(i)))
        }
        DataType::Utf8 => {
            let arr = array.as_string::<i32>();
            collect!(|i| CellValue::from(arr.value(i)))
        }
        DataType::LargeUtf8 => {
            let arr = array.as_string::<i64>();
            collect!(|i| CellValue::from(arr.value(i)))
        }
        DataType::Utf8View => {
            let arr = array.as_string_view();
            collect!(|i| CellValue::from(arr.value(i)))
        }
        DataType::Date32 => {
            let arr = array.as_primitive::<Date32Type>();
            collect!(|i| arr.value_as_datetime(i).map_or(CellValue::Null, CellValue::Timestamp))
        }
        DataType::Date64 => {
            let arr = array.as_primitive::<Date64Type>();
            collect!(|i| arr.value_as_datetime(i).map_or(CellValue::Null, CellValue::Timestamp))
        }
        DataType::Timestamp(unit, _tz) => timestamp_cells(array, unit),
        DataType::Decimal128(_, _) | DataType::Decimal256(_, _) => {
            let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())?;
            collect!(|i| {
                let text = formatter.value(i).to_string();
                text.parse::<f64>()
                    .map_or(CellValue::Text(text), CellValue::Float)
            })
        }
        _ => {
            let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())?;
            collect!(|i| CellValue::from(formatter.value(i).to_string()))
        }
    };

    Ok(cells)
}

/// Timestamps are read as wall-clock UTC; any zone annotation is dropped.
fn timestamp_cells(array: &dyn Array, unit: &TimeUnit) -> Vec<CellValue> {
    fn convert(ts: Option<chrono::NaiveDateTime>) -> CellValue {
        ts.map_or(CellValue::Null, CellValue::Timestamp)
    }

    let len = array.len();
    (0..len)
        .map(|i| {
            if array.is_null(i) {
                return CellValue::Null;
            }
            match unit {
                TimeUnit::Second => convert(
                    array
                        .as_primitive::<TimestampSecondType>()
                        .value_as_datetime(i),
                ),
                TimeUnit::Millisecond => convert(
                    array
                        .as_primitive::<TimestampMillisecondType>()
                        .value_as_datetime(i),
                ),
                TimeUnit::Microsecond => convert(
                    array
                        .as_primitive::<TimestampMicrosecondType>()
                        .value_as_datetime(i),
                ),
                TimeUnit::Nanosecond => convert(
                    array
                        .as_primitive::<TimestampNanosecondType>()
                        .value_as_datetime(i),
                ),
            }
        })
        .collect()
}

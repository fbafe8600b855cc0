//! Batched row loading.

use tracing::{debug, error};

use crate::connection::Session;
use crate::dataset::{CellValue, Dataset};
use crate::error::LoadError;
use crate::types::{coerce_value, ColumnNameMode, TableSpec};

/// Default number of rows per INSERT transaction.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Insert every row of `dataset` into the table described by `spec`.
///
/// Rows are sent in batches of `batch_size`, each batch in its own
/// transaction. Loading stops at the first failed batch.
///
/// # Returns
///
/// The number of rows inserted.
///
/// # Errors
///
/// Returns `LoadError::Load` carrying the number of rows committed before the
/// failing batch. A value that cannot be coerced to its column type fails
/// its batch before anything is sent.
pub async fn load_rows(
    session: &mut dyn Session,
    spec: &TableSpec,
    dataset: &Dataset,
    batch_size: usize,
    column_name_mode: ColumnNameMode,
) -> Result<u64, LoadError> {
    let batch_size = batch_size.max(1);
    let sql = spec
        .insert_query(column_name_mode)
        .build(session.dialect());
    let total = dataset.num_rows();

    let mut rows_loaded = 0u64;
    for (batch_idx, chunk) in dataset.rows().chunks(batch_size).enumerate() {
        let first_row = batch_idx * batch_size;
        let batch = coerce_batch(spec, chunk, first_row).map_err(|message| {
            error!(table = %spec.name, rows_loaded, %message, "value conversion failed");
            LoadError::Load {
                rows_loaded,
                message,
            }
        })?;

        let inserted = session.insert_batch(&sql, &batch).await.map_err(|e| {
            error!(table = %spec.name, rows_loaded, error = %e, "batch insert failed");
            LoadError::Load {
                rows_loaded,
                message: e.to_string(),
            }
        })?;

        rows_loaded += inserted;
        debug!(
            table = %spec.name,
            batch = batch_idx + 1,
            rows_loaded,
            total,
            "batch committed"
        );
    }

    Ok(rows_loaded)
}

fn coerce_batch(
    spec: &TableSpec,
    rows: &[Vec<CellValue>],
    first_row: usize,
) -> Result<Vec<Vec<CellValue>>, String> {
    rows.iter()
        .enumerate()
        .map(|(offset, row)| {
            row.iter()
                .zip(&spec.columns)
                .map(|(value, column)| {
                    coerce_value(value, &column.relational_type).map_err(|e| {
                        format!(
                            "Row {}, column '{}': {}",
                            first_row + offset + 1,
                            column.name,
                            e
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

//! Parquet source reader.

use std::fs::File;
use std::path::Path;

use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::arrow::dataset_from_record_batches;
use crate::dataset::Dataset;
use crate::error::LoadError;

/// Options for reading Parquet files.
#[derive(Debug, Clone)]
pub struct ParquetReadOptions {
    /// Rows decoded per Arrow batch (default: 1024).
    pub batch_size: usize,
    /// Row groups to read, in file order; `None` reads all of them.
    pub row_groups: Option<Vec<usize>>,
}

impl Default for ParquetReadOptions {
    fn default() -> Self {
        Self {
            batch_size: 1024,
            row_groups: None,
        }
    }
}

impl ParquetReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Restrict reading to the given row groups.
    #[must_use]
    pub fn with_row_groups(mut self, row_groups: Vec<usize>) -> Self {
        self.row_groups = Some(row_groups);
        self
    }
}

/// Read a Parquet file into a dataset.
///
/// # Errors
///
/// Returns `LoadError::InvalidInput` if the file cannot be opened or decoded,
/// or if a requested row group does not exist.
pub fn read_parquet(path: &Path, options: &ParquetReadOptions) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|e| {
        LoadError::InvalidInput(format!("Failed to open file '{}': {}", path.display(), e))
    })?;

    let mut builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    if let Some(row_groups) = &options.row_groups {
        let available = builder.metadata().num_row_groups();
        if let Some(missing) = row_groups.iter().find(|&&rg| rg >= available) {
            return Err(LoadError::InvalidInput(format!(
                "Row group {} does not exist in '{}' ({} row groups)",
                missing,
                path.display(),
                available
            )));
        }
        builder = builder.with_row_groups(row_groups.clone());
    }

    let schema = builder.schema().clone();
    let reader = builder.with_batch_size(options.batch_size).build()?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    dataset_from_record_batches(&schema, &batches)
}

//! Source readers producing a [`Dataset`](crate::dataset::Dataset).
//!
//! This module provides readers for CSV, Parquet, Arrow IPC and spreadsheet
//! workbook files. The format is chosen from the file extension by
//! [`read_file`].

pub mod arrow;
pub mod csv;
pub mod parquet;
pub mod workbook;

use std::fmt;
use std::path::Path;

pub use self::arrow::{dataset_from_record_batches, read_ipc_file};
pub use self::csv::{read_csv, read_csv_from, CsvReadOptions};
pub use self::parquet::{read_parquet, ParquetReadOptions};
#[cfg(feature = "excel")]
pub use self::workbook::read_workbook;
pub use self::workbook::{SheetSelector, WorkbookReadOptions};

use crate::dataset::Dataset;
use crate::error::LoadError;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Parquet,
    ArrowIpc,
    Workbook,
}

impl SourceFormat {
    /// Detect the format from the file extension (case-insensitive).
    ///
    /// `.csv`, `.tsv` and `.txt` are CSV; `.parquet` and `.pq` are Parquet;
    /// `.arrow`, `.ipc` and `.feather` are Arrow IPC; `.xlsx`, `.xlsm`,
    /// `.xlsb`, `.xls` and `.ods` are workbooks.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Some(SourceFormat::Csv),
            "parquet" | "pq" => Some(SourceFormat::Parquet),
            "arrow" | "ipc" | "feather" => Some(SourceFormat::ArrowIpc),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Workbook),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "CSV"),
            SourceFormat::Parquet => write!(f, "Parquet"),
            SourceFormat::ArrowIpc => write!(f, "Arrow IPC"),
            SourceFormat::Workbook => write!(f, "workbook"),
        }
    }
}

/// Options for every supported format; only the part matching the file is used.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    pub csv: CsvReadOptions,
    pub parquet: ParquetReadOptions,
    pub workbook: WorkbookReadOptions,
}

impl SourceOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_csv(mut self, csv: CsvReadOptions) -> Self {
        self.csv = csv;
        self
    }

    #[must_use]
    pub fn with_parquet(mut self, parquet: ParquetReadOptions) -> Self {
        self.parquet = parquet;
        self
    }

    #[must_use]
    pub fn with_workbook(mut self, workbook: WorkbookReadOptions) -> Self {
        self.workbook = workbook;
        self
    }
}

/// Read a file into a dataset, choosing the reader by extension.
///
/// A `.tsv` file is read tab-delimited unless another delimiter was set.
///
/// # Errors
///
/// Returns `LoadError::InvalidInput` for unknown extensions, for files the
/// chosen reader rejects, and for workbooks when the `excel` feature is off.
pub fn read_file(path: &Path, options: &SourceOptions) -> Result<Dataset, LoadError> {
    let format = SourceFormat::from_path(path).ok_or_else(|| {
        LoadError::InvalidInput(format!(
            "Unsupported file type '{}' (expected .csv, .tsv, .txt, .parquet, .pq, .arrow, .ipc, .feather, .xlsx, .xlsm, .xlsb, .xls or .ods)",
            path.display()
        ))
    })?;

    tracing::debug!(path = %path.display(), %format, "reading source file");

    match format {
        SourceFormat::Csv => {
            let is_tsv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
            if is_tsv && options.csv.delimiter == b',' {
                let csv = options.csv.clone().with_delimiter(b'\t');
                read_csv(path, &csv)
            } else {
                read_csv(path, &options.csv)
            }
        }
        SourceFormat::Parquet => read_parquet(path, &options.parquet),
        SourceFormat::ArrowIpc => read_ipc_file(path),
        #[cfg(feature = "excel")]
        SourceFormat::Workbook => read_workbook(path, &options.workbook),
        #[cfg(not(feature = "excel"))]
        SourceFormat::Workbook => Err(LoadError::InvalidInput(format!(
            "Cannot read '{}': workbook support is not enabled in this build",
            path.display()
        ))),
    }
}

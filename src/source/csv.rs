//! CSV source reader.
//!
//! Column types are detected by arrow-csv's schema inference; the decoded
//! batches are then converted with [`dataset_from_record_batches`].

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{Field, Schema};

use super::arrow::dataset_from_record_batches;
use crate::dataset::Dataset;
use crate::error::LoadError;

/// Default number of rows decoded per Arrow batch.
pub const DEFAULT_CSV_BATCH_SIZE: usize = 8192;

/// Options for reading CSV files.
///
/// # Example
///
/// ```
/// use sheetload::source::CsvReadOptions;
///
/// let options = CsvReadOptions::new()
///     .with_delimiter(b';')
///     .with_has_header(false);
/// assert_eq!(options.delimiter, b';');
/// ```
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    /// Field delimiter byte (default: `,`).
    pub delimiter: u8,
    /// Whether the first row is a header (default: `true`).
    pub has_header: bool,
    /// Quote character (default: `Some(b'"')`).
    pub quote: Option<u8>,
    /// Escape character (default: `None`).
    pub escape: Option<u8>,
    /// Maximum number of records sampled for type detection (default: `None`, all rows).
    pub max_sample_records: Option<usize>,
    /// Rows decoded per Arrow batch.
    pub batch_size: usize,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            quote: Some(b'"'),
            escape: None,
            max_sample_records: None,
            batch_size: DEFAULT_CSV_BATCH_SIZE,
        }
    }
}

impl CsvReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    #[must_use]
    pub fn with_quote(mut self, quote: Option<u8>) -> Self {
        self.quote = quote;
        self
    }

    #[must_use]
    pub fn with_escape(mut self, escape: Option<u8>) -> Self {
        self.escape = escape;
        self
    }

    #[must_use]
    pub fn with_max_sample_records(mut self, max_sample_records: Option<usize>) -> Self {
        self.max_sample_records = max_sample_records;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn format(&self) -> Format {
        let mut format = Format::default()
            .with_header(self.has_header)
            .with_delimiter(self.delimiter);

        if let Some(quote) = self.quote {
            format = format.with_quote(quote);
        }
        if let Some(escape) = self.escape {
            format = format.with_escape(escape);
        }

        format
    }
}

/// Read a CSV file into a dataset.
///
/// Without a header row, columns are named `col_1`, `col_2`, ...
///
/// # Errors
///
/// Returns `LoadError::InvalidInput` if the file cannot be opened or parsed.
pub fn read_csv(path: &Path, options: &CsvReadOptions) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|e| {
        LoadError::InvalidInput(format!("Failed to open file '{}': {}", path.display(), e))
    })?;

    read_csv_from(file, options).map_err(|e| match e {
        LoadError::InvalidInput(msg) => {
            LoadError::InvalidInput(format!("Failed to read CSV '{}': {}", path.display(), msg))
        }
        other => other,
    })
}

/// Read CSV from any seekable reader.
///
/// The reader is scanned twice: once for type detection, once for decoding.
///
/// # Errors
///
/// Returns `LoadError::InvalidInput` if the data cannot be parsed.
pub fn read_csv_from<R: Read + Seek>(
    mut reader: R,
    options: &CsvReadOptions,
) -> Result<Dataset, LoadError> {
    let format = options.format();

    let (schema, _records_read) = format.infer_schema(
        BufReader::new(&mut reader),
        options.max_sample_records,
    )?;
    reader
        .rewind()
        .map_err(|e| LoadError::InvalidInput(format!("Failed to rewind CSV input: {e}")))?;

    let schema = if options.has_header {
        schema
    } else {
        positional_names(&schema)
    };

    let csv_reader = ReaderBuilder::new(Arc::new(schema.clone()))
        .with_format(format)
        .with_batch_size(options.batch_size)
        .build(BufReader::new(reader))?;
    let batches = csv_reader.collect::<Result<Vec<_>, _>>()?;

    dataset_from_record_batches(&schema, &batches)
}

fn positional_names(schema: &Schema) -> Schema {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field)| field.as_ref().clone().with_name(format!("col_{}", i + 1)))
        .collect();
    Schema::new(fields)
}

//! Spreadsheet workbook reader (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).
//!
//! One worksheet is read per call. The first row holds the column names
//! unless [`WorkbookReadOptions::has_header`] is off. Reading needs the
//! `excel` feature; the option types are always available.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "excel")]
use std::path::Path;

#[cfg(feature = "excel")]
use calamine::{open_workbook_auto, Data, DataType, Reader};
#[cfg(feature = "excel")]
use tracing::debug;

#[cfg(feature = "excel")]
use crate::dataset::{CellValue, Dataset};
#[cfg(feature = "excel")]
use crate::error::LoadError;

/// Which worksheet of a workbook to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    /// Zero-based position in the workbook.
    Index(usize),
    /// Exact sheet name.
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl From<usize> for SheetSelector {
    fn from(index: usize) -> Self {
        SheetSelector::Index(index)
    }
}

impl From<&str> for SheetSelector {
    fn from(name: &str) -> Self {
        SheetSelector::Name(name.to_string())
    }
}

impl From<String> for SheetSelector {
    fn from(name: String) -> Self {
        SheetSelector::Name(name)
    }
}

/// A plain number selects by position; anything else by name.
impl FromStr for SheetSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<usize>() {
            Ok(index) => SheetSelector::Index(index),
            Err(_) => SheetSelector::Name(s.to_string()),
        })
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(index) => write!(f, "#{index}"),
            SheetSelector::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Options for reading workbooks.
///
/// # Example
///
/// ```
/// use sheetload::source::{SheetSelector, WorkbookReadOptions};
///
/// let options = WorkbookReadOptions::new().with_sheet("Q3");
/// assert_eq!(options.sheet, SheetSelector::Name("Q3".into()));
/// ```
#[derive(Debug, Clone)]
pub struct WorkbookReadOptions {
    /// Worksheet to read (default: the first one).
    pub sheet: SheetSelector,
    /// Whether the first row is a header (default: `true`).
    pub has_header: bool,
}

impl Default for WorkbookReadOptions {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::default(),
            has_header: true,
        }
    }
}

impl WorkbookReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sheet(mut self, sheet: impl Into<SheetSelector>) -> Self {
        self.sheet = sheet.into();
        self
    }

    #[must_use]
    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }
}

/// Read one worksheet of the workbook at `path`.
///
/// Blank header cells are named `Unnamed: N` after their zero-based
/// position; headerless sheets get `col_1`, `col_2`, ... Rows with no value
/// at all are skipped.
///
/// # Errors
///
/// Returns `LoadError::InvalidInput` if the file is not a readable workbook,
/// the sheet does not exist, or the sheet is empty.
#[cfg(feature = "excel")]
pub fn read_workbook(path: &Path, options: &WorkbookReadOptions) -> Result<Dataset, LoadError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| LoadError::InvalidInput(format!("Invalid workbook file: {e}")))?;

    let sheet_names = workbook.sheet_names();
    let sheet = match &options.sheet {
        SheetSelector::Index(index) => sheet_names.get(*index).cloned(),
        SheetSelector::Name(name) => sheet_names.iter().find(|s| *s == name).cloned(),
    }
    .ok_or_else(|| {
        LoadError::InvalidInput(format!(
            "Worksheet {} does not exist (available: {})",
            options.sheet,
            sheet_names.join(", ")
        ))
    })?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| LoadError::InvalidInput(format!("Invalid worksheet '{sheet}': {e}")))?;

    let mut rows = range.rows();
    let columns: Vec<String> = if options.has_header {
        let header = rows
            .next()
            .ok_or_else(|| LoadError::InvalidInput(format!("Worksheet '{sheet}' is empty")))?;
        header
            .iter()
            .enumerate()
            .map(|(idx, cell)| match cell {
                Data::Empty => format!("Unnamed: {idx}"),
                other => other.to_string(),
            })
            .collect()
    } else {
        (1..=range.width()).map(|i| format!("col_{i}")).collect()
    };

    if columns.is_empty() {
        return Err(LoadError::InvalidInput(format!(
            "Worksheet '{sheet}' is empty"
        )));
    }

    let values: Vec<Vec<CellValue>> = rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    debug!(
        path = %path.display(),
        %sheet,
        columns = columns.len(),
        rows = values.len(),
        "read worksheet"
    );

    Dataset::new(columns, values)
}

#[cfg(feature = "excel")]
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Int(v) => CellValue::Int(*v),
        Data::Float(v) => number_value(*v),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map_or_else(|| CellValue::Text(cell.to_string()), CellValue::Timestamp),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Workbooks store every number as a float; whole numbers read back as integers.
#[cfg(feature = "excel")]
fn number_value(v: f64) -> CellValue {
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        CellValue::Int(v as i64)
    } else {
        CellValue::from(v)
    }
}

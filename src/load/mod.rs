//! The load pipeline.
//!
//! [`load_dataset`] runs the full cycle against an open session:
//!
//! 1. validate the request (table name, columns, duplicate names)
//! 2. infer a [`TypeMap`] for the dataset, unless one was supplied
//! 3. create or replace the table in one transaction
//! 4. insert the rows in batches
//!
//! Every failure is classified as a [`LoadError`] according to the phase it
//! happened in. [`import_file`] adds reading a source file and opening and
//! closing the session around it.
//!
//! # Example
//!
//! ```no_run
//! use sheetload::connection::ConnectionParams;
//! use sheetload::load::{import_file, LoadOptions, TableMode};
//! use sheetload::source::SourceOptions;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = ConnectionParams::from_url("sqlite://warehouse.db")?;
//! let options = LoadOptions::new().with_table_mode(TableMode::Replace);
//!
//! let result = import_file(
//!     &params,
//!     Path::new("sales.csv"),
//!     "sales",
//!     &SourceOptions::default(),
//!     &options,
//! )
//! .await?;
//! println!("Imported {} rows", result.rows_imported);
//! # Ok(())
//! # }
//! ```

pub mod materialize;
pub mod rows;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

pub use materialize::{ddl_statements, materialize};
pub use rows::{load_rows, DEFAULT_BATCH_SIZE};

use crate::connection::{connect, ConnectionParams, Session};
use crate::dataset::Dataset;
use crate::error::LoadError;
use crate::source::{read_file, SourceOptions};
use crate::types::{
    column_identifiers, infer_with, ColumnNameMode, InferenceOptions, TableSpec, TypeMap,
};

/// Global tokio runtime for blocking operations.
///
/// Lazily created on first use and shared by every `blocking_*` call.
fn blocking_runtime() -> Result<&'static Runtime, LoadError> {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| LoadError::Unexpected(format!("Failed to create tokio runtime: {e}")))?;
    Ok(RUNTIME.get_or_init(|| runtime))
}

/// What to do when the target table already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableMode {
    /// Drop the existing table and create it anew.
    #[default]
    Replace,
    /// Keep the existing table and its rows; create it only if missing.
    Append,
    /// Fail if the table exists.
    Fail,
}

impl fmt::Display for TableMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableMode::Replace => "replace",
            TableMode::Append => "append",
            TableMode::Fail => "fail",
        };
        f.write_str(name)
    }
}

impl FromStr for TableMode {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(TableMode::Replace),
            "append" => Ok(TableMode::Append),
            "fail" => Ok(TableMode::Fail),
            other => Err(LoadError::InvalidInput(format!(
                "Invalid if_exists value '{other}' (expected replace, append or fail)"
            ))),
        }
    }
}

/// How repeated column names in the source are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateColumns {
    /// Rename later occurrences to `name.1`, `name.2`, ...
    ///
    /// Names are compared the way the target database compares identifiers,
    /// so `Name` and `name` are duplicates in SQLite.
    #[default]
    Disambiguate,
    /// Fail with `LoadError::InvalidInput`.
    Reject,
}

/// Options for [`load_dataset`] and [`import_file`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Schema the table is created in; `None` uses the session default.
    pub schema: Option<String>,
    /// Behavior when the table exists (default: replace).
    pub table_mode: TableMode,
    /// Rows per INSERT transaction (default: 10,000).
    pub batch_size: usize,
    /// How column names are written into DDL and DML.
    pub column_name_mode: ColumnNameMode,
    /// How repeated column names are handled.
    pub duplicate_columns: DuplicateColumns,
    /// Type inference settings.
    pub inference: InferenceOptions,
    /// Explicit column types; skips inference when set.
    pub column_types: Option<TypeMap>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            schema: None,
            table_mode: TableMode::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            column_name_mode: ColumnNameMode::default(),
            duplicate_columns: DuplicateColumns::default(),
            inference: InferenceOptions::default(),
            column_types: None,
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    #[must_use]
    pub fn with_table_mode(mut self, mode: TableMode) -> Self {
        self.table_mode = mode;
        self
    }

    /// Set the batch size. Zero is treated as one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_column_name_mode(mut self, mode: ColumnNameMode) -> Self {
        self.column_name_mode = mode;
        self
    }

    #[must_use]
    pub fn with_duplicate_columns(mut self, handling: DuplicateColumns) -> Self {
        self.duplicate_columns = handling;
        self
    }

    #[must_use]
    pub fn with_inference(mut self, inference: InferenceOptions) -> Self {
        self.inference = inference;
        self
    }

    /// Use these column types instead of inferring them.
    ///
    /// The names must match the dataset's columns, in order.
    #[must_use]
    pub fn with_column_types(mut self, column_types: TypeMap) -> Self {
        self.column_types = Some(column_types);
        self
    }
}

/// Outcome of a successful load.
///
/// Serializes as `{"status": "success", "table": ..., "rows_imported": ...,
/// "columns": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    /// Table name as requested.
    pub table: String,
    /// Number of rows inserted.
    pub rows_imported: u64,
    /// Column names of the created table, in order and unquoted.
    ///
    /// These are the source names after disambiguation, sanitized under
    /// [`ColumnNameMode::Sanitize`] and cut to the dialect's identifier limit.
    pub columns: Vec<String>,
}

impl Serialize for LoadResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LoadResult", 4)?;
        state.serialize_field("status", "success")?;
        state.serialize_field("table", &self.table)?;
        state.serialize_field("rows_imported", &self.rows_imported)?;
        state.serialize_field("columns", &self.columns)?;
        state.end()
    }
}

/// Load `dataset` into `table` over an open session.
///
/// # Arguments
///
/// * `session` - Open database session
/// * `table` - Target table name
/// * `dataset` - Rows to load
/// * `options` - Load options
///
/// # Returns
///
/// A [`LoadResult`] describing the loaded table.
///
/// # Errors
///
/// - `LoadError::InvalidInput` if the request is unusable; nothing is touched
/// - `LoadError::SchemaCreation` if the table cannot be created
/// - `LoadError::Load` if a batch of rows fails
pub async fn load_dataset(
    session: &mut dyn Session,
    table: &str,
    mut dataset: Dataset,
    options: &LoadOptions,
) -> Result<LoadResult, LoadError> {
    if table.trim().is_empty() {
        return Err(LoadError::InvalidInput(
            "Parameter 'table_name' is required".to_string(),
        ));
    }
    if dataset.num_columns() == 0 {
        return Err(LoadError::InvalidInput(
            "Dataset has no columns".to_string(),
        ));
    }

    let dialect = session.dialect();
    let duplicates: Vec<String> = dataset
        .duplicate_columns(dialect)
        .into_iter()
        .map(String::from)
        .collect();
    if !duplicates.is_empty() {
        match options.duplicate_columns {
            DuplicateColumns::Reject => {
                return Err(LoadError::InvalidInput(format!(
                    "Duplicate column names: {}",
                    duplicates.join(", ")
                )));
            }
            DuplicateColumns::Disambiguate => {
                dataset.disambiguate_columns(dialect);
                warn!(?duplicates, columns = ?dataset.columns(), "renamed duplicate columns");
            }
        }
    }

    let column_types = match &options.column_types {
        Some(types) => {
            check_column_types(types, &dataset)?;
            types.clone()
        }
        None => infer_with(&dataset, &options.inference),
    };

    let spec = TableSpec::new(table, column_types).with_schema(options.schema.clone());

    info!(
        table,
        mode = %options.table_mode,
        columns = spec.columns.len(),
        rows = dataset.num_rows(),
        "creating table"
    );

    materialize(session, &spec, options.table_mode, options.column_name_mode)
        .await
        .map_err(|e| {
            error!(table, error = %e, "table creation failed");
            LoadError::SchemaCreation(e.to_string())
        })?;

    let rows_imported = load_rows(
        session,
        &spec,
        &dataset,
        options.batch_size,
        options.column_name_mode,
    )
    .await?;

    info!(table, rows_imported, "load complete");

    Ok(LoadResult {
        table: table.to_string(),
        rows_imported,
        columns: column_identifiers(dataset.columns(), options.column_name_mode, dialect),
    })
}

fn check_column_types(types: &TypeMap, dataset: &Dataset) -> Result<(), LoadError> {
    let names = types.names();
    if names.len() != dataset.num_columns()
        || names.iter().zip(dataset.columns()).any(|(a, b)| *a != b.as_str())
    {
        return Err(LoadError::InvalidInput(format!(
            "Column types {:?} do not match dataset columns {:?}",
            names,
            dataset.columns()
        )));
    }
    Ok(())
}

/// Read `path`, connect with `params` and load the file into `table`.
///
/// The file is read before connecting, so a bad file never opens a session.
/// The session is closed on every path.
///
/// # Errors
///
/// As [`load_dataset`], plus `LoadError::InvalidInput` for unreadable files
/// and `LoadError::Unexpected` when the database cannot be reached.
pub async fn import_file(
    params: &ConnectionParams,
    path: &Path,
    table: &str,
    source: &SourceOptions,
    options: &LoadOptions,
) -> Result<LoadResult, LoadError> {
    let dataset = read_file(path, source).map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to read source file");
        e
    })?;

    let mut session = connect(params).await.map_err(|e| {
        error!(database = %params, error = %e, "failed to connect");
        LoadError::Unexpected(format!("Failed to connect to {params}: {e}"))
    })?;

    let result = load_dataset(session.as_mut(), table, dataset, options).await;

    if let Err(e) = session.close().await {
        warn!(error = %e, "failed to close session");
    }

    result
}

/// Blocking version of [`load_dataset`].
///
/// Must not be called from within an async runtime.
///
/// # Errors
///
/// As [`load_dataset`].
pub fn blocking_load_dataset(
    session: &mut dyn Session,
    table: &str,
    dataset: Dataset,
    options: &LoadOptions,
) -> Result<LoadResult, LoadError> {
    blocking_runtime()?.block_on(load_dataset(session, table, dataset, options))
}

/// Blocking version of [`import_file`].
///
/// Must not be called from within an async runtime.
///
/// # Errors
///
/// As [`import_file`].
pub fn blocking_import_file(
    params: &ConnectionParams,
    path: &Path,
    table: &str,
    source: &SourceOptions,
    options: &LoadOptions,
) -> Result<LoadResult, LoadError> {
    blocking_runtime()?.block_on(import_file(params, path, table, source, options))
}

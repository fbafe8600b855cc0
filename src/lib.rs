//! # sheetload
//!
//! Load spreadsheet-like tabular files into relational tables, inferring
//! column types from the data.
//!
//! The library reads a file (or takes an in-memory [`Dataset`]), decides per
//! column a relational type that can hold every observed value, creates or
//! replaces the target table in a single transaction and inserts the rows in
//! batches.
//!
//! ## Features
//!
//! - **Type Inference**: BIGINT, DOUBLE PRECISION, BOOLEAN, TIMESTAMP, sized
//!   VARCHAR or TEXT per column, detected from the values themselves
//! - **Transactional DDL**: DROP and CREATE succeed or fail together
//! - **Batched Loading**: each batch of rows commits in its own transaction
//! - **Identifier Handling**: column names with spaces, mixed case or reserved
//!   words are quoted or sanitized
//! - **Sources**: spreadsheet workbooks (feature `excel`, on by default), CSV,
//!   Parquet and Arrow IPC files, or Arrow RecordBatches
//! - **Backends**: SQLite (default feature `sqlite`) and PostgreSQL
//!   (feature `postgres`)
//!
//! ## Load Example
//!
//! ```no_run
//! use sheetload::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = Dataset::from_columns(vec![
//!     ("id", vec![CellValue::Int(1), CellValue::Int(2)]),
//!     ("name", vec![CellValue::from("a"), CellValue::Null]),
//! ])?;
//!
//! let mut session = connect(&ConnectionParams::from_url("sqlite://people.db")?).await?;
//! let result = load_dataset(session.as_mut(), "people", dataset, &LoadOptions::default()).await?;
//! session.close().await?;
//!
//! println!("{}", serde_json::to_string(&result)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Inference Example
//!
//! ```
//! use sheetload::*;
//!
//! let dataset = Dataset::from_columns(vec![
//!     ("code", vec!["ab", "abcdefghij"]),
//! ])
//! .unwrap();
//!
//! let types = infer(&dataset);
//! assert_eq!(types.get("code"), Some(&RelationalType::Varchar { size: 15 }));
//! ```

// Module declarations
pub mod connection;
pub mod dataset;
pub mod error;
pub mod load;
pub mod logging;
pub mod query;
pub mod source;
pub mod types;

// =============================================================================
// Data Model
// =============================================================================

/// Re-export the in-memory table types.
pub use dataset::{CellValue, Dataset};

// =============================================================================
// Error Types
// =============================================================================

/// Re-export error types for convenient error handling.
pub use error::{ErrorCategory, LoadError, SessionError};

// =============================================================================
// Type System
// =============================================================================

/// Re-export type inference and mapping.
pub use types::{
    infer, infer_with, ColumnNameMode, ColumnType, InferenceOptions, RelationalType, TableSpec,
    TypeMap,
};

// =============================================================================
// Sessions
// =============================================================================

/// Database sessions and connection parameters.
pub use connection::{connect, ConnectionParams, Session};

// =============================================================================
// Load Pipeline
// =============================================================================

/// Load options and entry points.
///
/// # Example
///
/// ```
/// use sheetload::{DuplicateColumns, LoadOptions, TableMode};
///
/// let options = LoadOptions::new()
///     .with_table_mode(TableMode::Append)
///     .with_batch_size(5_000)
///     .with_duplicate_columns(DuplicateColumns::Reject);
/// assert_eq!(options.batch_size, 5_000);
/// ```
pub use load::{
    blocking_import_file, blocking_load_dataset, import_file, load_dataset, DuplicateColumns,
    LoadOptions, LoadResult, TableMode,
};

// =============================================================================
// Sources
// =============================================================================

/// File readers.
pub use source::{
    read_file, CsvReadOptions, ParquetReadOptions, SheetSelector, SourceFormat, SourceOptions,
    WorkbookReadOptions,
};

// =============================================================================
// Query Builder Types
// =============================================================================

/// SQL statement builders.
///
/// # Example
///
/// ```
/// use sheetload::query::{Dialect, InsertQuery};
///
/// let sql = InsertQuery::new("people")
///     .columns(vec!["id", "full name"])
///     .build(Dialect::Sqlite);
/// assert_eq!(sql, "INSERT INTO people (id, \"full name\") VALUES (?1, ?2)");
/// ```
pub use query::{CreateTableQuery, Dialect, DropTableQuery, InsertQuery};

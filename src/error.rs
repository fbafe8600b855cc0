//! Error types for sheetload.
//!
//! Two layers exist. [`SessionError`] is raised by database backends and knows
//! nothing about the load pipeline. [`LoadError`] is what callers of the
//! pipeline see: every failure is classified into one of four categories so the
//! outer surface (CLI, HTTP handler, ...) can map it without inspecting strings.

use serde::Serialize;
use thiserror::Error;

/// Errors raised by a database [`Session`](crate::connection::Session).
#[derive(Error, Debug)]
pub enum SessionError {
    /// The connection could not be established or was lost.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement was rejected by the database.
    #[error("Statement failed: {message} (SQL: {sql})")]
    Statement { sql: String, message: String },

    /// BEGIN/COMMIT/ROLLBACK failed.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// The session was already closed.
    #[error("Session is closed")]
    Closed,

    /// The connection URL is malformed or names an unsupported backend.
    #[error("Invalid connection parameters: {0}")]
    InvalidParams(String),

    /// The backend was not compiled into this build.
    #[error("Backend '{0}' is not enabled in this build")]
    BackendDisabled(&'static str),
}

impl SessionError {
    pub(crate) fn statement(sql: &str, err: impl std::fmt::Display) -> Self {
        SessionError::Statement {
            sql: sql.to_string(),
            message: err.to_string(),
        }
    }
}

/// Coarse classification of a [`LoadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request or its data was unusable; nothing was touched.
    InvalidInput,
    /// DROP/CREATE failed; no rows were loaded.
    SchemaCreation,
    /// The table exists but loading rows failed part way.
    Load,
    /// Anything else, e.g. the database could not be reached.
    Unexpected,
}

impl ErrorCategory {
    /// Stable snake_case name, as used in JSON error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::SchemaCreation => "schema_creation",
            ErrorCategory::Load => "load",
            ErrorCategory::Unexpected => "unexpected",
        }
    }
}

/// Errors returned by the load pipeline.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Missing table name, empty or malformed data source, mismatching schema.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The table could not be dropped or created.
    #[error("Failed to create table: {0}")]
    SchemaCreation(String),

    /// The table was created but a batch of rows could not be inserted.
    #[error("Failed to load data after {rows_loaded} rows: {message}")]
    Load { rows_loaded: u64, message: String },

    /// Anything not covered above.
    #[error("Internal error: {0}")]
    Unexpected(String),
}

impl LoadError {
    /// The category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            LoadError::InvalidInput(_) => ErrorCategory::InvalidInput,
            LoadError::SchemaCreation(_) => ErrorCategory::SchemaCreation,
            LoadError::Load { .. } => ErrorCategory::Load,
            LoadError::Unexpected(_) => ErrorCategory::Unexpected,
        }
    }

    /// JSON body describing this error, shaped like a service error response.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.to_string(),
            "category": self.category(),
        })
    }
}

impl From<::arrow::error::ArrowError> for LoadError {
    fn from(err: ::arrow::error::ArrowError) -> Self {
        LoadError::InvalidInput(format!("Arrow error: {err}"))
    }
}

impl From<::parquet::errors::ParquetError> for LoadError {
    fn from(err: ::parquet::errors::ParquetError) -> Self {
        LoadError::InvalidInput(format!("Parquet error: {err}"))
    }
}

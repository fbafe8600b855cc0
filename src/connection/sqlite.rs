//! SQLite session backed by rusqlite.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::Connection;
use tracing::debug;

use super::Session;
use crate::dataset::CellValue;
use crate::error::SessionError;
use crate::query::Dialect;

/// A session on a SQLite database file or an in-memory database.
///
/// All work runs synchronously on the calling task; SQLite has no network
/// round trips to overlap.
#[derive(Debug)]
pub struct SqliteSession {
    conn: Option<Connection>,
    path: String,
}

impl SqliteSession {
    /// Open or create a SQLite database at `path` (`:memory:` for in-memory).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Connection` if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let conn = if path_str == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path.as_ref())
        }
        .map_err(|e| {
            SessionError::Connection(format!("Failed to open SQLite database '{path_str}': {e}"))
        })?;

        Ok(Self {
            conn: Some(conn),
            path: path_str,
        })
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self, SessionError> {
        Self::open(":memory:")
    }

    /// Get the database path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The underlying connection, for reading results back.
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    fn conn_mut(&mut self) -> Result<&mut Connection, SessionError> {
        self.conn.as_mut().ok_or(SessionError::Closed)
    }

    fn run_ddl(&mut self, statements: &[String]) -> Result<(), SessionError> {
        let conn = self.conn_mut()?;
        let tx = conn
            .transaction()
            .map_err(|e| SessionError::Transaction(e.to_string()))?;

        for sql in statements {
            debug!(%sql, "executing DDL");
            tx.execute_batch(sql)
                .map_err(|e| SessionError::statement(sql, e))?;
        }

        tx.commit()
            .map_err(|e| SessionError::Transaction(e.to_string()))
    }

    fn run_batch(&mut self, sql: &str, rows: &[Vec<CellValue>]) -> Result<u64, SessionError> {
        let conn = self.conn_mut()?;
        let tx = conn
            .transaction()
            .map_err(|e| SessionError::Transaction(e.to_string()))?;

        let mut inserted = 0u64;
        {
            let mut stmt = tx
                .prepare(sql)
                .map_err(|e| SessionError::statement(sql, e))?;
            for row in rows {
                let changed = stmt
                    .execute(rusqlite::params_from_iter(row.iter()))
                    .map_err(|e| SessionError::statement(sql, e))?;
                inserted += changed as u64;
            }
        }

        tx.commit()
            .map_err(|e| SessionError::Transaction(e.to_string()))?;
        Ok(inserted)
    }
}

#[async_trait]
impl Session for SqliteSession {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute_ddl(&mut self, statements: &[String]) -> Result<(), SessionError> {
        self.run_ddl(statements)
    }

    async fn insert_batch(
        &mut self,
        sql: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<u64, SessionError> {
        self.run_batch(sql, rows)
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .map_err(|(_, e)| SessionError::Connection(e.to_string()))?;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.conn.is_none()
    }
}

/// Booleans bind as 0/1 and timestamps as `YYYY-MM-DD HH:MM:SS[.ffffff]` text,
/// SQLite's conventional storage for both.
impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Null => ToSqlOutput::Owned(Value::Null),
            CellValue::Int(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            CellValue::Float(v) => ToSqlOutput::Owned(Value::Real(*v)),
            CellValue::Bool(v) => ToSqlOutput::Owned(Value::Integer(i64::from(*v))),
            CellValue::Timestamp(_) => ToSqlOutput::Owned(Value::Text(self.to_string())),
            CellValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

//! Database sessions.
//!
//! This module provides connection parameter parsing and the [`Session`]
//! abstraction the load pipeline runs against, with a SQLite backend
//! (feature `sqlite`) and a PostgreSQL backend (feature `postgres`).

pub mod params;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use async_trait::async_trait;

use crate::dataset::CellValue;
use crate::error::SessionError;
use crate::query::Dialect;

pub use params::{ConnectionParams, DATABASE_URL_ENV};
#[cfg(feature = "postgres")]
pub use postgres::PostgresSession;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSession;

/// An open database session.
///
/// Implementations own exactly one connection. Statements passed in are
/// already rendered for [`Session::dialect`].
#[async_trait]
pub trait Session: Send {
    /// SQL dialect the session speaks.
    fn dialect(&self) -> Dialect;

    /// Execute DDL statements in a single transaction.
    ///
    /// Either every statement takes effect or none does.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if any statement fails; the transaction is rolled back.
    async fn execute_ddl(&mut self, statements: &[String]) -> Result<(), SessionError>;

    /// Insert `rows` with the parameterized statement `sql` in one transaction.
    ///
    /// # Returns
    ///
    /// The number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if any row is rejected; no row of the batch is kept.
    async fn insert_batch(&mut self, sql: &str, rows: &[Vec<CellValue>])
        -> Result<u64, SessionError>;

    /// Close the session. Closing twice is a no-op.
    async fn close(&mut self) -> Result<(), SessionError>;

    /// Whether [`Session::close`] has been called.
    fn is_closed(&self) -> bool;
}

/// Open a session for `params`.
///
/// # Errors
///
/// Returns `SessionError::Connection` if the database cannot be reached and
/// `SessionError::BackendDisabled` if the backend was compiled out.
pub async fn connect(params: &ConnectionParams) -> Result<Box<dyn Session>, SessionError> {
    match params {
        ConnectionParams::Sqlite { path } => connect_sqlite(path),
        ConnectionParams::Postgres { url } => connect_postgres(url).await,
    }
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(path: &std::path::Path) -> Result<Box<dyn Session>, SessionError> {
    Ok(Box::new(SqliteSession::open(path)?))
}

#[cfg(not(feature = "sqlite"))]
fn connect_sqlite(_path: &std::path::Path) -> Result<Box<dyn Session>, SessionError> {
    Err(SessionError::BackendDisabled("sqlite"))
}

#[cfg(feature = "postgres")]
async fn connect_postgres(url: &str) -> Result<Box<dyn Session>, SessionError> {
    Ok(Box::new(PostgresSession::connect(url).await?))
}

#[cfg(not(feature = "postgres"))]
async fn connect_postgres(_url: &str) -> Result<Box<dyn Session>, SessionError> {
    Err(SessionError::BackendDisabled("postgres"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_connect_sqlite_memory() {
        let mut session = connect(&ConnectionParams::sqlite_memory()).await.unwrap();
        assert_eq!(session.dialect(), Dialect::Sqlite);
        session.close().await.unwrap();
        assert!(session.is_closed());
        // second close is a no-op
        session.close().await.unwrap();
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn test_postgres_disabled() {
        let params = ConnectionParams::from_url("postgres://localhost/db").unwrap();
        assert!(matches!(
            connect(&params).await,
            Err(SessionError::BackendDisabled("postgres"))
        ));
    }
}

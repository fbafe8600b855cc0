//! PostgreSQL session backed by tokio-postgres.

use std::error::Error as StdError;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::task::JoinHandle;
use tokio_postgres::types::{IsNull, ToSql, Type};
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

use super::Session;
use crate::dataset::CellValue;
use crate::error::SessionError;
use crate::query::Dialect;

type BoxError = Box<dyn StdError + Sync + Send>;

/// A session on a PostgreSQL server.
///
/// The connection future is driven by a spawned tokio task that lives until
/// the session is closed or dropped.
pub struct PostgresSession {
    client: Option<Client>,
    connection_task: Option<JoinHandle<()>>,
}

impl PostgresSession {
    /// Connect to the server at `url`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Connection` if the server cannot be reached or
    /// rejects the credentials.
    pub async fn connect(url: &str) -> Result<Self, SessionError> {
        let (client, connection) = tokio_postgres::connect(url, NoTls)
            .await
            .map_err(|e| SessionError::Connection(e.to_string()))?;

        let connection_task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Self {
            client: Some(client),
            connection_task: Some(connection_task),
        })
    }

    /// The underlying client, for reading results back.
    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    fn client_mut(&mut self) -> Result<&mut Client, SessionError> {
        self.client.as_mut().ok_or(SessionError::Closed)
    }
}

#[async_trait]
impl Session for PostgresSession {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn execute_ddl(&mut self, statements: &[String]) -> Result<(), SessionError> {
        let client = self.client_mut()?;
        let tx = client
            .transaction()
            .await
            .map_err(|e| SessionError::Transaction(e.to_string()))?;

        for sql in statements {
            debug!(%sql, "executing DDL");
            tx.batch_execute(sql)
                .await
                .map_err(|e| SessionError::statement(sql, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| SessionError::Transaction(e.to_string()))
    }

    async fn insert_batch(
        &mut self,
        sql: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<u64, SessionError> {
        let client = self.client_mut()?;
        let tx = client
            .transaction()
            .await
            .map_err(|e| SessionError::Transaction(e.to_string()))?;

        let statement = tx
            .prepare(sql)
            .await
            .map_err(|e| SessionError::statement(sql, e))?;

        let mut inserted = 0u64;
        for row in rows {
            let params: Vec<&(dyn ToSql + Sync)> =
                row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
            inserted += tx
                .execute(&statement, &params)
                .await
                .map_err(|e| SessionError::statement(sql, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| SessionError::Transaction(e.to_string()))?;
        Ok(inserted)
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        // Dropping the client ends the connection future.
        drop(self.client.take());
        if let Some(task) = self.connection_task.take() {
            task.await
                .map_err(|e| SessionError::Connection(e.to_string()))?;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.client.is_none()
    }
}

impl Drop for PostgresSession {
    fn drop(&mut self) {
        if let Some(task) = self.connection_task.take() {
            task.abort();
        }
    }
}

/// Each variant binds through the matching Rust type's `ToSql`, so a value
/// whose type does not fit the target column is rejected instead of being
/// written with the wrong wire format.
impl ToSql for CellValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            CellValue::Null => Ok(IsNull::Yes),
            CellValue::Int(v) => v.to_sql(ty, out),
            CellValue::Float(v) => v.to_sql(ty, out),
            CellValue::Bool(v) => v.to_sql(ty, out),
            CellValue::Timestamp(v) => v.to_sql(ty, out),
            CellValue::Text(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn to_sql_checked(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            CellValue::Null => Ok(IsNull::Yes),
            CellValue::Int(v) => v.to_sql_checked(ty, out),
            CellValue::Float(v) => v.to_sql_checked(ty, out),
            CellValue::Bool(v) => v.to_sql_checked(ty, out),
            CellValue::Timestamp(v) => v.to_sql_checked(ty, out),
            CellValue::Text(v) => v.to_sql_checked(ty, out),
        }
    }
}

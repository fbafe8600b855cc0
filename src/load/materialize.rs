//! Table (re)creation.

use tracing::debug;

use super::TableMode;
use crate::connection::Session;
use crate::error::SessionError;
use crate::query::Dialect;
use crate::types::{ColumnNameMode, TableSpec};

/// DDL statements that bring the table into existence for `mode`.
pub fn ddl_statements(
    spec: &TableSpec,
    mode: TableMode,
    column_name_mode: ColumnNameMode,
    dialect: Dialect,
) -> Vec<String> {
    let create = spec.create_query(column_name_mode);
    match mode {
        TableMode::Replace => vec![
            spec.drop_query().build(dialect),
            create.build(dialect),
        ],
        TableMode::Append => vec![create.if_not_exists(true).build(dialect)],
        TableMode::Fail => vec![create.build(dialect)],
    }
}

/// Create (or replace) the table described by `spec` in one transaction.
///
/// On failure nothing is changed: with [`TableMode::Replace`] an existing
/// table survives a failed CREATE.
///
/// # Errors
///
/// Returns the `SessionError` of the first rejected statement.
pub async fn materialize(
    session: &mut dyn Session,
    spec: &TableSpec,
    mode: TableMode,
    column_name_mode: ColumnNameMode,
) -> Result<(), SessionError> {
    let statements = ddl_statements(spec, mode, column_name_mode, session.dialect());
    for sql in &statements {
        debug!(table = %spec.name, %sql, "prepared DDL");
    }
    session.execute_ddl(&statements).await
}

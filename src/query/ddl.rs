//! Builders for the DDL statements issued during table materialization.

use super::Dialect;
use crate::types::{ddl_column_names, ColumnNameMode, RelationalType};

/// Builder for `DROP TABLE` statements.
///
/// # Example
///
/// ```
/// use sheetload::query::{Dialect, DropTableQuery};
///
/// let sql = DropTableQuery::new("sales").schema("staging").build(Dialect::Postgres);
/// assert_eq!(sql, "DROP TABLE IF EXISTS staging.sales");
/// ```
#[derive(Debug, Clone)]
pub struct DropTableQuery {
    table: String,
    schema: Option<String>,
    if_exists: bool,
}

impl DropTableQuery {
    /// Create a builder for dropping `table`. `IF EXISTS` is on by default.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            schema: None,
            if_exists: true,
        }
    }

    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    pub fn if_exists(mut self, if_exists: bool) -> Self {
        self.if_exists = if_exists;
        self
    }

    /// Build the SQL statement.
    pub fn build(&self, dialect: Dialect) -> String {
        let table_ref = dialect.table_reference(self.schema.as_deref(), &self.table);
        if self.if_exists {
            format!("DROP TABLE IF EXISTS {table_ref}")
        } else {
            format!("DROP TABLE {table_ref}")
        }
    }
}

/// Builder for `CREATE TABLE` statements.
///
/// # Example
///
/// ```
/// use sheetload::query::{CreateTableQuery, Dialect};
/// use sheetload::types::RelationalType;
///
/// let sql = CreateTableQuery::new("sales")
///     .column("id", RelationalType::BigInt)
///     .column("unit price", RelationalType::Double)
///     .build(Dialect::Postgres);
/// assert!(sql.contains("\"unit price\" DOUBLE PRECISION"));
/// ```
#[derive(Debug, Clone)]
pub struct CreateTableQuery {
    table: String,
    schema: Option<String>,
    columns: Vec<(String, RelationalType)>,
    column_name_mode: ColumnNameMode,
    if_not_exists: bool,
}

impl CreateTableQuery {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            schema: None,
            columns: Vec::new(),
            column_name_mode: ColumnNameMode::default(),
            if_not_exists: false,
        }
    }

    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    /// Add a column definition. Columns are emitted in the order added.
    pub fn column(mut self, name: &str, relational_type: RelationalType) -> Self {
        self.columns.push((name.to_string(), relational_type));
        self
    }

    /// How column names are written into the statement.
    pub fn column_name_mode(mut self, mode: ColumnNameMode) -> Self {
        self.column_name_mode = mode;
        self
    }

    /// Emit `CREATE TABLE IF NOT EXISTS`.
    pub fn if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = if_not_exists;
        self
    }

    /// Build the SQL statement.
    pub fn build(&self, dialect: Dialect) -> String {
        let table_ref = dialect.table_reference(self.schema.as_deref(), &self.table);
        let names: Vec<&str> = self.columns.iter().map(|(n, _)| n.as_str()).collect();
        let ddl_names = ddl_column_names(&names, self.column_name_mode, dialect);

        let column_defs: Vec<String> = ddl_names
            .iter()
            .zip(&self.columns)
            .map(|(name, (_, ty))| format!("    {} {}", name, ty.to_ddl_type()))
            .collect();

        let create = if self.if_not_exists {
            "CREATE TABLE IF NOT EXISTS"
        } else {
            "CREATE TABLE"
        };

        format!("{create} {table_ref} (\n{}\n)", column_defs.join(",\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_table() {
        assert_eq!(
            DropTableQuery::new("sales").build(Dialect::Postgres),
            "DROP TABLE IF EXISTS sales"
        );
        assert_eq!(
            DropTableQuery::new("Sales")
                .if_exists(false)
                .build(Dialect::Postgres),
            "DROP TABLE \"Sales\""
        );
    }

    #[test]
    fn test_create_table_basic() {
        let sql = CreateTableQuery::new("my_table")
            .column("id", RelationalType::BigInt)
            .column("name", RelationalType::Varchar { size: 15 })
            .build(Dialect::Postgres);

        assert_eq!(
            sql,
            "CREATE TABLE my_table (\n    id BIGINT,\n    name VARCHAR(15)\n)"
        );
    }

    #[test]
    fn test_create_table_quotes_unsafe_names() {
        let sql = CreateTableQuery::new("my table")
            .schema("staging")
            .column("first name", RelationalType::Text)
            .column("select", RelationalType::Boolean)
            .column("Amount", RelationalType::Double)
            .build(Dialect::Postgres);

        assert!(sql.starts_with("CREATE TABLE staging.\"my table\" ("));
        assert!(sql.contains("\"first name\" TEXT"));
        assert!(sql.contains("\"select\" BOOLEAN"));
        assert!(sql.contains("\"Amount\" DOUBLE PRECISION"));
    }

    #[test]
    fn test_create_table_quoted_mode() {
        let sql = CreateTableQuery::new("t")
            .column("id", RelationalType::BigInt)
            .column_name_mode(ColumnNameMode::Quoted)
            .build(Dialect::Sqlite);
        assert!(sql.contains("\"id\" BIGINT"));
    }

    #[test]
    fn test_create_table_sanitize_mode() {
        let sql = CreateTableQuery::new("t")
            .column("Unit Price", RelationalType::Double)
            .column("unit_price", RelationalType::Double)
            .column_name_mode(ColumnNameMode::Sanitize)
            .build(Dialect::Postgres);
        assert!(sql.contains("unit_price DOUBLE PRECISION"));
        assert!(sql.contains("unit_price_2 DOUBLE PRECISION"));
    }

    #[test]
    fn test_create_table_if_not_exists() {
        let sql = CreateTableQuery::new("t")
            .column("a", RelationalType::Timestamp)
            .if_not_exists(true)
            .build(Dialect::Sqlite);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS t ("));
    }
}

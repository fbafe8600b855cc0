//! Builder for parameterized INSERT statements.

use super::Dialect;
use crate::types::{ddl_column_names, ColumnNameMode};

/// Builder for a single-row parameterized `INSERT` statement.
///
/// The statement is prepared once and executed for every row of a batch.
///
/// # Example
///
/// ```
/// use sheetload::query::{Dialect, InsertQuery};
///
/// let sql = InsertQuery::new("sales")
///     .columns(vec!["id", "unit price"])
///     .build(Dialect::Postgres);
/// assert_eq!(sql, "INSERT INTO sales (id, \"unit price\") VALUES ($1, $2)");
/// ```
#[derive(Debug, Clone)]
pub struct InsertQuery {
    table: String,
    schema: Option<String>,
    columns: Vec<String>,
    column_name_mode: ColumnNameMode,
}

impl InsertQuery {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            schema: None,
            columns: Vec::new(),
            column_name_mode: ColumnNameMode::default(),
        }
    }

    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    /// Set the target columns, in bind order.
    pub fn columns(mut self, cols: Vec<&str>) -> Self {
        self.columns = cols.into_iter().map(String::from).collect();
        self
    }

    /// Must match the mode the table was created with.
    pub fn column_name_mode(mut self, mode: ColumnNameMode) -> Self {
        self.column_name_mode = mode;
        self
    }

    /// Number of bind parameters per row.
    pub fn parameter_count(&self) -> usize {
        self.columns.len()
    }

    /// Build the SQL statement.
    pub fn build(&self, dialect: Dialect) -> String {
        let table_ref = dialect.table_reference(self.schema.as_deref(), &self.table);
        let names = ddl_column_names(&self.columns, self.column_name_mode, dialect);
        let placeholders: Vec<String> = (1..=self.columns.len())
            .map(|i| dialect.placeholder(i))
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table_ref,
            names.join(", "),
            placeholders.join(", ")
        )
    }
}

//! Target table description.

use serde::Serialize;

use super::infer::TypeMap;
use super::mapping::ColumnNameMode;
use crate::query::{CreateTableQuery, DropTableQuery, InsertQuery};

/// A table to materialize: its name and the column types to create it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSpec {
    /// Optional schema the table lives in.
    pub schema: Option<String>,
    /// Table name as supplied by the caller.
    pub name: String,
    /// Column types in creation order.
    pub columns: TypeMap,
}

impl TableSpec {
    pub fn new(name: impl Into<String>, columns: TypeMap) -> Self {
        Self {
            schema: None,
            name: name.into(),
            columns,
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema;
        self
    }

    /// `DROP TABLE IF EXISTS` for this table.
    pub fn drop_query(&self) -> DropTableQuery {
        let query = DropTableQuery::new(&self.name);
        match &self.schema {
            Some(schema) => query.schema(schema),
            None => query,
        }
    }

    /// `CREATE TABLE` listing every column of the type map.
    pub fn create_query(&self, mode: ColumnNameMode) -> CreateTableQuery {
        let mut query = CreateTableQuery::new(&self.name).column_name_mode(mode);
        if let Some(schema) = &self.schema {
            query = query.schema(schema);
        }
        for column in &self.columns {
            query = query.column(&column.name, column.relational_type);
        }
        query
    }

    /// Parameterized `INSERT` covering every column of the type map.
    pub fn insert_query(&self, mode: ColumnNameMode) -> InsertQuery {
        let mut query = InsertQuery::new(&self.name)
            .columns(self.columns.names())
            .column_name_mode(mode);
        if let Some(schema) = &self.schema {
            query = query.schema(schema);
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Dialect;
    use crate::types::{ColumnType, RelationalType};

    fn spec() -> TableSpec {
        TableSpec::new(
            "sales",
            TypeMap::new(vec![
                ColumnType::new("id", RelationalType::BigInt),
                ColumnType::new("Region", RelationalType::Varchar { size: 9 }),
            ]),
        )
    }

    #[test]
    fn test_queries_share_naming() {
        let spec = spec().with_schema(Some("staging".into()));
        let dialect = Dialect::Postgres;

        assert_eq!(
            spec.drop_query().build(dialect),
            "DROP TABLE IF EXISTS staging.sales"
        );

        let create = spec.create_query(ColumnNameMode::Auto).build(dialect);
        assert!(create.starts_with("CREATE TABLE staging.sales ("));
        assert!(create.contains("id BIGINT"));
        assert!(create.contains("\"Region\" VARCHAR(9)"));

        assert_eq!(
            spec.insert_query(ColumnNameMode::Auto).build(dialect),
            "INSERT INTO staging.sales (id, \"Region\") VALUES ($1, $2)"
        );
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(spec()).unwrap();
        assert_eq!(json["name"], "sales");
        assert_eq!(json["columns"][1]["name"], "Region");
        assert_eq!(json["columns"][1]["relational_type"]["type"], "VARCHAR");
    }
}

//! SQL generation.
//!
//! This module provides builders for the three kinds of statements the loader
//! issues, plus the dialect rules they share:
//! - `dialect` - identifier validity, quoting and bind placeholders
//! - `ddl` - `DROP TABLE` and `CREATE TABLE`
//! - `insert` - parameterized single-row `INSERT`
//!

pub mod ddl;
pub mod dialect;
pub mod insert;

pub use ddl::{CreateTableQuery, DropTableQuery};
pub use dialect::Dialect;
pub use insert::InsertQuery;

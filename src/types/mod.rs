//! Column type inference and the relational type system.

pub(crate) mod conversion;
mod infer;
mod mapping;
mod schema;

pub use conversion::{coerce_value, parse_bool, parse_timestamp};
pub use infer::{
    bounded_text_type, column_identifiers, ddl_column_names, format_column_name, infer, infer_with,
    sanitize_column_name, ColumnType, InferenceOptions, TypeMap, DEFAULT_LENGTH_MARGIN,
    DEFAULT_MAX_BOUNDED_LENGTH,
};
pub use mapping::{baseline_type, ColumnKind, ColumnNameMode, RelationalType};
pub use schema::TableSpec;

//! Relational column types and the kind → type mapping table.

use serde::{Deserialize, Serialize};

/// Column name handling mode for DDL generation.
///
/// Controls how column names from the source dataset are written into
/// CREATE TABLE and INSERT statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnNameMode {
    /// Emit the name bare when it is a valid unquoted identifier in the
    /// target dialect, quote it otherwise.
    ///
    /// Example: `amount` stays `amount`, `unit price` becomes `"unit price"`.
    #[default]
    Auto,

    /// Preserve original column names exactly, wrapped in double quotes.
    ///
    /// This mode:
    /// - Wraps all names in double quotes
    /// - Escapes internal double quotes by doubling them
    /// - Preserves case sensitivity and special characters
    Quoted,

    /// Rewrite column names into valid unquoted identifiers.
    ///
    /// This mode:
    /// - Converts names to lowercase
    /// - Replaces invalid identifier characters with underscores
    /// - Prefixes names starting with digits with an underscore
    /// - Appends an underscore to reserved words
    ///
    /// Example: `Unit Price` becomes `unit_price`
    Sanitize,
}

/// Relational type assigned to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum RelationalType {
    /// BIGINT
    #[serde(rename = "BIGINT")]
    BigInt,

    /// DOUBLE PRECISION
    #[serde(rename = "DOUBLE PRECISION")]
    Double,

    /// BOOLEAN
    #[serde(rename = "BOOLEAN")]
    Boolean,

    /// TIMESTAMP (without time zone)
    #[serde(rename = "TIMESTAMP")]
    Timestamp,

    /// VARCHAR(n)
    #[serde(rename = "VARCHAR")]
    Varchar { size: usize },

    /// TEXT
    #[serde(rename = "TEXT")]
    Text,
}

impl RelationalType {
    /// Convert this type to a DDL type string suitable for CREATE TABLE statements.
    #[must_use]
    pub fn to_ddl_type(&self) -> String {
        match self {
            RelationalType::BigInt => "BIGINT".to_string(),
            RelationalType::Double => "DOUBLE PRECISION".to_string(),
            RelationalType::Boolean => "BOOLEAN".to_string(),
            RelationalType::Timestamp => "TIMESTAMP".to_string(),
            RelationalType::Varchar { size } => format!("VARCHAR({size})"),
            RelationalType::Text => "TEXT".to_string(),
        }
    }

    /// Whether values are stored as text in this column.
    pub fn is_textual(&self) -> bool {
        matches!(self, RelationalType::Varchar { .. } | RelationalType::Text)
    }
}

impl std::fmt::Display for RelationalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_ddl_type())
    }
}

/// Scalar kind observed for a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Timestamp,
    /// Text, a mix of incompatible kinds, or nothing observed at all.
    Textual,
}

impl ColumnKind {
    /// Widen two kinds to one that represents values of both.
    ///
    /// - Identical kinds remain unchanged
    /// - Integer + Float -> Float
    /// - Anything else -> Textual
    #[must_use]
    pub fn widen(self, other: ColumnKind) -> ColumnKind {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Textual,
        }
    }
}

/// Baseline relational type for an observed column kind.
///
/// | kind      | type             |
/// |-----------|------------------|
/// | Integer   | BIGINT           |
/// | Float     | DOUBLE PRECISION |
/// | Boolean   | BOOLEAN          |
/// | Timestamp | TIMESTAMP        |
/// | Textual   | TEXT             |
pub const fn baseline_type(kind: ColumnKind) -> RelationalType {
    match kind {
        ColumnKind::Integer => RelationalType::BigInt,
        ColumnKind::Float => RelationalType::Double,
        ColumnKind::Boolean => RelationalType::Boolean,
        ColumnKind::Timestamp => RelationalType::Timestamp,
        ColumnKind::Textual => RelationalType::Text,
    }
}

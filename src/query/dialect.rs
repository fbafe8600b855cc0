//! SQL dialect rules: identifier validity, quoting, and bind placeholders.

use serde::{Deserialize, Serialize};

/// Keywords PostgreSQL reserves in column and table positions.
const POSTGRES_RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "between", "bigint", "binary", "bit", "boolean", "both", "case", "cast",
    "char", "character", "check", "coalesce", "collate", "collation", "column", "concurrently",
    "constraint", "create", "cross", "current_catalog", "current_date", "current_role",
    "current_schema", "current_time", "current_timestamp", "current_user", "dec", "decimal",
    "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "exists",
    "extract", "false", "fetch", "float", "for", "foreign", "freeze", "from", "full", "grant",
    "greatest", "group", "grouping", "having", "ilike", "in", "initially", "inner", "inout",
    "int", "integer", "intersect", "interval", "into", "is", "isnull", "join", "lateral",
    "leading", "least", "left", "like", "limit", "localtime", "localtimestamp", "national",
    "natural", "nchar", "none", "normalize", "not", "notnull", "null", "nullif", "numeric",
    "offset", "on", "only", "or", "order", "out", "outer", "overlaps", "overlay", "placing",
    "position", "precision", "primary", "real", "references", "returning", "right", "row",
    "select", "session_user", "setof", "similar", "smallint", "some", "substring",
    "symmetric", "system_user", "table", "tablesample", "then", "time", "timestamp", "to",
    "trailing", "treat", "trim", "true", "union", "unique", "user", "using", "values",
    "varchar", "variadic", "verbose", "when", "where", "window", "with", "xmlattributes",
    "xmlconcat", "xmlelement", "xmlexists", "xmlforest", "xmlparse", "xmlpi", "xmlroot",
    "xmlserialize", "xmltable",
];

/// SQLite keywords.
const SQLITE_RESERVED: &[&str] = &[
    "abort", "action", "add", "after", "all", "alter", "always", "analyze", "and", "as", "asc",
    "attach", "autoincrement", "before", "begin", "between", "by", "cascade", "case", "cast",
    "check", "collate", "column", "commit", "conflict", "constraint", "create", "cross",
    "current", "current_date", "current_time", "current_timestamp", "database", "default",
    "deferrable", "deferred", "delete", "desc", "detach", "distinct", "do", "drop", "each",
    "else", "end", "escape", "except", "exclude", "exclusive", "exists", "explain", "fail",
    "filter", "first", "following", "for", "foreign", "from", "full", "generated", "glob",
    "group", "groups", "having", "if", "ignore", "immediate", "in", "index", "indexed",
    "initially", "inner", "insert", "instead", "intersect", "into", "is", "isnull", "join",
    "key", "last", "left", "like", "limit", "match", "materialized", "natural", "no", "not",
    "nothing", "notnull", "null", "nulls", "of", "offset", "on", "or", "order", "others",
    "outer", "over", "partition", "plan", "pragma", "preceding", "primary", "query", "raise",
    "range", "recursive", "references", "regexp", "reindex", "release", "rename", "replace",
    "restrict", "returning", "right", "rollback", "row", "rows", "savepoint", "select", "set",
    "table", "temp", "temporary", "then", "ties", "to", "transaction", "trigger", "unbounded",
    "union", "unique", "update", "using", "vacuum", "values", "view", "virtual", "when",
    "where", "window", "with", "without",
];

/// Longest identifier PostgreSQL keeps, in bytes. Longer names are truncated.
pub const POSTGRES_MAX_IDENTIFIER_BYTES: usize = 63;

/// Cut `s` to at most `max` bytes on a character boundary.
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// PostgreSQL: unquoted identifiers fold to lowercase, `$n` placeholders.
    #[default]
    Postgres,
    /// SQLite: case-insensitive identifiers, `?n` placeholders.
    Sqlite,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Whether `word` is a keyword that cannot be used as a bare identifier.
    pub fn is_reserved(&self, word: &str) -> bool {
        let lower = word.to_ascii_lowercase();
        let list = match self {
            Dialect::Postgres => POSTGRES_RESERVED,
            Dialect::Sqlite => SQLITE_RESERVED,
        };
        list.contains(&lower.as_str())
    }

    /// Whether `name` can be emitted unquoted and still refer to exactly `name`.
    ///
    /// Requires a leading ASCII letter or underscore, only ASCII letters,
    /// digits and underscores after that, and no reserved word. PostgreSQL
    /// additionally rejects uppercase letters, which it would fold away.
    pub fn is_bare_identifier(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return false;
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
        if *self == Dialect::Postgres && name.chars().any(|c| c.is_ascii_uppercase()) {
            return false;
        }
        !self.is_reserved(name)
    }

    /// Maximum identifier length in bytes, for dialects that truncate.
    pub const fn max_identifier_bytes(&self) -> Option<usize> {
        match self {
            Dialect::Postgres => Some(POSTGRES_MAX_IDENTIFIER_BYTES),
            Dialect::Sqlite => None,
        }
    }

    /// `name` as the database will store it.
    pub fn truncate_identifier<'a>(&self, name: &'a str) -> &'a str {
        match self.max_identifier_bytes() {
            Some(max) => truncate_bytes(name, max),
            None => name,
        }
    }

    /// The form the database compares identifiers in.
    ///
    /// Two names with equal keys collide in one table. SQLite folds ASCII
    /// case even for quoted identifiers; PostgreSQL compares the truncated
    /// bytes.
    pub fn identifier_key(&self, name: &str) -> String {
        match self {
            Dialect::Postgres => self.truncate_identifier(name).to_string(),
            Dialect::Sqlite => name.to_ascii_lowercase(),
        }
    }

    /// `base` followed by `suffix`, shortening `base` so the suffix survives
    /// truncation.
    #[must_use]
    pub fn suffixed_identifier(&self, base: &str, suffix: &str) -> String {
        let base = match self.max_identifier_bytes() {
            Some(max) => truncate_bytes(base, max.saturating_sub(suffix.len())),
            None => base,
        };
        format!("{base}{suffix}")
    }

    /// Wrap `name` in double quotes, doubling any embedded double quotes.
    ///
    /// # Example
    ///
    /// ```ignore
    /// assert_eq!(Dialect::Postgres.quote_identifier("col\"name"), "\"col\"\"name\"");
    /// ```
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        let escaped = name.replace('"', "\"\"");
        format!("\"{escaped}\"")
    }

    /// Emit `name` bare when safe, quoted otherwise.
    #[must_use]
    pub fn format_identifier(&self, name: &str) -> String {
        if self.is_bare_identifier(name) {
            name.to_string()
        } else {
            self.quote_identifier(name)
        }
    }

    /// Qualified table reference, each part formatted with [`format_identifier`](Self::format_identifier).
    #[must_use]
    pub fn table_reference(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(schema) => format!(
                "{}.{}",
                self.format_identifier(schema),
                self.format_identifier(table)
            ),
            None => self.format_identifier(table),
        }
    }

    /// Positional bind placeholder for the 1-based parameter `index`.
    #[must_use]
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Sqlite => format!("?{index}"),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

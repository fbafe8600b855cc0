//! Schema inference from observed cell values.
//!
//! Every column is classified independently: each value is tagged with its
//! scalar kind, the kinds are folded into one column kind, and the column kind
//! is mapped to a relational type. Textual columns get two refinements: they
//! become TIMESTAMP when every value parses as a date, and otherwise become a
//! bounded VARCHAR when all values are short.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::conversion::parse_timestamp;
use super::mapping::{baseline_type, ColumnKind, ColumnNameMode, RelationalType};
use crate::dataset::{CellValue, Dataset};
use crate::query::Dialect;

/// Default length below which textual columns are bounded.
pub const DEFAULT_MAX_BOUNDED_LENGTH: usize = 255;

/// Default headroom applied to the longest observed text value.
pub const DEFAULT_LENGTH_MARGIN: f64 = 1.5;

/// Options for type inference.
///
/// # Example
///
/// ```ignore
/// let options = InferenceOptions::new()
///     .with_max_bounded_length(100)
///     .with_length_margin(2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOptions {
    /// Textual columns whose longest value is shorter than this become
    /// `VARCHAR(n)`; longer ones become `TEXT` (default: 255).
    pub max_bounded_length: usize,
    /// Multiplier applied to the longest value to size `VARCHAR(n)` (default: 1.5).
    pub length_margin: f64,
    /// Reclassify textual columns as TIMESTAMP when every value parses as a
    /// date (default: `true`).
    pub detect_timestamps: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            max_bounded_length: DEFAULT_MAX_BOUNDED_LENGTH,
            length_margin: DEFAULT_LENGTH_MARGIN,
            detect_timestamps: true,
        }
    }
}

impl InferenceOptions {
    /// Create a new `InferenceOptions` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_bounded_length(mut self, length: usize) -> Self {
        self.max_bounded_length = length;
        self
    }

    #[must_use]
    pub fn with_length_margin(mut self, margin: f64) -> Self {
        self.length_margin = margin;
        self
    }

    #[must_use]
    pub fn with_detect_timestamps(mut self, detect: bool) -> Self {
        self.detect_timestamps = detect;
        self
    }
}

/// Inferred type of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnType {
    /// Original column name from the dataset.
    pub name: String,
    /// Inferred relational type.
    pub relational_type: RelationalType,
}

impl ColumnType {
    pub fn new(name: impl Into<String>, relational_type: RelationalType) -> Self {
        Self {
            name: name.into(),
            relational_type,
        }
    }
}

/// Column types in dataset order.
///
/// Backed by a `Vec` so that repeated column names each keep their own entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeMap {
    columns: Vec<ColumnType>,
}

impl TypeMap {
    pub fn new(columns: Vec<ColumnType>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnType> {
        self.columns.iter()
    }

    /// Type of the first column named `name`.
    pub fn get(&self, name: &str) -> Option<&RelationalType> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.relational_type)
    }

    /// Column names in order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Relational types in order.
    pub fn types(&self) -> Vec<RelationalType> {
        self.columns.iter().map(|c| c.relational_type).collect()
    }
}

impl FromIterator<ColumnType> for TypeMap {
    fn from_iter<I: IntoIterator<Item = ColumnType>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TypeMap {
    type Item = &'a ColumnType;
    type IntoIter = std::slice::Iter<'a, ColumnType>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Infer a relational type for every column of `dataset` with default options.
pub fn infer(dataset: &Dataset) -> TypeMap {
    infer_with(dataset, &InferenceOptions::default())
}

/// Infer a relational type for every column of `dataset`.
///
/// Returns exactly one entry per column, in column order.
pub fn infer_with(dataset: &Dataset, options: &InferenceOptions) -> TypeMap {
    dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let relational_type = infer_column(dataset.column_values(idx), options);
            debug!(column = %name, %relational_type, "inferred column type");
            ColumnType::new(name.clone(), relational_type)
        })
        .collect()
}

/// Scalar kind of a single value; `None` for null.
fn value_kind(value: &CellValue) -> Option<ColumnKind> {
    match value {
        CellValue::Null => None,
        CellValue::Int(_) => Some(ColumnKind::Integer),
        CellValue::Float(_) => Some(ColumnKind::Float),
        CellValue::Bool(_) => Some(ColumnKind::Boolean),
        CellValue::Timestamp(_) => Some(ColumnKind::Timestamp),
        CellValue::Text(_) => Some(ColumnKind::Textual),
    }
}

/// Fold the kinds of all non-null values; `None` when nothing was observed.
fn observed_kind<'a>(values: impl Iterator<Item = &'a CellValue>) -> Option<ColumnKind> {
    values
        .filter_map(value_kind)
        .reduce(|acc, kind| acc.widen(kind))
}

fn infer_column<'a>(
    values: impl Iterator<Item = &'a CellValue> + Clone,
    options: &InferenceOptions,
) -> RelationalType {
    match observed_kind(values.clone()) {
        None => RelationalType::Text,
        Some(ColumnKind::Textual) => refine_textual(values, options),
        Some(kind) => baseline_type(kind),
    }
}

fn refine_textual<'a>(
    values: impl Iterator<Item = &'a CellValue>,
    options: &InferenceOptions,
) -> RelationalType {
    let texts: Vec<String> = values
        .filter(|v| !v.is_null())
        .map(ToString::to_string)
        .collect();

    if texts.is_empty() {
        return RelationalType::Text;
    }

    if options.detect_timestamps && texts.iter().all(|t| parse_timestamp(t).is_some()) {
        return RelationalType::Timestamp;
    }

    let max_len = texts.iter().map(|t| t.chars().count()).max().unwrap_or(0);
    bounded_text_type(max_len, options)
}

/// `VARCHAR(ceil(max_len * margin))` when `max_len` is below the bound, `TEXT` otherwise.
pub fn bounded_text_type(max_len: usize, options: &InferenceOptions) -> RelationalType {
    if max_len >= options.max_bounded_length {
        return RelationalType::Text;
    }
    let size = (max_len as f64 * options.length_margin).ceil() as usize;
    RelationalType::Varchar { size: size.max(1) }
}

/// Sanitize a column name to be a valid unquoted identifier.
///
/// This function:
/// - Converts the name to lowercase
/// - Replaces invalid identifier characters with underscores
/// - Prefixes names starting with digits with an underscore
/// - Appends an underscore to reserved words
///
/// # Example
///
/// ```ignore
/// assert_eq!(sanitize_column_name("my Column", Dialect::Postgres), "my_column");
/// assert_eq!(sanitize_column_name("123abc", Dialect::Postgres), "_123abc");
/// ```
#[must_use]
pub fn sanitize_column_name(name: &str, dialect: Dialect) -> String {
    let mut result: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if result.is_empty() {
        return "_".to_string();
    }

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result = format!("_{result}");
    }

    if dialect.is_reserved(&result) {
        result.push('_');
    }

    result
}

/// Format a column name according to the specified mode.
#[must_use]
pub fn format_column_name(name: &str, mode: ColumnNameMode, dialect: Dialect) -> String {
    match mode {
        ColumnNameMode::Auto => dialect.format_identifier(name),
        ColumnNameMode::Quoted => dialect.quote_identifier(name),
        ColumnNameMode::Sanitize => sanitize_column_name(name, dialect),
    }
}

/// The identifiers a table gets for `names`, unquoted.
///
/// Names are cut to the dialect's identifier limit. Sanitizing can map
/// distinct names onto the same identifier (`a b` and `a_b`); later
/// collisions get a numeric suffix so the result stays unique.
#[must_use]
pub fn column_identifiers<S: AsRef<str>>(
    names: &[S],
    mode: ColumnNameMode,
    dialect: Dialect,
) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());
    names
        .iter()
        .map(|name| {
            let ident = match mode {
                ColumnNameMode::Sanitize => sanitize_column_name(name.as_ref(), dialect),
                ColumnNameMode::Auto | ColumnNameMode::Quoted => name.as_ref().to_string(),
            };
            let ident = dialect.truncate_identifier(&ident).to_string();
            if mode != ColumnNameMode::Sanitize || used.insert(dialect.identifier_key(&ident)) {
                return ident;
            }
            let mut suffix = 2;
            loop {
                let candidate = dialect.suffixed_identifier(&ident, &format!("_{suffix}"));
                if used.insert(dialect.identifier_key(&candidate)) {
                    return candidate;
                }
                suffix += 1;
            }
        })
        .collect()
}

/// Format a list of column names for DDL and DML.
#[must_use]
pub fn ddl_column_names<S: AsRef<str>>(
    names: &[S],
    mode: ColumnNameMode,
    dialect: Dialect,
) -> Vec<String> {
    column_identifiers(names, mode, dialect)
        .into_iter()
        .map(|ident| match mode {
            ColumnNameMode::Auto => dialect.format_identifier(&ident),
            ColumnNameMode::Quoted => dialect.quote_identifier(&ident),
            ColumnNameMode::Sanitize => ident,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn column(name: &str, values: Vec<CellValue>) -> Dataset {
        Dataset::from_columns(vec![(name, values)]).unwrap()
    }

    fn single_type(dataset: &Dataset) -> RelationalType {
        let types = infer(dataset);
        assert_eq!(types.len(), 1);
        types.iter().next().unwrap().relational_type
    }

    #[test]
    fn test_one_entry_per_column_in_order() {
        let ds = Dataset::from_columns(vec![
            ("b", vec![CellValue::Int(1)]),
            ("a", vec![CellValue::Float(1.5)]),
            ("b", vec![CellValue::Bool(true)]),
        ])
        .unwrap();

        let types = infer(&ds);
        assert_eq!(types.names(), vec!["b", "a", "b"]);
        assert_eq!(
            types.types(),
            vec![
                RelationalType::BigInt,
                RelationalType::Double,
                RelationalType::Boolean
            ]
        );
    }

    #[test]
    fn test_integer_column() {
        let ds = column("n", vec![1i64.into(), 2i64.into(), 3i64.into()]);
        assert_eq!(single_type(&ds), RelationalType::BigInt);
    }

    #[test]
    fn test_single_float_flips_integer_column() {
        let ds = column("n", vec![1i64.into(), 2.5f64.into(), 3i64.into()]);
        assert_eq!(single_type(&ds), RelationalType::Double);
    }

    #[test]
    fn test_integral_floats_stay_double() {
        let ds = column("n", vec![1.0f64.into(), 2.0f64.into()]);
        assert_eq!(single_type(&ds), RelationalType::Double);
    }

    #[test]
    fn test_boolean_and_native_timestamp() {
        let ds = column("b", vec![true.into(), CellValue::Null, false.into()]);
        assert_eq!(single_type(&ds), RelationalType::Boolean);

        let ts = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let ds = column("t", vec![ts.into()]);
        assert_eq!(single_type(&ds), RelationalType::Timestamp);
    }

    #[test]
    fn test_date_strings_become_timestamp() {
        let ds = column("d", vec!["2023-01-05".into(), "2023-02-10".into()]);
        assert_eq!(single_type(&ds), RelationalType::Timestamp);
    }

    #[test]
    fn test_one_non_date_forces_text() {
        let ds = column(
            "d",
            vec!["2023-01-05".into(), "2023-02-10".into(), "N/A".into()],
        );
        assert_eq!(single_type(&ds), RelationalType::Varchar { size: 15 });
    }

    #[test]
    fn test_timestamp_detection_can_be_disabled() {
        let ds = column("d", vec!["2023-01-05".into()]);
        let types = infer_with(&ds, &InferenceOptions::new().with_detect_timestamps(false));
        assert_eq!(
            types.get("d"),
            Some(&RelationalType::Varchar { size: 15 })
        );
    }

    #[test]
    fn test_bounded_text_length_ten() {
        let ds = column("s", vec!["abcdefghij".into(), "abc".into()]);
        assert_eq!(single_type(&ds), RelationalType::Varchar { size: 15 });
    }

    #[test]
    fn test_long_text_is_unbounded() {
        let ds = column("s", vec!["x".repeat(300).into(), "short".into()]);
        assert_eq!(single_type(&ds), RelationalType::Text);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let ds = column("s", vec!["x".repeat(254).into()]);
        assert_eq!(single_type(&ds), RelationalType::Varchar { size: 381 });

        let ds = column("s", vec!["x".repeat(255).into()]);
        assert_eq!(single_type(&ds), RelationalType::Text);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let ds = column("s", vec!["äöü".into()]);
        assert_eq!(single_type(&ds), RelationalType::Varchar { size: 5 });
    }

    #[test]
    fn test_mixed_kinds_use_textual_representation() {
        let ds = column("m", vec![CellValue::Int(12345), "ab".into()]);
        // "12345" is the longest representation: ceil(5 * 1.5) = 8
        assert_eq!(single_type(&ds), RelationalType::Varchar { size: 8 });

        let ds = column("m", vec![CellValue::Bool(true), CellValue::Int(1)]);
        assert_eq!(single_type(&ds), RelationalType::Varchar { size: 6 });
    }

    #[test]
    fn test_empty_dataset_is_unbounded_text() {
        let ds = Dataset::new(vec!["a".into(), "b".into()], vec![]).unwrap();
        let types = infer(&ds);
        assert_eq!(types.types(), vec![RelationalType::Text, RelationalType::Text]);
    }

    #[test]
    fn test_all_null_column_is_unbounded_text() {
        let ds = column("n", vec![CellValue::Null, "".into()]);
        assert_eq!(single_type(&ds), RelationalType::Text);
    }

    #[test]
    fn test_columns_are_independent() {
        let ds = Dataset::from_columns(vec![
            ("d", vec![CellValue::from("2023-01-05"), "2023-01-06".into()]),
            ("s", vec![CellValue::from("N/A"), "x".into()]),
        ])
        .unwrap();
        let types = infer(&ds);
        assert_eq!(types.get("d"), Some(&RelationalType::Timestamp));
        assert_eq!(types.get("s"), Some(&RelationalType::Varchar { size: 5 }));
    }

    #[test]
    fn test_custom_bounds() {
        let options = InferenceOptions::new()
            .with_max_bounded_length(4)
            .with_length_margin(2.0);
        assert_eq!(
            bounded_text_type(3, &options),
            RelationalType::Varchar { size: 6 }
        );
        assert_eq!(bounded_text_type(4, &options), RelationalType::Text);
    }

    #[test]
    fn test_sanitize_column_name() {
        assert_eq!(sanitize_column_name("name", Dialect::Postgres), "name");
        assert_eq!(sanitize_column_name("My Column", Dialect::Postgres), "my_column");
        assert_eq!(sanitize_column_name("col@#$%", Dialect::Postgres), "col____");
        assert_eq!(sanitize_column_name("123abc", Dialect::Postgres), "_123abc");
        assert_eq!(sanitize_column_name("", Dialect::Postgres), "_");
        assert_eq!(sanitize_column_name("select", Dialect::Postgres), "select_");
        assert_eq!(sanitize_column_name("Order", Dialect::Sqlite), "order_");
    }

    #[test]
    fn test_format_column_name_modes() {
        assert_eq!(
            format_column_name("amount", ColumnNameMode::Auto, Dialect::Postgres),
            "amount"
        );
        assert_eq!(
            format_column_name("unit price", ColumnNameMode::Auto, Dialect::Postgres),
            "\"unit price\""
        );
        assert_eq!(
            format_column_name("amount", ColumnNameMode::Quoted, Dialect::Postgres),
            "\"amount\""
        );
        assert_eq!(
            format_column_name("Unit Price", ColumnNameMode::Sanitize, Dialect::Postgres),
            "unit_price"
        );
    }

    #[test]
    fn test_ddl_column_names_resolves_sanitize_collisions() {
        let names = ["a b", "a_b", "A-B"];
        assert_eq!(
            ddl_column_names(&names, ColumnNameMode::Sanitize, Dialect::Postgres),
            vec!["a_b", "a_b_2", "a_b_3"]
        );
        assert_eq!(
            ddl_column_names(&names, ColumnNameMode::Auto, Dialect::Postgres),
            vec!["\"a b\"", "a_b", "\"A-B\""]
        );
    }

    #[test]
    fn test_column_identifiers_are_unquoted() {
        let names = ["Unit Price", "order"];
        assert_eq!(
            column_identifiers(&names, ColumnNameMode::Auto, Dialect::Postgres),
            vec!["Unit Price", "order"]
        );
        assert_eq!(
            column_identifiers(&names, ColumnNameMode::Sanitize, Dialect::Postgres),
            vec!["unit_price", "order_"]
        );
    }

    #[test]
    fn test_sanitize_collisions_after_truncation() {
        let prefix = "m".repeat(63);
        let names = [format!("{prefix} one"), format!("{prefix} two")];
        let idents = column_identifiers(&names, ColumnNameMode::Sanitize, Dialect::Postgres);
        assert_eq!(idents[0], prefix);
        assert_eq!(idents[1], format!("{}_2", "m".repeat(61)));

        let sqlite = column_identifiers(&names, ColumnNameMode::Sanitize, Dialect::Sqlite);
        assert_eq!(sqlite[0], format!("{prefix}_one"));
        assert_eq!(sqlite[1], format!("{prefix}_two"));
    }

    #[test]
    fn test_long_names_truncated_for_postgres() {
        let long = "é".repeat(40);
        let ddl = ddl_column_names(&[long.as_str()], ColumnNameMode::Quoted, Dialect::Postgres);
        assert_eq!(ddl, vec![format!("\"{}\"", "é".repeat(31))]);
    }
}

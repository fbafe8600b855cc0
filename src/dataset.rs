//! In-memory tabular data.
//!
//! A [`Dataset`] is what every source reader produces and what the inferencer
//! and materializer consume: ordered column names plus rows of [`CellValue`]s
//! aligned positionally with those columns.

use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use crate::error::LoadError;
use crate::query::Dialect;

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing or empty cell.
    Null,
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Timestamp without time zone.
    Timestamp(NaiveDateTime),
    /// Text.
    Text(String),
}

impl CellValue {
    /// Returns true for [`CellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Normalize empty text to `Null`.
    fn normalized(self) -> Self {
        match self {
            CellValue::Text(s) if s.is_empty() => CellValue::Null,
            other => other,
        }
    }
}

/// Renders the value the way it would be stored in a text column.
///
/// `Null` renders as the empty string.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Int(v) => write!(f, "{v}"),
            // Debug keeps the trailing ".0" on integral floats
            CellValue::Float(v) => write!(f, "{v:?}"),
            CellValue::Bool(v) => write!(f, "{v}"),
            CellValue::Timestamp(ts) => {
                if ts.nanosecond() == 0 {
                    write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S"))
                } else {
                    write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.6f"))
                }
            }
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(i64::from(v))
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            CellValue::Null
        } else {
            CellValue::Float(v)
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::Timestamp(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

/// Ordered columns and rows of scalar cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset from column names and rows.
    ///
    /// Empty text cells become `Null` and rows shorter than the header are
    /// padded with `Null`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidInput` if a row has more cells than there
    /// are columns.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, LoadError> {
        let width = columns.len();
        let mut normalized = Vec::with_capacity(rows.len());

        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(LoadError::InvalidInput(format!(
                    "Row {} has {} values but only {} columns are defined",
                    idx + 1,
                    row.len(),
                    width
                )));
            }
            let mut row: Vec<CellValue> = row.into_iter().map(CellValue::normalized).collect();
            row.resize(width, CellValue::Null);
            normalized.push(row);
        }

        Ok(Self {
            columns,
            rows: normalized,
        })
    }

    /// Build a dataset from named columns of values.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidInput` if the columns have different lengths.
    pub fn from_columns<S, V>(columns: Vec<(S, Vec<V>)>) -> Result<Self, LoadError>
    where
        S: Into<String>,
        V: Into<CellValue>,
    {
        let row_count = columns.first().map_or(0, |(_, values)| values.len());
        let mut names = Vec::with_capacity(columns.len());
        let mut rows: Vec<Vec<CellValue>> = (0..row_count)
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();

        for (name, values) in columns {
            let name = name.into();
            if values.len() != row_count {
                return Err(LoadError::InvalidInput(format!(
                    "Column '{}' has {} values, expected {}",
                    name,
                    values.len(),
                    row_count
                )));
            }
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value.into());
            }
            names.push(name);
        }

        Self::new(names, rows)
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Iterate over the values of the column at `index`.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> + Clone + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Append the rows of `other`, which must have the same column names.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidInput` if the column lists differ.
    pub fn append(&mut self, other: Dataset) -> Result<(), LoadError> {
        if self.columns != other.columns {
            return Err(LoadError::InvalidInput(format!(
                "Cannot append dataset with columns {:?} to dataset with columns {:?}",
                other.columns, self.columns
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Names of columns that collide under `dialect`'s identifier rules, in
    /// first-seen order.
    ///
    /// `Name` and `name` collide in SQLite; names sharing their first 63
    /// bytes collide in PostgreSQL.
    pub fn duplicate_columns(&self, dialect: Dialect) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut dups: Vec<&str> = Vec::new();
        for name in &self.columns {
            if !seen.insert(dialect.identifier_key(name)) && !dups.contains(&name.as_str()) {
                dups.push(name);
            }
        }
        dups
    }

    /// Rename colliding column names positionally.
    ///
    /// The first occurrence keeps its name; later ones become `name.1`,
    /// `name.2`, ... skipping any name that would collide again.
    pub fn disambiguate_columns(&mut self, dialect: Dialect) {
        let mut taken: HashSet<String> = self
            .columns
            .iter()
            .map(|name| dialect.identifier_key(name))
            .collect();
        let mut seen = HashSet::new();

        for name in self.columns.iter_mut() {
            if seen.insert(dialect.identifier_key(name)) {
                continue;
            }
            let mut suffix = 1;
            let renamed = loop {
                let candidate = dialect.suffixed_identifier(name, &format!(".{suffix}"));
                let key = dialect.identifier_key(&candidate);
                if !taken.contains(&key) {
                    taken.insert(key.clone());
                    seen.insert(key);
                    break candidate;
                }
                suffix += 1;
            };
            *name = renamed;
        }
    }
}

//! The row-oriented table that decoded survey records are collected into.
//!
//! Rows keep the order of the input records and are keyed by their subject ID:
//!
//! ```
//! use anthrofmt::table::{DecodedTable, RecordValue};
//!
//! let mut table = DecodedTable::new(vec!["SUBJECT ID".to_string(), "WEIGHT".to_string()]);
//! table.push_row(vec![5048, 2313], 0).unwrap();
//! let row = table.row(5048).unwrap();
//! assert_eq!(row.get("WEIGHT"), Some(&RecordValue::Integer(2313)));
//! ```
use std::collections::HashMap;
use std::fmt::Display;

use chrono::NaiveDate;

use crate::record_error::{RecordError, RResult};

/// A single cell of a [`DecodedTable`].
///
/// Decoding only ever produces `Integer`s. The other variants hold the output of
/// [conversions](crate::convert), e.g. a weight in kilograms (`Real`), a rank
/// description (`Text`) or a birth date (`Date`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RecordValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
}

impl RecordValue {
    /// The inner integer, if this is still an undecoded `Integer`.
    pub fn as_integer(&self) -> Option<i64> {
        if let Self::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }
}

impl Display for RecordValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordValue::Integer(i) => write!(f, "{i}"),
            RecordValue::Real(v) => write!(f, "{v}"),
            RecordValue::Text(s) => write!(f, "{s}"),
            RecordValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<i64> for RecordValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for RecordValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for RecordValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<NaiveDate> for RecordValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    subject_id: i64,
    values: Vec<RecordValue>,
}

/// Decoded survey records, one row per record, keyed by subject ID.
///
/// Every row has one value per column and the first column is always the subject
/// ID. The subject ID used as the row key is fixed when the row is added, so
/// converting the first column does not change how rows are looked up.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTable {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    rows: Vec<Row>,
    row_index: HashMap<i64, usize>,
}

impl DecodedTable {
    /// Create an empty table with the given columns; the first is the subject ID.
    pub fn new(columns: Vec<String>) -> Self {
        let mut column_index = HashMap::with_capacity(columns.len());
        for (i, c) in columns.iter().enumerate() {
            // Headers can repeat a name; lookups by name resolve to the first one
            column_index.entry(c.clone()).or_insert(i);
        }
        Self { columns, column_index, rows: vec![], row_index: HashMap::new() }
    }

    /// Append a decoded record. `line_num` is where the record began in the input,
    /// and is only used to report errors.
    ///
    /// Returns an error if the number of values does not match the number of columns
    /// or if the subject ID (the first value) is already in the table.
    pub fn push_row(&mut self, values: Vec<i64>, line_num: usize) -> RResult<()> {
        let mismatch = RecordError::ColumnCountMismatch { n_values: values.len(), n_columns: self.columns.len() };
        if values.len() != self.columns.len() {
            return Err(mismatch)
        }

        let subject_id = *values.first().ok_or(mismatch)?;
        if self.row_index.contains_key(&subject_id) {
            return Err(RecordError::DuplicateSubject { line_num, subject_id })
        }

        self.row_index.insert(subject_id, self.rows.len());
        self.rows.push(Row { subject_id, values: values.into_iter().map(RecordValue::Integer).collect() });
        Ok(())
    }

    /// Column names, starting with the subject ID column.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Subject IDs in row order.
    pub fn subject_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.rows.iter().map(|r| r.subject_id)
    }

    /// Look up a row by subject ID.
    pub fn row(&self, subject_id: i64) -> Option<RowRef<'_>> {
        let &i = self.row_index.get(&subject_id)?;
        Some(RowRef { columns: &self.columns, column_index: &self.column_index, row: &self.rows[i] })
    }

    /// Iterate over rows in input order.
    pub fn iter_rows(&self) -> impl Iterator<Item = RowRef<'_>> + '_ {
        self.rows.iter().map(move |row| RowRef { columns: &self.columns, column_index: &self.column_index, row })
    }

    /// All values of one column in row order, or `None` if there is no such column.
    pub fn column(&self, name: &str) -> Option<Vec<&RecordValue>> {
        let &i = self.column_index.get(name)?;
        Some(self.rows.iter().map(|r| &r.values[i]).collect())
    }

    /// Apply `f` to every value in the named column.
    ///
    /// Returns `false` (and does nothing) if the table has no such column.
    pub fn update_column<F: FnMut(&mut RecordValue)>(&mut self, name: &str, mut f: F) -> bool {
        let i = match self.column_index.get(name) {
            Some(&i) => i,
            None => return false,
        };

        for row in self.rows.iter_mut() {
            f(&mut row.values[i]);
        }
        true
    }
}

/// A borrowed view of one row that can be indexed by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'t> {
    columns: &'t [String],
    column_index: &'t HashMap<String, usize>,
    row: &'t Row,
}

impl<'t> RowRef<'t> {
    pub fn subject_id(&self) -> i64 {
        self.row.subject_id
    }

    /// The value in the named column, if the table has that column.
    pub fn get(&self, column: &str) -> Option<&'t RecordValue> {
        let &i = self.column_index.get(column)?;
        self.row.values.get(i)
    }

    /// Values in column order, subject ID first.
    pub fn values(&self) -> &'t [RecordValue] {
        &self.row.values
    }

    /// The row's values as integers, or `None` if any column has been converted.
    pub fn integers(&self) -> Option<Vec<i64>> {
        self.row.values.iter().map(|v| v.as_integer()).collect()
    }

    /// Iterate over `(column name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'t str, &'t RecordValue)> + 't {
        self.columns.iter().map(|c| c.as_str()).zip(self.row.values.iter())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RowRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DecodedTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer {
        serializer.collect_seq(self.iter_rows())
    }
}

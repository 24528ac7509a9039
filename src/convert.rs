//! Turn coded survey values into readable ones.
//!
//! Decoded records hold every variable as the integer written in the file. Many of
//! these are codes: weight in tenths of a kilogram, rank as a pay-grade number,
//! birth date as `YYMMDD`, and so on. A [`Conversions`] map pairs column names with
//! the [`Conversion`] to apply, and [`apply_conversions`] rewrites those columns of a
//! [`DecodedTable`] in place:
//!
//! ```
//! use anthrofmt::table::{DecodedTable, RecordValue};
//! use anthrofmt::convert::{apply_conversions, default_conversions};
//!
//! let mut table = DecodedTable::new(["SUBJECT ID", "WEIGHT", "SNEK"].map(String::from).to_vec());
//! table.push_row(vec![1, 3141, 1337], 0).unwrap();
//! apply_conversions(&mut table, &default_conversions());
//!
//! let row = table.row(1).unwrap();
//! assert_eq!(row.get("WEIGHT"), Some(&RecordValue::Real(314.1)));
//! assert_eq!(row.get("SNEK"), Some(&RecordValue::Integer(1337)));
//! ```
//!
//! Conversions never fail. A code missing from its table becomes an empty string, so
//! one unexpected code does not stop the rest of a record from being used.
use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::code_tables::{self, CodeTable};
use crate::parsing::split_yymmdd;
use crate::table::{DecodedTable, RecordValue};

/// How to convert the values of one column.
#[derive(Debug, Clone, Copy)]
pub enum Conversion {
    /// Replace each code with its description from a static table; codes not in the
    /// table become an empty string.
    Lookup(&'static CodeTable),
    /// Replace each value with the result of a function, e.g. a scaling.
    Function(fn(i64) -> RecordValue),
}

impl Conversion {
    /// Convert a single coded value.
    pub fn convert(&self, code: i64) -> RecordValue {
        match self {
            Conversion::Lookup(table) => RecordValue::Text(table.lookup(code).to_owned()),
            Conversion::Function(f) => f(code),
        }
    }
}

/// Column name to the conversion applied to that column.
pub type Conversions = HashMap<String, Conversion>;

/// Apply each conversion in `conversions` to its named column of `table`.
///
/// Columns without a conversion are left untouched, and conversions naming a column
/// the table does not have are skipped. Only `Integer` values are converted, so
/// running the same conversions twice leaves the table as it was after the first run.
pub fn apply_conversions(table: &mut DecodedTable, conversions: &Conversions) {
    for (column, conversion) in conversions {
        let found = table.update_column(column, |value| {
            if let Some(code) = value.as_integer() {
                *value = conversion.convert(code);
            }
        });

        if found {
            debug!(column = %column, "converted column");
        } else {
            debug!(column = %column, "no such column, skipping conversion");
        }
    }
}

/// Conversions for the standard variables of the survey files.
pub fn default_conversions() -> Conversions {
    let entries: [(&str, Conversion); 9] = [
        ("WEIGHT", Conversion::Function(|v| RecordValue::Real(weight(v)))),
        ("AGE", Conversion::Function(|v| RecordValue::Real(age(v)))),
        ("RACE", Conversion::Lookup(&code_tables::RACE)),
        ("RANK", Conversion::Lookup(&code_tables::RANK)),
        ("MOS", Conversion::Lookup(&code_tables::MOS)),
        ("BIRTHPLACE", Conversion::Lookup(&code_tables::BIRTHPLACE)),
        ("HANDEDNESS", Conversion::Lookup(&code_tables::HANDEDNESS)),
        ("LENGTH OF SERVICE", Conversion::Function(|v| {
            length_of_service(v).map(RecordValue::Integer).unwrap_or_else(|| RecordValue::Text(String::new()))
        })),
        ("BIRTH DATE", Conversion::Function(|v| RecordValue::Date(birth_date(v)))),
    ];

    entries.into_iter()
        .map(|(name, conversion)| (name.to_owned(), conversion))
        .collect()
}

/// Weight is written in tenths of a unit.
pub fn weight(coded: i64) -> f64 {
    coded as f64 / 10.0
}

/// Age is written in tenths of a year.
pub fn age(coded: i64) -> f64 {
    coded as f64 / 10.0
}

pub fn race(code: i64) -> &'static str {
    code_tables::RACE.lookup(code)
}

pub fn mos(code: i64) -> &'static str {
    code_tables::MOS.lookup(code)
}

pub fn handedness(code: i64) -> &'static str {
    code_tables::HANDEDNESS.lookup(code)
}

pub fn birthplace(code: i64) -> &'static str {
    code_tables::BIRTHPLACE.lookup(code)
}

pub fn rank(code: i64) -> &'static str {
    code_tables::RANK.lookup(code)
}

/// Length of service written as `YYMMDD`, in days.
///
/// Years count as 365 days and months as 30. Leading zeros are lost when the value is
/// decoded as an integer, so `101` means 1 month and 1 day. Returns `None` for values
/// that are not six digits or fewer, and for negative values, which are not a length
/// of service.
pub fn length_of_service(coded: i64) -> Option<i64> {
    let (years, months, days) = split_yymmdd(coded)?;
    Some(years as i64 * 365 + months as i64 * 30 + days as i64)
}

/// The date used in place of a birth date that cannot be read.
pub fn sentinel_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2069, 4, 20).expect("sentinel birth date is a valid calendar date")
}

/// Birth date written as `YYMMDD`, always in the 1900s.
///
/// A value that is not a real calendar date gives [`sentinel_birth_date`] rather than
/// an error.
// TODO: return an Option once downstream consumers no longer compare against the sentinel date
pub fn birth_date(coded: i64) -> NaiveDate {
    split_yymmdd(coded)
        .and_then(|(yy, mm, dd)| NaiveDate::from_ymd_opt(1900 + yy as i32, mm, dd))
        .unwrap_or_else(|| {
            warn!(coded, "unreadable birth date, using sentinel");
            sentinel_birth_date()
        })
}

//! Decode fixed-width survey records into a [`DecodedTable`].
//!
//! # Basic usage
//!
//! Once the header has been read and the format spec compiled, the data lines are
//! decoded in groups of [`CompiledFormat::chunk_size`] physical lines. Each group is
//! joined back into one record and sliced left to right by the field widths:
//!
//! ```
//! use anthrofmt::format_specs::CompiledFormat;
//! use anthrofmt::decode::decode_records;
//! use anthrofmt::table::RecordValue;
//!
//! let fmt = CompiledFormat::compile("I4,F4.0/F4.0").unwrap();
//! let names = ["SUBJECT ID", "A", "B"].map(String::from);
//! let table = decode_records(&["50482313", " 857"], &fmt, &names).unwrap();
//!
//! let row = table.row(5048).unwrap();
//! assert_eq!(row.get("A"), Some(&RecordValue::Integer(2313)));
//! assert_eq!(row.get("B"), Some(&RecordValue::Integer(857)));
//! ```
//!
//! Trailing blanks on the joined record are padding and are dropped; leading blanks
//! are part of the first field. Any record that cannot be fully decoded is an error,
//! no row is ever filled in partially. [`decode_records_partial`] gives back the rows
//! decoded before the first bad record along with the error, for callers that want
//! to salvage the good part of a damaged file.
//!
//! # Parallel decoding
//!
//! Records never depend on each other, so with the `parallel` feature enabled,
//! [`decode_records_parallel`] splits the data at record boundaries and decodes them
//! on the `rayon` thread pool. The result is the same as [`decode_records`].
use tracing::{debug, instrument, trace};

use crate::format_specs::CompiledFormat;
use crate::parsing;
use crate::record_error::{RecordError, RResult};
use crate::table::DecodedTable;

/// Read cursor over the text of one record.
///
/// Widths count characters, not bytes, so records that contain non-ASCII text are
/// sliced the same way they would be by eye.
struct RecordCursor<'r> {
    record: &'r str,
    byte_idx: usize,
    column: usize,
}

impl<'r> RecordCursor<'r> {
    fn new(record: &'r str) -> Self {
        Self { record, byte_idx: 0, column: 0 }
    }

    /// Take the next `n` characters, or return how many characters short the record is.
    fn next_n_chars(&mut self, n: usize) -> Result<&'r str, usize> {
        let rest = &self.record[self.byte_idx..];
        let mut taken = 0;
        let mut nbytes = 0;
        for c in rest.chars().take(n) {
            taken += 1;
            nbytes += c.len_utf8();
        }

        if taken < n {
            return Err(n - taken)
        }

        let s = &rest[..nbytes];
        self.byte_idx += nbytes;
        self.column += n;
        Ok(s)
    }
}

/// Decode one record from its physical lines.
///
/// `chunk` must hold exactly `fmt.chunk_size()` lines; `line_num` is the index of its
/// first line and is only used in errors. Returns the record's values in order, the
/// subject ID first.
pub fn decode_chunk<S: AsRef<str>>(chunk: &[S], fmt: &CompiledFormat, line_num: usize) -> RResult<Vec<i64>> {
    if chunk.len() != fmt.chunk_size() {
        return Err(RecordError::TruncatedRecord { line_num, expected: fmt.chunk_size(), found: chunk.len() })
    }

    let joined: String = chunk.iter().map(|l| l.as_ref()).collect();
    let mut cursor = RecordCursor::new(joined.trim_end());
    let mut values = Vec::with_capacity(fmt.n_values());

    for field in fmt.iter_values() {
        let column = cursor.column;
        let width = field.width as usize;
        let substr = cursor.next_n_chars(width)
            .map_err(|needed| RecordError::RecordEndedEarly { line_num, column: cursor.column, needed })?;
        let v = parsing::parse_integer(substr)
            .map_err(|e| RecordError::UnparseableField { line_num, column, text: substr.to_owned(), reason: e.to_string() })?;
        values.push(v);
    }

    trace!(line_num, subject_id = values.first().copied(), "decoded record");
    Ok(values)
}

/// Decode every record in `lines`, which should start at the first data line.
///
/// `variable_names` are the table's columns, normally from
/// [`extract_header`](crate::header::extract_header); there must be one per value the
/// format describes. Line numbers in errors count from the start of `lines`.
pub fn decode_records<S: AsRef<str>>(lines: &[S], fmt: &CompiledFormat, variable_names: &[String]) -> RResult<DecodedTable> {
    let (table, error) = decode_records_partial(lines, fmt, variable_names);
    match error {
        Some(e) => Err(e),
        None => Ok(table),
    }
}

/// Like [`decode_records`], but on failure also returns the rows decoded before the
/// bad record.
///
/// The table holds only complete rows; the record that failed and everything after
/// it are left out.
#[instrument(level = "debug", skip_all, fields(n_lines = lines.len(), chunk_size = fmt.chunk_size()))]
pub fn decode_records_partial<S: AsRef<str>>(lines: &[S], fmt: &CompiledFormat, variable_names: &[String]) -> (DecodedTable, Option<RecordError>) {
    let mut table = DecodedTable::new(variable_names.to_vec());
    if let Err(e) = check_columns(fmt, variable_names) {
        return (table, Some(e))
    }

    let chunk_size = fmt.chunk_size();
    for (i_chunk, chunk) in lines.chunks(chunk_size).enumerate() {
        let line_num = i_chunk * chunk_size;
        let res = decode_chunk(chunk, fmt, line_num)
            .and_then(|values| table.push_row(values, line_num));
        if let Err(e) = res {
            debug!(n_rows = table.len(), error = %e, "stopped decoding at a bad record");
            return (table, Some(e))
        }
    }

    debug!(n_rows = table.len(), "decoded all records");
    (table, None)
}

/// Decode records on the `rayon` thread pool.
///
/// Gives the same table, or the same error, as [`decode_records`]: if several records
/// are bad, the one nearest the start of `lines` is reported.
#[cfg(feature = "parallel")]
#[instrument(level = "debug", skip_all, fields(n_lines = lines.len(), chunk_size = fmt.chunk_size()))]
pub fn decode_records_parallel<S: AsRef<str> + Sync>(lines: &[S], fmt: &CompiledFormat, variable_names: &[String]) -> RResult<DecodedTable> {
    use rayon::prelude::*;

    check_columns(fmt, variable_names)?;
    let chunk_size = fmt.chunk_size();
    let decoded: Vec<RResult<Vec<i64>>> = lines.par_chunks(chunk_size)
        .enumerate()
        .map(|(i_chunk, chunk)| decode_chunk(chunk, fmt, i_chunk * chunk_size))
        .collect();

    let mut table = DecodedTable::new(variable_names.to_vec());
    for (i_chunk, values) in decoded.into_iter().enumerate() {
        table.push_row(values?, i_chunk * chunk_size)?;
    }

    debug!(n_rows = table.len(), "decoded all records");
    Ok(table)
}

fn check_columns(fmt: &CompiledFormat, variable_names: &[String]) -> RResult<()> {
    if fmt.n_values() != variable_names.len() {
        return Err(RecordError::ColumnCountMismatch { n_values: fmt.n_values(), n_columns: variable_names.len() })
    }
    Ok(())
}

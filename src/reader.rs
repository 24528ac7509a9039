//! Read a whole survey document: header, format spec and data.
//!
//! [`parse_lines`] runs header extraction, format compilation and record decoding
//! over lines already in memory. [`read_survey`] does the same for any buffered
//! reader, and reports failures as an [`error_stack::Report`] that says which step
//! went wrong:
//!
//! ```
//! use std::io::BufReader;
//! use anthrofmt::reader::read_survey;
//!
//! let doc = "1  A\n2  B\n(I4,2F4.0)\n50482313 857\n";
//! let table = read_survey(BufReader::new(doc.as_bytes())).unwrap();
//! assert_eq!(table.columns(), ["SUBJECT ID", "A", "B"]);
//! ```
//!
//! Line numbers in errors from either function count from the first line of the
//! document.
use std::io::BufRead;

use error_stack::{Report, ResultExt};
use tracing::{info, instrument};

use crate::decode::decode_records;
use crate::format_specs::CompiledFormat;
use crate::header::extract_header;
use crate::record_error::{RecordError, RResult};
use crate::table::DecodedTable;

/// Decode a survey document held as a sequence of lines.
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> RResult<DecodedTable> {
    let header = extract_header(lines)?;
    let fmt = CompiledFormat::compile(&header.format_spec_text)?;
    let data = &lines[header.data_start_line..];
    decode_records(data, &fmt, &header.variable_names)
        .map_err(|e| e.offset_lines(header.data_start_line))
}

/// Read and decode a survey document from `reader`.
///
/// Decoding is done by [`parse_lines`]; the report names the step that failed.
#[instrument(level = "debug", skip_all)]
pub fn read_survey<R: BufRead>(reader: R) -> error_stack::Result<DecodedTable, RecordError> {
    let lines = reader.lines()
        .enumerate()
        .map(|(line_num, line)| line.map_err(|e| RecordError::ReadError(e, line_num)))
        .collect::<RResult<Vec<String>>>()
        .attach_printable("while reading the survey document")?;

    let table = parse_lines(&lines)
        .map_err(|e| {
            let stage = failed_stage(&e);
            Report::new(e).attach_printable(stage)
        })?;

    info!(n_rows = table.len(), n_columns = table.columns().len(), "read survey document");
    Ok(table)
}

fn failed_stage(e: &RecordError) -> &'static str {
    match e {
        RecordError::MalformedHeader { .. } => "while extracting variable names from the header",
        RecordError::InvalidFormatSpec { .. } => "while compiling the format spec",
        _ => "while decoding records",
    }
}

//! Errors in survey headers, format specs, or fixed-width record data
use std::fmt::Display;
use pest::RuleType;

/// Type alias for a `Result` with [`RecordError`] as the error type.
pub type RResult<T> = Result<T, RecordError>;

/// An error raised while extracting, compiling, decoding or encoding survey records.
///
/// Line numbers are 0-based indices into the line sequence that was handed to the
/// function returning the error.
#[derive(Debug)]
pub enum RecordError {
    /// Indicates that the header had no format spec line, or that a declaration line
    /// before it did not have a variable name column.
    MalformedHeader { line_num: Option<usize>, reason: String },

    /// Indicates that a format spec was empty or had a token outside the supported grammar.
    InvalidFormatSpec { spec: String, reason: String },

    /// Indicates that the data ended partway through a multi-line record.
    TruncatedRecord { line_num: usize, expected: usize, found: usize },

    /// Indicates that the text of a record ran out before every field was read.
    RecordEndedEarly { line_num: usize, column: usize, needed: usize },

    /// Indicates that a fixed-width slice was not a base-10 integer.
    UnparseableField { line_num: usize, column: usize, text: String, reason: String },

    /// Indicates that a record has a different number of values than the header has variables.
    ColumnCountMismatch { n_values: usize, n_columns: usize },

    /// Indicates that two records share the same subject ID.
    DuplicateSubject { line_num: usize, subject_id: i64 },

    /// Indicates that a value needs more characters than its field width allows.
    ValueTooWide { value: i64, width: u32 },

    /// Indicates an I/O error while reading a line of the input document.
    ReadError(std::io::Error, usize),

    /// Indicates that Polars could not build a dataframe from the table.
    #[cfg(feature = "dataframes")]
    DataFrameError(polars::error::PolarsError),
}

impl Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedHeader { line_num: Some(n), reason } => {
                write!(f, "Malformed header at line {n}: {reason}")
            },
            Self::MalformedHeader { line_num: None, reason } => {
                write!(f, "Malformed header: {reason}")
            },
            Self::InvalidFormatSpec { spec, reason } => {
                write!(f, "Invalid format spec '{spec}': {reason}")
            },
            Self::TruncatedRecord { line_num, expected, found } => {
                write!(f, "Record starting at line {line_num} needs {expected} lines but only {found} remain")
            },
            Self::RecordEndedEarly { line_num, column, needed } => {
                write!(f, "Record starting at line {line_num} ended at column {column}, {needed} more characters were needed")
            },
            Self::UnparseableField { line_num, column, text, reason } => {
                write!(f, "Could not parse '{text}' at column {column} of the record starting at line {line_num} as an integer: {reason}")
            },
            Self::ColumnCountMismatch { n_values, n_columns } => {
                write!(f, "Records have {n_values} values but the header declares {n_columns} variables")
            },
            Self::DuplicateSubject { line_num, subject_id } => {
                write!(f, "Subject ID {subject_id} on line {line_num} was already used by an earlier record")
            },
            Self::ValueTooWide { value, width } => {
                write!(f, "Value {value} does not fit in a field {width} characters wide")
            },
            Self::ReadError(e, line_num) => {
                write!(f, "Error reading line {line_num}: {e}")
            },
            #[cfg(feature = "dataframes")]
            Self::DataFrameError(e) => {
                write!(f, "Error building dataframe: {e}")
            },
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadError(e, _) => Some(e),
            #[cfg(feature = "dataframes")]
            Self::DataFrameError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "dataframes")]
impl From<polars::error::PolarsError> for RecordError {
    fn from(value: polars::error::PolarsError) -> Self {
        Self::DataFrameError(value)
    }
}

impl RecordError {
    pub fn from_pest<R: RuleType>(e: pest::error::Error<R>, spec: &str) -> Self {
        Self::InvalidFormatSpec { spec: spec.to_owned(), reason: e.to_string() }
    }

    /// Shift any line number carried by this error by `offset`.
    ///
    /// The decoder numbers lines from the start of the data section; callers that
    /// know where the data section began use this to report document line numbers.
    pub fn offset_lines(self, offset: usize) -> Self {
        match self {
            Self::MalformedHeader { line_num, reason } => Self::MalformedHeader { line_num: line_num.map(|n| n + offset), reason },
            Self::TruncatedRecord { line_num, expected, found } => Self::TruncatedRecord { line_num: line_num + offset, expected, found },
            Self::RecordEndedEarly { line_num, column, needed } => Self::RecordEndedEarly { line_num: line_num + offset, column, needed },
            Self::UnparseableField { line_num, column, text, reason } => Self::UnparseableField { line_num: line_num + offset, column, text, reason },
            Self::DuplicateSubject { line_num, subject_id } => Self::DuplicateSubject { line_num: line_num + offset, subject_id },
            Self::ReadError(e, line_num) => Self::ReadError(e, line_num + offset),
            _ => self
        }
    }

    /// The input line this error points at, if it has one.
    pub fn line_num(&self) -> Option<usize> {
        match self {
            Self::MalformedHeader { line_num, .. } => *line_num,
            Self::TruncatedRecord { line_num, .. } => Some(*line_num),
            Self::RecordEndedEarly { line_num, .. } => Some(*line_num),
            Self::UnparseableField { line_num, .. } => Some(*line_num),
            Self::DuplicateSubject { line_num, .. } => Some(*line_num),
            Self::ReadError(_, line_num) => Some(*line_num),
            Self::InvalidFormatSpec { .. } | Self::ColumnCountMismatch { .. } | Self::ValueTooWide { .. } => None,
            #[cfg(feature = "dataframes")]
            Self::DataFrameError(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_lines() {
        let e = RecordError::TruncatedRecord { line_num: 4, expected: 2, found: 1 }.offset_lines(3);
        assert_eq!(e.line_num(), Some(7));

        let e = RecordError::InvalidFormatSpec { spec: "".to_owned(), reason: "empty".to_owned() }.offset_lines(3);
        assert_eq!(e.line_num(), None, "Format spec errors carry no line number");
    }

    #[test]
    fn test_display() {
        let e = RecordError::UnparseableField { line_num: 2, column: 4, text: "12a4".to_owned(), reason: "invalid digit".to_owned() };
        assert_eq!(
            e.to_string(),
            "Could not parse '12a4' at column 4 of the record starting at line 2 as an integer: invalid digit"
        );
    }
}

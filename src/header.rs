//! Recover variable names and the format spec from the header of a survey file.
//!
//! A survey file opens with one declaration line per variable, followed by the
//! format spec in parentheses, followed by the data:
//!
//! ```text
//! 1  WEIGHT               86750  218000  132100  5000  3000   0453592  22046226
//! 2  STATURE             141750  183800  163000  1500  1000   1000000   3937008
//!  (I4,2F4.0)
//! 50482313 857
//! ```
//!
//! Columns of a declaration line are separated by at least two spaces, so names with
//! single spaces in them (`SHOULDER HEIGHT`) survive intact. Only the name column is
//! kept; the statistics after it are not needed to decode records.
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, trace};

use crate::record_error::{RecordError, RResult};

/// Name of the synthetic first column holding each record's identifier.
pub const SUBJECT_ID: &str = "SUBJECT ID";

static COLUMN_SEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s{2,}").expect("Invalid column separator regex")
});

/// What [`extract_header`] found in the header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderResult {
    /// Column names in record order, starting with [`SUBJECT_ID`].
    pub variable_names: Vec<String>,
    /// The format spec with its whitespace and outer parentheses removed, e.g. `I4,19F4.0`.
    pub format_spec_text: String,
    /// Index of the first data line, i.e. the line after the format spec.
    pub data_start_line: usize,
}

/// Scan `lines` for the variable declarations and the format spec line.
///
/// The first line whose trimmed text starts with `(` is taken as the format spec.
/// Returns [`RecordError::MalformedHeader`] if there is no such line, or if a line
/// before it does not have a name column.
#[instrument(level = "debug", skip(lines), fields(n_lines = lines.len()))]
pub fn extract_header<S: AsRef<str>>(lines: &[S]) -> RResult<HeaderResult> {
    let mut variable_names = vec![SUBJECT_ID.to_owned()];

    for (line_num, line) in lines.iter().enumerate() {
        let line = line.as_ref().trim();
        if line.starts_with('(') {
            let format_spec_text = strip_spec_line(line).to_owned();
            debug!(n_variables = variable_names.len() - 1, spec = %format_spec_text, "found format spec line");
            return Ok(HeaderResult { variable_names, format_spec_text, data_start_line: line_num + 1 });
        }

        let name = declared_name(line).ok_or_else(|| RecordError::MalformedHeader {
            line_num: Some(line_num),
            reason: format!("'{line}' has no variable name column")
        })?;
        trace!(line_num, var_name = name, "variable declaration");
        variable_names.push(name.to_owned());
    }

    Err(RecordError::MalformedHeader {
        line_num: None,
        reason: format!("no format spec line found in {} lines", lines.len())
    })
}

/// The name column of a declaration line, i.e. the text between the first and second
/// runs of two or more spaces.
fn declared_name(line: &str) -> Option<&str> {
    COLUMN_SEP.splitn(line, 3)
        .nth(1)
        .filter(|name| !name.is_empty())
}

fn strip_spec_line(line: &str) -> &str {
    line.trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURVEY_HEADER: &str = "\
1  WEIGHT               86750  218000  132100  5000  3000   0453592  22046226
2  STATURE             141750  183800  163000  1500  1000   1000000   3937008
3  SHOULDER HEIGHT     114750  155100  133500  1500  1000   1000000   3937008
4  THIGH-THIGH BREADT   29750   47800   38300  1000   500   1000000   3937008
5  BACK ARC, BUST       29750   55500   42000  1000  1000   1000000   3937008
6  STAND TWO-H 38 A1   139750  345500  226500  8000  5000   0453592  22046226
 (I4,19F4.0)
";

    #[test]
    fn test_survey_header() -> RResult<()> {
        let lines: Vec<&str> = SURVEY_HEADER.lines().collect();
        let header = extract_header(&lines)?;
        assert_eq!(
            header.variable_names,
            vec!["SUBJECT ID", "WEIGHT", "STATURE", "SHOULDER HEIGHT", "THIGH-THIGH BREADT", "BACK ARC, BUST", "STAND TWO-H 38 A1"]
        );
        assert_eq!(header.format_spec_text, "I4,19F4.0");
        assert_eq!(header.data_start_line, 7);
        Ok(())
    }

    #[test]
    fn test_single_declaration() -> RResult<()> {
        let lines = ["1  WEIGHT  86750  218000", " (I4,19F4.0)", "50482313"];
        let header = extract_header(&lines)?;
        assert_eq!(header.variable_names, vec!["SUBJECT ID", "WEIGHT"]);
        assert_eq!(header.format_spec_text, "I4,19F4.0");
        assert_eq!(header.data_start_line, 2);
        Ok(())
    }

    #[test]
    fn test_name_without_statistics() -> RResult<()> {
        let lines = ["  1  A  ", "2  B", "(I4,2F4.0)"];
        let header = extract_header(&lines)?;
        assert_eq!(header.variable_names, vec!["SUBJECT ID", "A", "B"]);
        Ok(())
    }

    #[test]
    fn test_spec_only() -> RResult<()> {
        let header = extract_header(&["   (I4)   "])?;
        assert_eq!(header.variable_names, vec![SUBJECT_ID]);
        assert_eq!(header.format_spec_text, "I4");
        assert_eq!(header.data_start_line, 1);
        Ok(())
    }

    #[test]
    fn test_no_spec_line() {
        let lines = ["1  WEIGHT  86750", "2  STATURE  141750"];
        let e = extract_header(&lines);
        assert!(matches!(e, Err(RecordError::MalformedHeader { line_num: None, .. })), "A header without a spec line should be malformed");

        let empty: [&str; 0] = [];
        assert!(extract_header(&empty).is_err(), "An empty document should be malformed");
    }

    #[test]
    fn test_declaration_without_name() {
        let lines = ["1  WEIGHT", "2 STATURE", "(I4,2F4.0)"];
        let e = extract_header(&lines);
        assert!(matches!(e, Err(RecordError::MalformedHeader { line_num: Some(1), .. })), "'2 STATURE' has no name column");
    }
}

//! Compile record-layout format specs into field descriptors.
//!
//! Survey files describe their fixed-width layout with a small subset of a Fortran
//! format string, such as `(I4,19F4.0/20F4.0)`. Each comma-separated token is a
//! [`FieldDescriptor`]; a slash starts a new physical line of the same record. The
//! first step in decoding is to compile that text with [`CompiledFormat::compile`]:
//!
//! ```
//! # use anthrofmt::format_specs::CompiledFormat;
//! let fmt = CompiledFormat::compile("I4,19F4.0/20F4.0").unwrap();
//! assert_eq!(fmt.chunk_size(), 2);
//! assert_eq!(fmt.n_values(), 40);
//! ```
//!
//! Only repeat counts, type letters and widths are kept. Decimal places are accepted
//! and dropped, since every value in these files is written as a whole number.
use std::fmt::Display;

use itertools::Itertools;
use pest::{Parser, iterators::Pair};
use tracing::{debug, instrument};

use crate::record_error::{RecordError, RResult};

#[derive(Parser)]
#[grammar = "record.pest"]
pub(crate) struct RecordParser;

/// One compiled token of a format spec, e.g. `19F4.0`.
///
/// `repeat_count` is how many consecutive values share this layout (1 when the token
/// has no leading count), `type_tag` is the uppercase type letter (`I` or `F` in
/// practice) and `width` is the number of characters per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldDescriptor {
    pub repeat_count: u32,
    pub type_tag: char,
    pub width: u32,
}

impl FieldDescriptor {
    /// Create a descriptor, returning an error if `repeat_count` or `width` is zero.
    pub fn new(repeat_count: u32, type_tag: char, width: u32) -> RResult<Self> {
        if repeat_count == 0 {
            return Err(RecordError::InvalidFormatSpec {
                spec: format!("0{type_tag}{width}"),
                reason: "repeat count must be at least 1".to_owned()
            })
        }

        if width == 0 {
            return Err(RecordError::InvalidFormatSpec {
                spec: format!("{repeat_count}{type_tag}0"),
                reason: "field width must be at least 1".to_owned()
            })
        }

        Ok(Self { repeat_count, type_tag: type_tag.to_ascii_uppercase(), width })
    }
}

impl Display for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.repeat_count == 1 {
            write!(f, "{}{}", self.type_tag, self.width)
        } else {
            write!(f, "{}{}{}", self.repeat_count, self.type_tag, self.width)
        }
    }
}

/// A compiled format spec: field descriptors in source order plus the number of
/// physical lines that make up one logical record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CompiledFormat {
    fields: Vec<FieldDescriptor>,
    chunk_size: usize,
    // Index into `fields` of the first descriptor on each physical line
    line_starts: Vec<usize>,
}

impl CompiledFormat {
    /// Compile a format spec such as `"I4,19F4.0/20F4.0"`.
    ///
    /// Surrounding whitespace and one pair of outer parentheses are tolerated, so
    /// `" (I4)  "` compiles the same as `"I4"`. Returns [`RecordError::InvalidFormatSpec`]
    /// if the spec is empty or any token does not match `{repeat}{letter}{width}[.{decimals}]`.
    #[instrument(level = "debug")]
    pub fn compile(spec: &str) -> RResult<Self> {
        if spec.trim().is_empty() {
            return Err(RecordError::InvalidFormatSpec {
                spec: spec.to_owned(),
                reason: "format spec has no fields".to_owned()
            })
        }

        let tree = RecordParser::parse(Rule::format, spec.trim())
            .map_err(|e| RecordError::from_pest(e, spec))?
            .next()
            .ok_or_else(|| RecordError::InvalidFormatSpec { spec: spec.to_owned(), reason: "format spec has no fields".to_owned() })?;

        let mut fields = vec![];
        let mut line_starts = vec![0];
        for pair in tree.into_inner() {
            match pair.as_rule() {
                Rule::field => fields.push(field_from_pair(pair, spec)?),
                Rule::new_line => line_starts.push(fields.len()),
                Rule::same_line | Rule::EOI => continue,
                // The remaining rules only appear nested inside a field
                _ => return Err(RecordError::InvalidFormatSpec {
                    spec: spec.to_owned(),
                    reason: format!("unexpected '{}'", pair.as_str())
                }),
            }
        }

        let chunk_size = spec.matches('/').count() + 1;
        debug!(n_fields = fields.len(), chunk_size, "compiled format spec");
        Ok(Self { fields, chunk_size, line_starts })
    }

    /// Build a format directly from descriptors and the field indices at which each
    /// additional physical line begins.
    pub fn from_fields(fields: Vec<FieldDescriptor>, line_breaks: &[usize]) -> RResult<Self> {
        if fields.is_empty() {
            return Err(RecordError::InvalidFormatSpec { spec: String::new(), reason: "format spec has no fields".to_owned() })
        }

        let fields = fields.into_iter()
            .map(|f| FieldDescriptor::new(f.repeat_count, f.type_tag, f.width))
            .collect::<RResult<Vec<_>>>()?;

        let mut line_starts = vec![0];
        for &b in line_breaks {
            if b == 0 || b >= fields.len() || line_starts.last().map(|&prev| b <= prev).unwrap_or(false) {
                return Err(RecordError::InvalidFormatSpec {
                    spec: fields.iter().join(","),
                    reason: format!("line break before field {b} does not fall between two fields")
                })
            }
            line_starts.push(b);
        }

        let chunk_size = line_starts.len();
        Ok(Self { fields, chunk_size, line_starts })
    }

    /// Number of physical lines per logical record.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The descriptors in source order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Consume the format and return the inner descriptors.
    pub fn into_fields(self) -> Vec<FieldDescriptor> {
        self.fields
    }

    /// Number of values in one record (the sum of every descriptor's repeat count),
    /// including the leading subject ID.
    pub fn n_values(&self) -> usize {
        self.fields.iter().map(|f| f.repeat_count as usize).sum()
    }

    /// Iterate over one descriptor per value, i.e. with repeats expanded.
    pub fn iter_values(&self) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.fields.iter()
            .flat_map(|f| std::iter::repeat(f).take(f.repeat_count as usize))
    }

    /// The descriptors grouped by the physical line they are written on.
    pub fn lines(&self) -> Vec<&[FieldDescriptor]> {
        let mut ends = self.line_starts.iter().skip(1).copied().chain(std::iter::once(self.fields.len()));
        self.line_starts.iter()
            .map(|&start| {
                let end = ends.next().unwrap_or(self.fields.len());
                &self.fields[start..end]
            })
            .collect()
    }
}

impl Display for CompiledFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let spec = self.lines().into_iter()
            .map(|line| line.iter().join(","))
            .join("/");
        write!(f, "{spec}")
    }
}

fn field_from_pair(pair: Pair<Rule>, spec: &str) -> RResult<FieldDescriptor> {
    let token = pair.as_str().to_owned();
    let mut repeat_count = 1;
    let mut type_tag = None;
    let mut width = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::repeat => repeat_count = parse_count(inner.as_str(), &token)?,
            Rule::tag => type_tag = inner.as_str().chars().next(),
            Rule::width => width = Some(parse_count(inner.as_str(), &token)?),
            // Every value in these files has zero decimal places, so precision is ignored
            Rule::decimals => continue,
            _ => unreachable!("field tokens only contain repeat, tag, width and decimals"),
        }
    }

    let type_tag = type_tag.ok_or_else(|| RecordError::InvalidFormatSpec { spec: spec.to_owned(), reason: format!("'{token}' has no type letter") })?;
    let width = width.ok_or_else(|| RecordError::InvalidFormatSpec { spec: spec.to_owned(), reason: format!("'{token}' has no width") })?;
    FieldDescriptor::new(repeat_count, type_tag, width)
        .map_err(|e| match e {
            RecordError::InvalidFormatSpec { spec: _, reason } => RecordError::InvalidFormatSpec { spec: spec.to_owned(), reason: format!("'{token}': {reason}") },
            other => other
        })
}

fn parse_count(s: &str, token: &str) -> RResult<u32> {
    s.parse().map_err(|e| RecordError::InvalidFormatSpec {
        spec: token.to_owned(),
        reason: format!("'{s}' is not a usable count: {e}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fd(repeat_count: u32, type_tag: char, width: u32) -> FieldDescriptor {
        FieldDescriptor { repeat_count, type_tag, width }
    }

    #[test]
    fn test_single_fields() -> RResult<()> {
        let ff = CompiledFormat::compile("I4")?;
        assert_eq!(ff.fields(), &[fd(1, 'I', 4)], "Compiling 'I4' failed");
        assert_eq!(ff.chunk_size(), 1);

        let ff = CompiledFormat::compile("19F4.0")?;
        assert_eq!(ff.fields(), &[fd(19, 'F', 4)], "Compiling '19F4.0' failed");
        assert_eq!(ff.chunk_size(), 1);
        Ok(())
    }

    #[test]
    fn test_sequence() -> RResult<()> {
        let ff = CompiledFormat::compile("I4,19F4.0")?;
        assert_eq!(ff.fields(), &[fd(1, 'I', 4), fd(19, 'F', 4)], "Compiling 'I4,19F4.0' failed");
        assert_eq!(ff.chunk_size(), 1);
        assert_eq!(ff.n_values(), 20);
        Ok(())
    }

    #[test]
    fn test_multi_line() -> RResult<()> {
        let ff = CompiledFormat::compile("I4,19F4.0/20F4.0")?;
        assert_eq!(ff.fields(), &[fd(1, 'I', 4), fd(19, 'F', 4), fd(20, 'F', 4)], "Compiling 'I4,19F4.0/20F4.0' failed");
        assert_eq!(ff.chunk_size(), 2);
        assert_eq!(ff.lines(), vec![&[fd(1, 'I', 4), fd(19, 'F', 4)][..], &[fd(20, 'F', 4)][..]]);
        Ok(())
    }

    #[test]
    fn test_chunk_size_counts_slashes() -> RResult<()> {
        for spec in ["I4", "I4/F2", "I4/F2/3F2.0", "I4,F2/F2,F2/F2/F2"] {
            let ff = CompiledFormat::compile(spec)?;
            assert_eq!(ff.chunk_size(), 1 + spec.matches('/').count(), "Wrong chunk size for '{spec}'");
            assert_eq!(ff.lines().len(), ff.chunk_size(), "Wrong number of physical lines for '{spec}'");
        }
        Ok(())
    }

    #[test]
    fn test_surrounding_parens_and_whitespace() -> RResult<()> {
        assert_eq!(CompiledFormat::compile("(I4)")?.into_fields(), vec![fd(1, 'I', 4)]);
        assert_eq!(CompiledFormat::compile(" (I4)   ")?.into_fields(), vec![fd(1, 'I', 4)]);
        assert_eq!(CompiledFormat::compile("I4, 2F4.0 /F4.0")?.into_fields(), vec![fd(1, 'I', 4), fd(2, 'F', 4), fd(1, 'F', 4)]);
        Ok(())
    }

    #[test]
    fn test_lowercase_tag() -> RResult<()> {
        assert_eq!(CompiledFormat::compile("i4,3f5.0")?.into_fields(), vec![fd(1, 'I', 4), fd(3, 'F', 5)]);
        Ok(())
    }

    #[test]
    fn test_decimals_are_dropped() -> RResult<()> {
        let a = CompiledFormat::compile("F4.0")?;
        let b = CompiledFormat::compile("F4.2")?;
        let c = CompiledFormat::compile("F4")?;
        assert_eq!(a, b);
        assert_eq!(a, c);
        Ok(())
    }

    #[test]
    fn test_empty_spec() {
        for spec in ["", "   ", "()", " ( ) "] {
            let e = CompiledFormat::compile(spec);
            assert!(matches!(e, Err(RecordError::InvalidFormatSpec { .. })), "Compiling '{spec}' did not return InvalidFormatSpec");
        }
    }

    #[test]
    fn test_invalid_tokens() {
        for spec in ["I", "4", "I4,", "I4,,F4", "I-4", "I4.F2", "2(I4)", "I4,1X,A3", "IF4", "I0", "0I4", "F4.", "I4,F4./F4"] {
            let e = CompiledFormat::compile(spec);
            assert!(matches!(e, Err(RecordError::InvalidFormatSpec { .. })), "Compiling '{spec}' did not return InvalidFormatSpec");
        }
    }

    #[test]
    fn test_display_round_trip() -> RResult<()> {
        let ff = CompiledFormat::compile("(I4,19F4.0/20F4.0)")?;
        assert_eq!(ff.to_string(), "I4,19F4/20F4");
        assert_eq!(CompiledFormat::compile(&ff.to_string())?, ff);
        Ok(())
    }

    #[test]
    fn test_iter_values() -> RResult<()> {
        let ff = CompiledFormat::compile("I4,2F3.0/F2.0")?;
        let widths: Vec<u32> = ff.iter_values().map(|f| f.width).collect();
        assert_eq!(widths, vec![4, 3, 3, 2]);
        Ok(())
    }

    #[test]
    fn test_from_fields() -> RResult<()> {
        let ff = CompiledFormat::from_fields(vec![fd(1, 'I', 4), fd(1, 'F', 4), fd(1, 'F', 4)], &[2])?;
        assert_eq!(ff, CompiledFormat::compile("I4,F4.0/F4.0")?);

        let lower = CompiledFormat::from_fields(vec![fd(1, 'i', 4), fd(2, 'f', 3)], &[1])?;
        assert_eq!(lower, CompiledFormat::compile("i4/2f3.0")?);
        assert_eq!(lower.fields()[0].type_tag, 'I', "Type tags should be stored uppercase");
        assert_eq!(lower.to_string(), "I4/2F3");

        assert!(CompiledFormat::from_fields(vec![], &[]).is_err(), "An empty field list should be rejected");
        assert!(CompiledFormat::from_fields(vec![fd(1, 'I', 4)], &[1]).is_err(), "A break after the last field should be rejected");
        Ok(())
    }

    #[test]
    fn ansur_format() -> RResult<()> {
        let s = "(I4,19F4.0/20F4.0/20F4.0/20F4.0/20F4.0/20F4.0/20F4.0/20F4.0)";
        let ff = CompiledFormat::compile(s)?;
        assert_eq!(ff.chunk_size(), 8);
        assert_eq!(ff.n_values(), 160);
        Ok(())
    }
}

//! Write integer values back out in their fixed-width layout.
//!
//! This is the inverse of [decoding](crate::decode): each value is zero-padded to its
//! field width, and a record is split into one string per physical line. Values in
//! these files are always written zero-padded, so re-encoding a decoded record gives
//! back the original text (minus any trailing padding):
//!
//! ```
//! # use anthrofmt::format_specs::CompiledFormat;
//! # use anthrofmt::encode::encode_record;
//! let fmt = CompiledFormat::compile("I4,F4.0/F4.0").unwrap();
//! let lines = encode_record(&[5048, 2313, 42], &fmt).unwrap();
//! assert_eq!(lines, vec!["50482313", "0042"]);
//! ```
use crate::format_specs::{CompiledFormat, FieldDescriptor};
use crate::record_error::{RecordError, RResult};

/// Write one value zero-padded to the width of `field`.
///
/// Negative values put the sign before the zeros (`-042`). Returns
/// [`RecordError::ValueTooWide`] if the value needs more characters than the width.
pub fn encode_value(value: i64, field: &FieldDescriptor) -> RResult<String> {
    let mut buf = String::with_capacity(field.width as usize);
    write_value(&mut buf, value, field.width)?;
    Ok(buf)
}

/// Write a full record, returning one string per physical line of `fmt`.
///
/// `values` must hold exactly one value per field repeat, subject ID first.
pub fn encode_record(values: &[i64], fmt: &CompiledFormat) -> RResult<Vec<String>> {
    if values.len() != fmt.n_values() {
        return Err(RecordError::ColumnCountMismatch { n_values: values.len(), n_columns: fmt.n_values() })
    }

    let mut values = values.iter();
    let mut lines = Vec::with_capacity(fmt.chunk_size());
    for line_fields in fmt.lines() {
        let mut line = String::new();
        for field in line_fields {
            for _ in 0..field.repeat_count {
                let &v = values.next()
                    .ok_or_else(|| RecordError::ColumnCountMismatch { n_values: 0, n_columns: fmt.n_values() })?;
                write_value(&mut line, v, field.width)?;
            }
        }
        lines.push(line);
    }

    Ok(lines)
}

fn write_value(buf: &mut String, value: i64, width: u32) -> RResult<()> {
    let mut b = itoa::Buffer::new();
    let digits = b.format(value.unsigned_abs());

    let nsign = if value < 0 { 1 } else { 0 };
    let nchar = digits.len() + nsign;
    if nchar > width as usize {
        return Err(RecordError::ValueTooWide { value, width })
    }

    if value < 0 {
        buf.push('-');
    }
    for _ in nchar..width as usize {
        buf.push('0');
    }
    buf.push_str(digits);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_records;

    fn fd(width: u32) -> FieldDescriptor {
        FieldDescriptor { repeat_count: 1, type_tag: 'F', width }
    }

    #[test]
    fn test_zero_padding() -> RResult<()> {
        assert_eq!(encode_value(42, &fd(4))?, "0042");
        assert_eq!(encode_value(0, &fd(3))?, "000");
        assert_eq!(encode_value(1234, &fd(4))?, "1234");
        assert_eq!(encode_value(-42, &fd(4))?, "-042");
        Ok(())
    }

    #[test]
    fn test_too_wide() {
        assert!(matches!(encode_value(12345, &fd(4)), Err(RecordError::ValueTooWide { value: 12345, width: 4 })));
        assert!(matches!(encode_value(-999, &fd(3)), Err(RecordError::ValueTooWide { .. })));
    }

    #[test]
    fn test_encode_multi_line() -> RResult<()> {
        let fmt = CompiledFormat::compile("I4,2F3.0/3F2.0")?;
        let lines = encode_record(&[7, 1, 22, 3, 44, 5], &fmt)?;
        assert_eq!(lines, vec!["0007001022", "034405"]);

        assert!(encode_record(&[7, 1], &fmt).is_err(), "Too few values should be rejected");
        Ok(())
    }

    #[test]
    fn test_decode_encode_round_trip() -> RResult<()> {
        let fmt = CompiledFormat::compile("I4,19F4.0/20F4.0")?;
        let names: Vec<String> = std::iter::once("SUBJECT ID".to_owned())
            .chain((1..40).map(|i| format!("V{i}")))
            .collect();
        let values: Vec<i64> = (0..40).map(|i| 1000 + i * 37).collect();

        let lines = encode_record(&values, &fmt)?;
        assert_eq!(lines[0].len(), 80);
        assert_eq!(lines[1].len(), 80);

        let table = decode_records(&lines, &fmt, &names)?;
        let row = table.row(1000).expect("subject 1000 missing");
        let decoded = row.integers().expect("all values should be integers");
        assert_eq!(decoded, values);
        assert_eq!(encode_record(&decoded, &fmt)?, lines, "Re-encoding did not reproduce the original lines");
        Ok(())
    }
}

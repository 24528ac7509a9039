use std::num::ParseIntError;

/// Parse one fixed-width slice as a base-10 integer.
///
/// Blanks around the digits are padding and are ignored, so both `"0042"` and
/// `"  42"` give 42. A leading sign is accepted. An all-blank slice is an error,
/// never an implicit zero.
pub(crate) fn parse_integer(s: &str) -> Result<i64, ParseIntError> {
    s.trim().parse()
}

/// Split a `YYMMDD`-coded value into its year, month and day parts.
///
/// The value is treated as if written zero-padded to six digits, so `10314` is
/// `(1, 3, 14)`. Returns `None` for values that cannot be written in six digits.
pub(crate) fn split_yymmdd(coded: i64) -> Option<(u32, u32, u32)> {
    if !(0..=999_999).contains(&coded) {
        return None;
    }

    let coded = coded as u32;
    Some((coded / 10_000, (coded / 100) % 100, coded % 100))
}

//! Decode legacy fixed-width anthropometric survey records.
//!
//! A survey file declares its variables, gives a Fortran-style format spec such as
//! `(I4,19F4.0/20F4.0)`, and then lists one record per group of physical lines.
//! Decoding runs in three steps, each feeding the next:
//!
//! 1. [`header::extract_header`] finds the variable names and the format spec,
//! 2. [`format_specs::CompiledFormat::compile`] turns the spec into field descriptors,
//! 3. [`decode::decode_records`] slices the data lines into a [`table::DecodedTable`].
//!
//! [`reader::parse_lines`] and [`reader::read_survey`] run all three. Coded values
//! (weights in tenths, rank numbers, `YYMMDD` dates) can then be made readable with
//! [`convert::apply_conversions`].
extern crate pest;
#[macro_use]
extern crate pest_derive;
pub mod record_error;
pub mod format_specs;
pub mod header;
pub(crate) mod parsing;
pub mod table;
pub mod decode;
pub mod encode;
pub mod code_tables;
pub mod convert;
pub mod reader;
#[cfg(feature = "dataframes")]
pub mod dataframes;

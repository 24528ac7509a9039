//! Export a decoded table as a Polars `DataFrame`.
use polars::frame::row::Row;
use polars::prelude::{AnyValue, DataFrame, DataType, Field, Schema};

use crate::record_error::RResult;
use crate::table::{DecodedTable, RecordValue};

impl DecodedTable {
    /// Build a `DataFrame` with one column per variable, subject ID first.
    ///
    /// Column types follow the values: all-integer columns become `Int64`, numeric
    /// columns with any converted (real) values become `Float64`, and anything else,
    /// including dates, becomes a `Utf8` column of the values' text. An empty table
    /// gives `Int64` columns.
    ///
    /// # Notes
    /// Like `fortformat`'s reader this builds the frame row by row, which Polars
    /// warns is slower than building it column by column.
    pub fn to_dataframe(&self) -> RResult<DataFrame> {
        let dtypes: Vec<DataType> = (0..self.columns().len())
            .map(|i| column_dtype(self.iter_rows().map(|r| &r.values()[i])))
            .collect();

        let schema = Schema::from_iter(
            self.columns().iter().zip(dtypes.iter())
                .map(|(name, dt)| Field::new(name, dt.clone()))
        );

        if self.is_empty() {
            return Ok(DataFrame::from(&schema));
        }

        let rows: Vec<Row> = self.iter_rows()
            .map(|r| {
                let values = r.values().iter().zip(dtypes.iter())
                    .map(|(v, dt)| to_any_value(v, dt))
                    .collect();
                Row::new(values)
            })
            .collect();

        Ok(DataFrame::from_rows_and_schema(&rows, &schema)?)
    }
}

fn column_dtype<'a, I: Iterator<Item = &'a RecordValue>>(values: I) -> DataType {
    let mut dtype = DataType::Int64;
    for v in values {
        match (v, &dtype) {
            (RecordValue::Integer(_), _) => (),
            (RecordValue::Real(_), DataType::Int64) => dtype = DataType::Float64,
            (RecordValue::Real(_), _) => (),
            (RecordValue::Text(_), _) | (RecordValue::Date(_), _) => return DataType::Utf8,
        }
    }
    dtype
}

fn to_any_value(value: &RecordValue, dtype: &DataType) -> AnyValue<'static> {
    match (value, dtype) {
        (RecordValue::Integer(i), DataType::Int64) => AnyValue::Int64(*i),
        (RecordValue::Integer(i), DataType::Float64) => AnyValue::Float64(*i as f64),
        (RecordValue::Real(v), DataType::Float64) => AnyValue::Float64(*v),
        (v, _) => AnyValue::Utf8Owned(v.to_string().into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{apply_conversions, default_conversions};

    #[test]
    fn test_to_dataframe() -> RResult<()> {
        let names = ["SUBJECT ID", "WEIGHT", "RANK", "SNEK"].map(String::from).to_vec();
        let mut table = DecodedTable::new(names);
        table.push_row(vec![1, 3141, 13, 1337], 0)?;
        table.push_row(vec![2, 700, 314, 42], 1)?;
        apply_conversions(&mut table, &default_conversions());

        let df = table.to_dataframe()?;
        assert_eq!(df.shape(), (2, 4));
        assert_eq!(df.column("SUBJECT ID").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("WEIGHT").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("RANK").unwrap().dtype(), &DataType::Utf8);
        assert_eq!(df.column("SNEK").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("SNEK").unwrap().get(1).unwrap(), AnyValue::Int64(42));
        Ok(())
    }

    #[test]
    fn test_empty_table() -> RResult<()> {
        let table = DecodedTable::new(["SUBJECT ID", "A"].map(String::from).to_vec());
        let df = table.to_dataframe()?;
        assert_eq!(df.shape(), (0, 2));
        Ok(())
    }
}

//! CSV ingestion for price tables.
//!
//! The first column is the datetime index; every other column is typed by
//! inspecting its cells. Structural problems are reported as input-shape
//! errors naming the input.

use std::io::Read;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{ColumnValues, PriceTable, Timestamp};
use crate::error::CorrelationError;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

impl PriceTable {
    /// Read a price table from CSV.
    ///
    /// `name` labels the input in error messages.
    pub fn from_csv_reader<R: Read>(reader: R, name: &str) -> Result<Self, CorrelationError> {
        let mut reader = ::csv::ReaderBuilder::new()
            .trim(::csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| CorrelationError::invalid_table(name, format!("unreadable header: {e}")))?
            .clone();

        if headers.len() < 2 {
            return Err(CorrelationError::invalid_table(
                name,
                "expected an index column followed by at least one data column",
            ));
        }

        let mut index = Vec::new();
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len() - 1];

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| CorrelationError::invalid_table(name, e.to_string()))?;
            let raw_ts = record.get(0).unwrap_or_default();
            let ts = parse_timestamp(raw_ts).ok_or_else(|| {
                CorrelationError::invalid_table(
                    name,
                    format!("row {} has a non-datetime index value '{raw_ts}'", row + 1),
                )
            })?;
            index.push(ts);

            for (column, cell) in cells.iter_mut().zip(record.iter().skip(1)) {
                column.push(cell.to_string());
            }
        }

        let table = headers
            .iter()
            .skip(1)
            .zip(cells)
            .fold(Self::new(index), |table, (header, column)| {
                table.with_column(header, infer_column(column))
            });

        Ok(table)
    }
}

/// Parse an index cell as a UTC timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD`, and the common naive datetime layouts.
pub(crate) fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

fn infer_column(cells: Vec<String>) -> ColumnValues {
    if !cells.is_empty() && cells.iter().all(|c| c.parse::<i64>().is_ok()) {
        return ColumnValues::Int(cells.iter().filter_map(|c| c.parse().ok()).collect());
    }

    let floats: Option<Vec<f64>> = cells
        .iter()
        .map(|c| {
            if c.is_empty() {
                Some(f64::NAN)
            } else {
                c.parse::<f64>().ok()
            }
        })
        .collect();

    match floats {
        Some(values) => ColumnValues::Float(values),
        None => ColumnValues::Text(cells),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;
    use crate::error::ErrorKind;

    const TRADINGVIEW_CSV: &str = "\
datetime,symbol,open,high,low,close,volume
2024-01-02 00:00:00,INDEX:BTCUSD,42280.1,45899.0,42150.0,44943.7,1200
2024-01-03 00:00:00,INDEX:BTCUSD,44943.7,45500.0,40750.0,42836.1,1800
2024-01-04 00:00:00,INDEX:BTCUSD,42836.1,44770.0,42630.0,44179.3,1500
";

    #[test]
    fn test_infers_column_types() {
        let Ok(table) = PriceTable::from_csv_reader(TRADINGVIEW_CSV.as_bytes(), "btc") else {
            panic!("valid csv should parse");
        };

        assert_eq!(table.len(), 3);
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["symbol", "open", "high", "low", "close", "volume"]);
        assert_eq!(table.column("symbol").unwrap().values().dtype(), "object");
        assert_eq!(table.column("close").unwrap().values().dtype(), "float64");
        assert_eq!(table.column("volume").unwrap().values().dtype(), "int64");
        assert_eq!(table.index()[0].day(), 2);
    }

    #[test]
    fn test_empty_cells_become_nan() {
        let csv = "date,close\n2024-01-01,1.5\n2024-01-02,\n2024-01-03,2.5\n";
        let table = PriceTable::from_csv_reader(csv.as_bytes(), "gold").unwrap();

        let ColumnValues::Float(values) = table.column("close").unwrap().values() else {
            panic!("close should be a float column");
        };
        assert_eq!(values.len(), 3);
        assert!(values[1].is_nan());
    }

    #[test]
    fn test_non_datetime_index_is_shape_error() {
        let csv = "ticker,close\nGOLD,1.0\nSPX,2.0\n";
        let Err(err) = PriceTable::from_csv_reader(csv.as_bytes(), "assets[GOLD]") else {
            panic!("a non-datetime index should be rejected");
        };
        assert_eq!(err.kind(), ErrorKind::InputShape);
        assert!(err.to_string().contains("assets[GOLD]"));
    }

    #[test]
    fn test_ragged_rows_are_shape_error() {
        let csv = "date,close,open\n2024-01-01,1.0,2.0\n2024-01-02,3.0\n";
        let Err(err) = PriceTable::from_csv_reader(csv.as_bytes(), "spx") else {
            panic!("ragged rows should be rejected");
        };
        assert_eq!(err.kind(), ErrorKind::InputShape);
    }

    #[test]
    fn test_index_only_is_shape_error() {
        let csv = "date\n2024-01-01\n";
        let result = PriceTable::from_csv_reader(csv.as_bytes(), "vix");
        assert!(matches!(result, Err(CorrelationError::InvalidTable { .. })));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let Some(rfc) = parse_timestamp("2024-03-01T12:30:00Z") else {
            panic!("rfc3339 should parse");
        };
        assert_eq!(rfc.hour(), 12);
        assert!(parse_timestamp("2024-03-01").is_some());
        assert!(parse_timestamp("2024-03-01 09:15:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}

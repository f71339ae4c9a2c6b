//! Loads closing-price tables from CSV.
//!
//! The expected layout is "wide": a date column followed by one column of
//! closing prices per instrument, as exported by most market data tools:
//!
//! ```text
//! Date,BMO.TO,TD.TO,RY.TO
//! 2024-01-02,123.10,80.55,131.02
//! 2024-01-03,122.70,80.91,130.44
//! ```
//!
//! Rows with a blank price for any instrument are dropped so that every
//! series shares the same date index.

use chrono::NaiveDate;
use core_types::{PriceSeries, PriceTable};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub mod error;

pub use error::DataError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reads a price table from a CSV file on disk.
pub fn load_price_table(path: impl AsRef<Path>) -> Result<PriceTable, DataError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Loading price table.");
    let file = File::open(path)?;
    read_price_table(BufReader::new(file))
}

/// Reads a price table from any CSV source.
pub fn read_price_table<R: Read>(reader: R) -> Result<PriceTable, DataError> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let instruments: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    if instruments.is_empty() {
        return Err(DataError::Empty("instrument columns"));
    }

    let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
    let mut dropped = 0usize;
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row = i + 2;

        let raw_date = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
            DataError::InvalidDate {
                row,
                value: raw_date.to_string(),
            }
        })?;

        let cells: Vec<&str> = (1..=instruments.len())
            .map(|c| record.get(c).unwrap_or_default())
            .collect();
        if cells.iter().any(|c| c.is_empty()) {
            dropped += 1;
            tracing::debug!(%date, "Dropping row with missing prices.");
            continue;
        }

        let prices = cells
            .iter()
            .zip(&instruments)
            .map(|(cell, column)| {
                cell.parse::<f64>().map_err(|_| DataError::InvalidPrice {
                    row,
                    column: column.clone(),
                    value: cell.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push((date, prices));
    }

    if rows.is_empty() {
        return Err(DataError::Empty("complete rows"));
    }
    rows.sort_by_key(|(date, _)| *date);
    if let Some(pair) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(DataError::DuplicateDate(pair[0].0));
    }

    let dates: Vec<NaiveDate> = rows.iter().map(|(d, _)| *d).collect();
    let mut table = PriceTable::new();
    for (column, instrument) in instruments.into_iter().enumerate() {
        let prices = rows.iter().map(|(_, p)| p[column]).collect();
        table.insert(instrument, PriceSeries::new(dates.clone(), prices)?)?;
    }

    tracing::info!(
        instruments = table.len(),
        rows = dates.len(),
        dropped,
        "Price table loaded."
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::CoreError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reads_wide_table() {
        let csv = "Date,BMO.TO,TD.TO\n2024-01-02,100.5,80\n2024-01-03,101,79.5\n";
        let table = read_price_table(csv.as_bytes()).unwrap();
        assert_eq!(table.instruments().collect::<Vec<_>>(), vec!["BMO.TO", "TD.TO"]);
        assert_eq!(table.get("BMO.TO").unwrap().prices(), &[100.5, 101.0]);
        assert_eq!(table.get("TD.TO").unwrap().prices(), &[80.0, 79.5]);
        assert_eq!(table.last_date(), Some(date(2024, 1, 3)));
    }

    #[test]
    fn sorts_rows_and_drops_incomplete_ones() {
        let csv = "Date,BMO.TO,TD.TO\n2024-01-04,102,81\n2024-01-02,100,80\n2024-01-03,,79\n";
        let table = read_price_table(csv.as_bytes()).unwrap();
        let bmo = table.get("BMO.TO").unwrap();
        assert_eq!(bmo.dates(), &[date(2024, 1, 2), date(2024, 1, 4)]);
        assert_eq!(bmo.prices(), &[100.0, 102.0]);
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let csv = "Date,RY.TO\n2024-01-02,100\n2024-01-02,101\n";
        assert!(matches!(
            read_price_table(csv.as_bytes()),
            Err(DataError::DuplicateDate(d)) if d == date(2024, 1, 2)
        ));
    }

    #[test]
    fn bad_cells_report_their_position() {
        let csv = "Date,RY.TO\n2024-01-02,abc\n";
        match read_price_table(csv.as_bytes()) {
            Err(DataError::InvalidPrice { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "RY.TO");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let csv = "Date,RY.TO\n02/01/2024,100\n";
        assert!(matches!(
            read_price_table(csv.as_bytes()),
            Err(DataError::InvalidDate { row: 2, .. })
        ));
    }

    #[test]
    fn non_positive_prices_are_rejected() {
        let csv = "Date,CM.TO\n2024-01-02,0\n";
        assert!(matches!(
            read_price_table(csv.as_bytes()),
            Err(DataError::Core(CoreError::NonPositivePrice { .. }))
        ));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(matches!(
            read_price_table("Date\n2024-01-02\n".as_bytes()),
            Err(DataError::Empty("instrument columns"))
        ));
        assert!(matches!(
            read_price_table("Date,BNS.TO\n".as_bytes()),
            Err(DataError::Empty("complete rows"))
        ));
    }
}

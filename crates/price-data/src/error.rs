use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read price file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: cannot parse date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("Row {row}, column '{column}': cannot parse price '{value}'")]
    InvalidPrice {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Date {0} appears more than once")]
    DuplicateDate(chrono::NaiveDate),

    #[error("Price file has no {0}")]
    Empty(&'static str),

    #[error(transparent)]
    Core(#[from] CoreError),
}

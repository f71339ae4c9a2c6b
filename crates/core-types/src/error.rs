use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Dates must be strictly increasing: {previous} is followed by {next}")]
    UnorderedDates { previous: NaiveDate, next: NaiveDate },

    #[error("Length mismatch: {dates} dates but {values} values")]
    LengthMismatch { dates: usize, values: usize },

    #[error("Price on {date} must be finite and positive, got {price}")]
    NonPositivePrice { date: NaiveDate, price: f64 },

    #[error("Series for '{0}' does not share the table's date index")]
    MisalignedIndex(String),

    #[error("Instrument '{0}' is already present in the table")]
    DuplicateInstrument(String),
}

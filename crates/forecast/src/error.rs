use analytics::AnalyticsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Invalid forecast parameter: {0}")]
    InvalidParameter(String),

    #[error("Not enough history to forecast: {0}")]
    InsufficientData(String),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

use chrono::NaiveDate;
use configuration::BandPercentiles;
use serde::Serialize;

/// Percentile bands of the simulated prices, one entry per future business day.
///
/// `dates`, `lower`, `median` and `upper` are aligned index for index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub dates: Vec<NaiveDate>,
    pub median: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub band: BandPercentiles,
    pub simulations: usize,
    /// Base seed of the path streams, when the engine chose or was given one.
    pub seed: Option<u64>,
    /// Paths whose price reached zero or below at some step.
    pub non_positive_paths: usize,
}

impl ForecastResult {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// `(date, lower, median, upper)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, f64, f64, f64)> + '_ {
        self.dates
            .iter()
            .zip(&self.lower)
            .zip(&self.median)
            .zip(&self.upper)
            .map(|(((&d, &l), &m), &u)| (d, l, m, u))
    }
}

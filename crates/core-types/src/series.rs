use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A date-indexed sequence of `f64` observations.
///
/// Dates are strictly increasing and there is exactly one value per date.
/// Every derived series (returns, volatility, ...) is a `TimeSeries` whose
/// dates are a contiguous window of its source's dates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// Daily fractional returns, dated at the later day of each price pair.
pub type ReturnSeries = TimeSeries;
/// Growth of one unit invested at the start of the return series.
pub type CumulativeReturnSeries = TimeSeries;
/// Trailing-window sample standard deviation of returns.
pub type VolatilitySeries = TimeSeries;
/// Trailing-window simple mean of prices.
pub type MovingAverageSeries = TimeSeries;

impl TimeSeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self, CoreError> {
        if dates.len() != values.len() {
            return Err(CoreError::LengthMismatch {
                dates: dates.len(),
                values: values.len(),
            });
        }
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CoreError::UnorderedDates {
                previous: pair[0],
                next: pair[1],
            });
        }
        Ok(Self { dates, values })
    }

    /// Builds a series from `values` dated with this series' dates starting at `offset`.
    ///
    /// This is how derived series inherit their alignment: the new series
    /// takes `dates[offset..offset + values.len()]`.
    pub fn aligned(&self, offset: usize, values: Vec<f64>) -> Result<Self, CoreError> {
        let end = offset + values.len();
        if end > self.dates.len() {
            return Err(CoreError::LengthMismatch {
                dates: self.dates.len().saturating_sub(offset),
                values: values.len(),
            });
        }
        Ok(Self {
            dates: self.dates[offset..end].to_vec(),
            values,
        })
    }

    /// A series on the same dates whose values are `f` applied in date order.
    pub fn map_values<F>(&self, f: F) -> Self
    where
        F: FnMut(f64) -> f64,
    {
        Self {
            dates: self.dates.clone(),
            values: self.values.iter().copied().map(f).collect(),
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<(NaiveDate, f64)> {
        Some((*self.dates.first()?, *self.values.first()?))
    }

    pub fn last(&self) -> Option<(NaiveDate, f64)> {
        Some((*self.dates.last()?, *self.values.last()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

/// Closing prices of a single instrument. Every price is finite and positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries(TimeSeries);

impl PriceSeries {
    pub fn new(dates: Vec<NaiveDate>, prices: Vec<f64>) -> Result<Self, CoreError> {
        let series = TimeSeries::new(dates, prices)?;
        if let Some((date, price)) = series.iter().find(|(_, p)| !(p.is_finite() && *p > 0.0)) {
            return Err(CoreError::NonPositivePrice { date, price });
        }
        Ok(Self(series))
    }

    pub fn as_series(&self) -> &TimeSeries {
        &self.0
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.0.dates()
    }

    pub fn prices(&self) -> &[f64] {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<(NaiveDate, f64)> {
        self.0.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn rejects_unordered_dates() {
        let err = TimeSeries::new(vec![day(2), day(1)], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            CoreError::UnorderedDates {
                previous: day(2),
                next: day(1)
            }
        );
    }

    #[test]
    fn rejects_duplicate_dates() {
        assert!(TimeSeries::new(vec![day(4), day(4)], vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = TimeSeries::new(vec![day(1)], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err, CoreError::LengthMismatch { dates: 1, values: 2 });
    }

    #[test]
    fn aligned_takes_a_window_of_parent_dates() {
        let parent = TimeSeries::new(vec![day(1), day(4), day(5)], vec![1.0, 2.0, 3.0]).unwrap();
        let child = parent.aligned(1, vec![9.0, 8.0]).unwrap();
        assert_eq!(child.dates(), &[day(4), day(5)]);
        assert_eq!(child.values(), &[9.0, 8.0]);
        assert!(parent.aligned(2, vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn price_series_requires_positive_prices() {
        assert!(PriceSeries::new(vec![day(1), day(4)], vec![10.0, 11.0]).is_ok());
        let err = PriceSeries::new(vec![day(1), day(4)], vec![10.0, 0.0]).unwrap_err();
        assert_eq!(err, CoreError::NonPositivePrice { date: day(4), price: 0.0 });
        assert!(PriceSeries::new(vec![day(1)], vec![f64::NAN]).is_err());
    }
}

use crate::error::AnalyticsError;
use crate::report::{AnalyticsReport, InstrumentAnalytics, ReturnHistogram, ReturnStats};
use crate::rolling::{RunningStat, rolling_mean, rolling_sample_std};
use configuration::AnalyticsSettings;
use core_types::{
    CumulativeReturnSeries, MovingAverageSeries, PriceSeries, PriceTable, ReturnSeries,
    VolatilitySeries,
};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// A stateless calculator for deriving return and risk series from closing prices.
///
/// Every method is a pure function of its arguments. Series that cannot be
/// defined for a position (the first return, incomplete rolling windows) are
/// dropped rather than filled, so each output is dated on a contiguous suffix
/// of its input's dates.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fractional change between consecutive closes: `p[i] / p[i-1] - 1`.
    ///
    /// The result has one entry fewer than `prices` and starts on the second date.
    pub fn compute_daily_returns(&self, prices: &PriceSeries) -> Result<ReturnSeries, AnalyticsError> {
        let p = prices.prices();
        if p.len() < 2 {
            return Err(AnalyticsError::InsufficientData {
                operation: "daily returns",
                required: 2,
                actual: p.len(),
            });
        }

        let values = p.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        Ok(prices.as_series().aligned(1, values)?)
    }

    /// Growth of one unit over the return series: running product of `1 + r`.
    pub fn compute_cumulative_returns(&self, returns: &ReturnSeries) -> CumulativeReturnSeries {
        let mut growth = 1.0;
        returns.map_values(|r| {
            growth *= 1.0 + r;
            growth
        })
    }

    /// Sample standard deviation of each trailing window of `window` returns.
    ///
    /// Returns `max(0, m - window + 1)` entries for `m` returns, dated at the
    /// last day of each window.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for `window < 2`; `InsufficientData` when fewer than
    /// `window` returns exist.
    pub fn compute_rolling_volatility(
        &self,
        returns: &ReturnSeries,
        window: usize,
    ) -> Result<VolatilitySeries, AnalyticsError> {
        if window < 2 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "rolling volatility window must be at least 2, got {window}"
            )));
        }
        if returns.len() < window {
            return Err(AnalyticsError::InsufficientData {
                operation: "rolling volatility",
                required: window,
                actual: returns.len(),
            });
        }

        let values = rolling_sample_std(returns.values(), window);
        Ok(returns.aligned(window - 1, values)?)
    }

    /// Trailing simple moving average of closing prices.
    pub fn compute_moving_average(
        &self,
        prices: &PriceSeries,
        window: usize,
    ) -> Result<MovingAverageSeries, AnalyticsError> {
        if window == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "moving average window must be at least 1".to_string(),
            ));
        }
        if prices.len() < window {
            return Err(AnalyticsError::InsufficientData {
                operation: "moving average",
                required: window,
                actual: prices.len(),
            });
        }

        let values = rolling_mean(prices.prices(), window);
        Ok(prices.as_series().aligned(window - 1, values)?)
    }

    /// Mean, sample standard deviation and range of a return series.
    pub fn return_stats(&self, returns: &ReturnSeries) -> Result<ReturnStats, AnalyticsError> {
        let values = returns.values();
        if values.len() < 2 {
            return Err(AnalyticsError::InsufficientData {
                operation: "return statistics",
                required: 2,
                actual: values.len(),
            });
        }

        let stat: RunningStat = values.iter().copied().collect();
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        Ok(ReturnStats {
            count: stat.count(),
            mean: stat.mean(),
            std_dev: stat.sample_std(),
            min,
            max,
        })
    }

    /// Equal-width histogram of the return distribution over `bins` bins.
    pub fn return_histogram(
        &self,
        returns: &ReturnSeries,
        bins: usize,
    ) -> Result<ReturnHistogram, AnalyticsError> {
        if bins == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "histogram needs at least one bin".to_string(),
            ));
        }
        let values = returns.values();
        if values.is_empty() {
            return Err(AnalyticsError::InsufficientData {
                operation: "return histogram",
                required: 1,
                actual: 0,
            });
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        // A degenerate range is widened by half a unit on each side.
        let (lo, hi) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
        let width = (hi - lo) / bins as f64;

        let mut edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        edges[bins] = hi;

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(ReturnHistogram { edges, counts })
    }

    /// Derives every series for a single instrument.
    #[tracing::instrument(name = "analyze_instrument", skip(self, prices, settings))]
    pub fn analyze_instrument(
        &self,
        instrument: &str,
        prices: &PriceSeries,
        settings: &AnalyticsSettings,
    ) -> Result<InstrumentAnalytics, AnalyticsError> {
        let returns = self.compute_daily_returns(prices)?;
        let cumulative_returns = self.compute_cumulative_returns(&returns);
        let volatility = self.compute_rolling_volatility(&returns, settings.volatility_window)?;
        let stats = self.return_stats(&returns)?;
        let histogram = self.return_histogram(&returns, settings.histogram_bins)?;

        let mut moving_averages = BTreeMap::new();
        for &window in &settings.moving_average_windows {
            match self.compute_moving_average(prices, window) {
                Ok(ma) => {
                    moving_averages.insert(window, ma);
                }
                Err(AnalyticsError::InsufficientData { actual, .. }) => {
                    tracing::debug!(window, points = actual, "History shorter than moving average window, skipping.");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(
            returns = returns.len(),
            volatility_points = volatility.len(),
            mean = stats.mean,
            std_dev = stats.std_dev,
            "Instrument analytics computed."
        );

        Ok(InstrumentAnalytics {
            instrument: instrument.to_string(),
            prices: prices.clone(),
            returns,
            cumulative_returns,
            volatility,
            moving_averages,
            stats,
            histogram,
        })
    }

    /// Analyzes every instrument of `table` in parallel.
    ///
    /// Instruments share nothing, so they are processed independently; the
    /// first failure aborts the whole batch and no partial report is returned.
    pub fn analyze(
        &self,
        table: &PriceTable,
        settings: &AnalyticsSettings,
    ) -> Result<AnalyticsReport, AnalyticsError> {
        tracing::info!(instruments = table.len(), "Running analytics over price table.");

        let instruments = table
            .as_map()
            .par_iter()
            .map(|(id, prices)| {
                self.analyze_instrument(id, prices, settings)
                    .map(|analytics| (id.clone(), analytics))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(AnalyticsReport { instruments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const EPS: f64 = 1e-12;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        start.iter_days().take(n).collect()
    }

    fn prices(values: &[f64]) -> PriceSeries {
        PriceSeries::new(dates(values.len()), values.to_vec()).unwrap()
    }

    #[test]
    fn end_to_end_three_prices() {
        let engine = AnalyticsEngine::new();
        let p = prices(&[100.0, 110.0, 99.0]);

        let returns = engine.compute_daily_returns(&p).unwrap();
        assert_eq!(returns.len(), 2);
        assert!((returns.values()[0] - 0.10).abs() < EPS);
        assert!((returns.values()[1] + 0.10).abs() < EPS);
        assert_eq!(returns.dates(), &p.dates()[1..]);

        let cumulative = engine.compute_cumulative_returns(&returns);
        assert!((cumulative.values()[0] - 1.10).abs() < EPS);
        assert!((cumulative.values()[1] - 0.99).abs() < EPS);

        let vol = engine.compute_rolling_volatility(&returns, 2).unwrap();
        assert_eq!(vol.len(), 1);
        // Sample std of [0.1, -0.1]: sqrt((0.01 + 0.01) / 1).
        assert!((vol.values()[0] - 0.02_f64.sqrt()).abs() < 1e-10);
        assert_eq!(vol.dates(), &p.dates()[2..]);
    }

    #[test]
    fn single_price_is_insufficient() {
        let engine = AnalyticsEngine::new();
        let err = engine.compute_daily_returns(&prices(&[100.0])).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::InsufficientData {
                operation: "daily returns",
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn volatility_rejects_bad_windows() {
        let engine = AnalyticsEngine::new();
        let returns = engine
            .compute_daily_returns(&prices(&[10.0, 11.0, 12.0, 11.5]))
            .unwrap();
        assert!(matches!(
            engine.compute_rolling_volatility(&returns, 1),
            Err(AnalyticsError::InvalidParameter(_))
        ));
        assert!(matches!(
            engine.compute_rolling_volatility(&returns, 4),
            Err(AnalyticsError::InsufficientData { required: 4, actual: 3, .. })
        ));
        assert_eq!(engine.compute_rolling_volatility(&returns, 3).unwrap().len(), 1);
    }

    #[test]
    fn cumulative_of_empty_is_empty() {
        let engine = AnalyticsEngine::new();
        assert!(engine.compute_cumulative_returns(&ReturnSeries::default()).is_empty());
    }

    #[test]
    fn moving_average_drops_incomplete_windows() {
        let engine = AnalyticsEngine::new();
        let p = prices(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let ma = engine.compute_moving_average(&p, 3).unwrap();
        assert_eq!(ma.values(), &[2.0, 3.0, 4.0]);
        assert_eq!(ma.dates(), &p.dates()[2..]);
        assert!(engine.compute_moving_average(&p, 0).is_err());
        assert!(engine.compute_moving_average(&p, 6).is_err());
    }

    #[test]
    fn return_stats_use_sample_deviation() {
        let engine = AnalyticsEngine::new();
        let returns = engine
            .compute_daily_returns(&prices(&[100.0, 110.0, 99.0]))
            .unwrap();
        let stats = engine.return_stats(&returns).unwrap();
        assert_eq!(stats.count, 2);
        assert!(stats.mean.abs() < EPS);
        assert!((stats.std_dev - 0.02_f64.sqrt()).abs() < 1e-10);
        assert!((stats.min + 0.1).abs() < EPS);
        assert!((stats.max - 0.1).abs() < EPS);
    }

    #[test]
    fn histogram_counts_every_return() {
        let engine = AnalyticsEngine::new();
        let p = prices(&[100.0, 101.0, 99.0, 102.0, 98.0, 100.0, 103.0]);
        let returns = engine.compute_daily_returns(&p).unwrap();
        let hist = engine.return_histogram(&returns, 4).unwrap();
        assert_eq!(hist.bins(), 4);
        assert_eq!(hist.edges.len(), 5);
        assert_eq!(hist.total(), returns.len());
        // The maximum lands in the last, right-closed bin.
        assert!(hist.counts[3] >= 1);
    }

    #[test]
    fn histogram_of_constant_returns_widens_range() {
        let engine = AnalyticsEngine::new();
        let p = prices(&[100.0, 100.0, 100.0]);
        let returns = engine.compute_daily_returns(&p).unwrap();
        let hist = engine.return_histogram(&returns, 2).unwrap();
        assert_eq!(hist.edges, vec![-0.5, 0.0, 0.5]);
        assert_eq!(hist.counts, vec![0, 2]);
    }

    #[test]
    fn analyze_table_covers_every_instrument() {
        let engine = AnalyticsEngine::new();
        let n = 40;
        let mut table = PriceTable::new();
        table
            .insert(
                "BMO.TO",
                PriceSeries::new(dates(n), (0..n).map(|i| 100.0 + (i % 3) as f64).collect()).unwrap(),
            )
            .unwrap();
        table
            .insert(
                "TD.TO",
                PriceSeries::new(dates(n), (0..n).map(|i| 80.0 - (i % 4) as f64).collect()).unwrap(),
            )
            .unwrap();

        let settings = AnalyticsSettings {
            volatility_window: 5,
            moving_average_windows: vec![10, 100],
            histogram_bins: 10,
        };
        let report = engine.analyze(&table, &settings).unwrap();
        assert_eq!(report.len(), 2);

        let bmo = report.get("BMO.TO").unwrap();
        assert_eq!(bmo.returns.len(), n - 1);
        assert_eq!(bmo.volatility.len(), n - 1 - 5 + 1);
        assert!(bmo.moving_averages.contains_key(&10));
        assert!(!bmo.moving_averages.contains_key(&100));
        assert_eq!(bmo.last_date(), table.last_date());
    }

    #[test]
    fn analyze_fails_atomically_on_short_history() {
        let engine = AnalyticsEngine::new();
        let mut table = PriceTable::new();
        table
            .insert("RY.TO", PriceSeries::new(dates(10), vec![50.0; 10]).unwrap())
            .unwrap();
        let result = engine.analyze(&table, &AnalyticsSettings::default());
        assert!(matches!(
            result,
            Err(AnalyticsError::InsufficientData { operation: "rolling volatility", .. })
        ));
    }
}

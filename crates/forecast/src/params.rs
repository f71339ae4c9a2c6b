use crate::error::ForecastError;
use analytics::{AnalyticsEngine, InstrumentAnalytics};
use chrono::NaiveDate;
use configuration::{BandPercentiles, ForecastBasis, ForecastSettings};
use core_types::PriceSeries;
use serde::Serialize;

/// Inputs of one Monte Carlo forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastParams {
    /// Starting level of every path. Must be positive.
    pub last_price: f64,
    /// Mean of the daily return distribution.
    pub mean_return: f64,
    /// Standard deviation of the daily return distribution. Zero is allowed.
    pub std_return: f64,
    pub horizon_days: usize,
    pub simulations: usize,
    pub seed: Option<u64>,
    pub band: BandPercentiles,
}

impl ForecastParams {
    pub const DEFAULT_HORIZON_DAYS: usize = 60;
    pub const DEFAULT_SIMULATIONS: usize = 1000;

    pub fn new(last_price: f64, mean_return: f64, std_return: f64) -> Self {
        Self {
            last_price,
            mean_return,
            std_return,
            horizon_days: Self::DEFAULT_HORIZON_DAYS,
            simulations: Self::DEFAULT_SIMULATIONS,
            seed: None,
            band: BandPercentiles::default(),
        }
    }

    pub fn from_settings(
        last_price: f64,
        mean_return: f64,
        std_return: f64,
        settings: &ForecastSettings,
    ) -> Self {
        Self {
            last_price,
            mean_return,
            std_return,
            horizon_days: settings.horizon_days,
            simulations: settings.simulations,
            seed: settings.seed,
            band: settings.band,
        }
    }

    pub fn horizon_days(mut self, horizon_days: usize) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    pub fn simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn band(mut self, band: BandPercentiles) -> Self {
        self.band = band;
        self
    }

    pub fn validate(&self) -> Result<(), ForecastError> {
        if !(self.last_price.is_finite() && self.last_price > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "last price must be finite and positive, got {}",
                self.last_price
            )));
        }
        if !self.mean_return.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "mean return must be finite, got {}",
                self.mean_return
            )));
        }
        if !(self.std_return.is_finite() && self.std_return >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "return standard deviation must be finite and non-negative, got {}",
                self.std_return
            )));
        }
        if self.horizon_days < 1 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least one day".to_string(),
            ));
        }
        if self.simulations < 1 {
            return Err(ForecastError::InvalidParameter(
                "at least one simulation is required".to_string(),
            ));
        }
        self.band.validate().map_err(ForecastError::InvalidParameter)
    }
}

/// A forecast for a named instrument, anchored on its last historical date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRequest {
    pub instrument: String,
    pub last_date: NaiveDate,
    pub basis: ForecastBasis,
    pub params: ForecastParams,
}

impl ForecastRequest {
    /// Builds a request from an instrument's analytics.
    ///
    /// The distribution parameters are the sample mean and standard deviation
    /// of its daily returns. The starting level is the last close for
    /// `ForecastBasis::Price`, or the last cumulative return for
    /// `ForecastBasis::CumulativeReturn`.
    pub fn from_analytics(
        analytics: &InstrumentAnalytics,
        settings: &ForecastSettings,
    ) -> Result<Self, ForecastError> {
        let missing = || {
            ForecastError::InsufficientData(format!("'{}' has no price history", analytics.instrument))
        };
        let last_date = analytics.last_date().ok_or_else(missing)?;
        let start = match settings.basis {
            ForecastBasis::Price => analytics.last_price(),
            ForecastBasis::CumulativeReturn => analytics.last_cumulative_return(),
        }
        .ok_or_else(missing)?;

        Ok(Self {
            instrument: analytics.instrument.clone(),
            last_date,
            basis: settings.basis,
            params: ForecastParams::from_settings(
                start,
                analytics.stats.mean,
                analytics.stats.std_dev,
                settings,
            ),
        })
    }

    /// Builds a request straight from closing prices, deriving only the
    /// return statistics the forecast needs.
    pub fn from_prices(
        instrument: &str,
        prices: &PriceSeries,
        settings: &ForecastSettings,
    ) -> Result<Self, ForecastError> {
        let engine = AnalyticsEngine::new();
        let returns = engine.compute_daily_returns(prices)?;
        let stats = engine.return_stats(&returns)?;
        let (last_date, last_price) = prices
            .last()
            .ok_or_else(|| ForecastError::InsufficientData(format!("'{instrument}' has no price history")))?;
        let start = match settings.basis {
            ForecastBasis::Price => last_price,
            ForecastBasis::CumulativeReturn => {
                let cumulative = engine.compute_cumulative_returns(&returns);
                cumulative.last().map(|(_, v)| v).unwrap_or(1.0)
            }
        };

        Ok(Self {
            instrument: instrument.to_string(),
            last_date,
            basis: settings.basis,
            params: ForecastParams::from_settings(start, stats.mean, stats.std_dev, settings),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn prices() -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let closes = vec![100.0, 110.0, 99.0, 104.0];
        PriceSeries::new(start.iter_days().take(closes.len()).collect(), closes).unwrap()
    }

    #[test]
    fn defaults_follow_reference_run() {
        let p = ForecastParams::new(100.0, 0.001, 0.02);
        assert_eq!(p.horizon_days, 60);
        assert_eq!(p.simulations, 1000);
        assert_eq!(p.seed, None);
        assert_eq!(p.band, BandPercentiles::default());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn validation_rejects_out_of_domain_inputs() {
        let base = ForecastParams::new(100.0, 0.0, 0.01);
        assert!(ForecastParams { last_price: 0.0, ..base.clone() }.validate().is_err());
        assert!(ForecastParams { last_price: -5.0, ..base.clone() }.validate().is_err());
        assert!(ForecastParams { std_return: -0.1, ..base.clone() }.validate().is_err());
        assert!(ForecastParams { mean_return: f64::NAN, ..base.clone() }.validate().is_err());
        assert!(base.clone().simulations(0).validate().is_err());
        assert!(base.clone().horizon_days(0).validate().is_err());
        assert!(
            base.clone()
                .band(BandPercentiles { lower: 5.0, median: 50.0, upper: 101.0 })
                .validate()
                .is_err()
        );
        assert!(ForecastParams { std_return: 0.0, ..base }.validate().is_ok());
    }

    #[test]
    fn request_from_prices_uses_return_stats() {
        let settings = ForecastSettings { seed: Some(9), ..ForecastSettings::default() };
        let request = ForecastRequest::from_prices("BMO.TO", &prices(), &settings).unwrap();
        assert_eq!(request.last_date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(request.params.last_price, 104.0);
        assert_eq!(request.params.seed, Some(9));

        let engine = AnalyticsEngine::new();
        let stats = engine
            .return_stats(&engine.compute_daily_returns(&prices()).unwrap())
            .unwrap();
        assert_eq!(request.params.mean_return, stats.mean);
        assert_eq!(request.params.std_return, stats.std_dev);
    }

    #[test]
    fn cumulative_basis_starts_from_growth_of_one() {
        let settings = ForecastSettings {
            basis: ForecastBasis::CumulativeReturn,
            ..ForecastSettings::default()
        };
        let request = ForecastRequest::from_prices("BMO.TO", &prices(), &settings).unwrap();
        assert!((request.params.last_price - 1.04).abs() < 1e-12);
    }

    #[test]
    fn short_history_cannot_be_forecast() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let one = PriceSeries::new(vec![start], vec![100.0]).unwrap();
        let err = ForecastRequest::from_prices("TD.TO", &one, &ForecastSettings::default()).unwrap_err();
        assert!(matches!(err, ForecastError::Analytics(_)));
    }
}

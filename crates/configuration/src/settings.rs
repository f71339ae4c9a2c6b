use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analytics: AnalyticsSettings,
    pub forecast: ForecastSettings,
    pub logging: LoggingSettings,
}

/// Parameters for the return and volatility analytics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Number of trailing returns in each rolling volatility window.
    pub volatility_window: usize,
    /// Trailing windows (in trading days) for the simple moving averages of price.
    pub moving_average_windows: Vec<usize>,
    /// Number of equal-width bins in the daily return histogram.
    pub histogram_bins: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            volatility_window: 30,
            moving_average_windows: vec![30, 100],
            histogram_bins: 50,
        }
    }
}

/// Parameters for the Monte Carlo price forecast.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Number of business days to project past the last historical date.
    pub horizon_days: usize,
    /// Number of independent simulated paths.
    pub simulations: usize,
    /// Fixed base seed. `None` draws a fresh one per run.
    pub seed: Option<u64>,
    pub band: BandPercentiles,
    pub basis: ForecastBasis,
    /// Spread paths across the rayon thread pool.
    pub parallel: bool,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon_days: 60,
            simulations: 1000,
            seed: None,
            band: BandPercentiles::default(),
            basis: ForecastBasis::default(),
            parallel: true,
        }
    }
}

/// The percentiles (0-100) reported for each forecast day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandPercentiles {
    pub lower: f64,
    pub median: f64,
    pub upper: f64,
}

impl Default for BandPercentiles {
    fn default() -> Self {
        Self {
            lower: 5.0,
            median: 50.0,
            upper: 95.0,
        }
    }
}

impl BandPercentiles {
    pub fn validate(&self) -> Result<(), String> {
        let in_range = |p: f64| (0.0..=100.0).contains(&p);
        if !(in_range(self.lower) && in_range(self.median) && in_range(self.upper)) {
            return Err(format!(
                "band percentiles must lie in [0, 100], got {}/{}/{}",
                self.lower, self.median, self.upper
            ));
        }
        if !(self.lower <= self.median && self.median <= self.upper) {
            return Err(format!(
                "band percentiles must satisfy lower <= median <= upper, got {}/{}/{}",
                self.lower, self.median, self.upper
            ));
        }
        Ok(())
    }
}

/// The starting level a forecast projects from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ForecastBasis {
    /// The last closing price.
    #[default]
    Price,
    /// The last cumulative return, i.e. the value of one unit invested at the start.
    CumulativeReturn,
}

/// Where log output goes in addition to stderr.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Directory for daily rolling log files. Unset disables file logging.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "bankscope.log".to_string(),
        }
    }
}

impl Config {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analytics;
        if a.volatility_window < 2 {
            return Err(ConfigError::ValidationError(format!(
                "analytics.volatility_window must be at least 2, got {}",
                a.volatility_window
            )));
        }
        if a.moving_average_windows.iter().any(|&w| w == 0) {
            return Err(ConfigError::ValidationError(
                "analytics.moving_average_windows must not contain 0".to_string(),
            ));
        }
        if a.histogram_bins == 0 {
            return Err(ConfigError::ValidationError(
                "analytics.histogram_bins must be at least 1".to_string(),
            ));
        }

        let f = &self.forecast;
        if f.horizon_days == 0 {
            return Err(ConfigError::ValidationError(
                "forecast.horizon_days must be at least 1".to_string(),
            ));
        }
        if f.simulations == 0 {
            return Err(ConfigError::ValidationError(
                "forecast.simulations must be at least 1".to_string(),
            ));
        }
        f.band
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("forecast.band: {e}")))?;

        Ok(())
    }
}

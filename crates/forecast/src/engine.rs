use crate::calendar::business_days_after;
use crate::error::ForecastError;
use crate::params::{ForecastParams, ForecastRequest};
use crate::percentile::percentiles;
use crate::result::ForecastResult;
use crate::streams::{ChaChaStreams, PathStreams};
use chrono::NaiveDate;
use configuration::ForecastSettings;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

/// How simulated paths are scheduled. Seeded output is identical for both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    Parallel,
    Sequential,
}

/// Monte Carlo projection of price paths under i.i.d. normal daily returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastEngine {
    execution: Execution,
}

impl ForecastEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_execution(execution: Execution) -> Self {
        Self { execution }
    }

    pub fn from_settings(settings: &ForecastSettings) -> Self {
        let execution = if settings.parallel {
            Execution::Parallel
        } else {
            Execution::Sequential
        };
        Self::with_execution(execution)
    }

    pub fn execution(&self) -> Execution {
        self.execution
    }

    /// Runs a forecast for a prepared request.
    pub fn run(&self, request: &ForecastRequest) -> Result<ForecastResult, ForecastError> {
        tracing::info!(
            instrument = %request.instrument,
            basis = ?request.basis,
            start = request.params.last_price,
            "Running Monte Carlo forecast."
        );
        self.forecast(&request.params, request.last_date)
    }

    /// Simulates `params.simulations` paths of `params.horizon_days` steps
    /// starting after `last_date`, and reduces them to percentile bands.
    ///
    /// With `params.seed` set the result is fully reproducible. Without it a
    /// base seed is drawn and reported in `ForecastResult::seed`.
    pub fn forecast(
        &self,
        params: &ForecastParams,
        last_date: NaiveDate,
    ) -> Result<ForecastResult, ForecastError> {
        let streams = match params.seed {
            Some(seed) => ChaChaStreams::new(seed),
            None => ChaChaStreams::from_entropy(),
        };
        let mut result = self.forecast_with(params, last_date, &streams)?;
        result.seed = Some(streams.seed());
        Ok(result)
    }

    /// Same as [`ForecastEngine::forecast`] with caller-supplied random streams.
    ///
    /// `params.seed` is ignored; the streams fully determine the draws.
    pub fn forecast_with<S: PathStreams>(
        &self,
        params: &ForecastParams,
        last_date: NaiveDate,
        streams: &S,
    ) -> Result<ForecastResult, ForecastError> {
        params.validate()?;

        let horizon = params.horizon_days;
        let dates = business_days_after(last_date, horizon).ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "{horizon} business days after {last_date} exceed the supported calendar"
            ))
        })?;
        let normal = Normal::new(params.mean_return, params.std_return)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

        tracing::debug!(
            simulations = params.simulations,
            horizon,
            mean = params.mean_return,
            std_dev = params.std_return,
            execution = ?self.execution,
            "Simulating price paths."
        );

        // Map: one independent trajectory per path.
        let simulate = |path: usize| -> Vec<f64> {
            let mut rng = streams.stream(path);
            let mut price = params.last_price;
            (0..horizon)
                .map(|_| {
                    price *= 1.0 + normal.sample(&mut rng);
                    price
                })
                .collect()
        };
        let paths: Vec<Vec<f64>> = match self.execution {
            Execution::Parallel => (0..params.simulations).into_par_iter().map(&simulate).collect(),
            Execution::Sequential => (0..params.simulations).map(&simulate).collect(),
        };

        let non_positive_paths = paths
            .iter()
            .filter(|path| path.iter().any(|&p| p <= 0.0))
            .count();
        if non_positive_paths > 0 {
            tracing::warn!(
                non_positive_paths,
                simulations = params.simulations,
                "Some simulated paths reached a non-positive price."
            );
        }

        // Reduce: per-day percentiles across all paths.
        let band = params.band;
        let qs = [band.lower, band.median, band.upper];
        let mut lower = Vec::with_capacity(horizon);
        let mut median = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut column = vec![0.0; params.simulations];
        for day in 0..horizon {
            for (slot, path) in column.iter_mut().zip(&paths) {
                *slot = path[day];
            }
            let p = percentiles(&mut column, &qs);
            lower.push(p[0]);
            median.push(p[1]);
            upper.push(p[2]);
        }

        Ok(ForecastResult {
            dates,
            median,
            lower,
            upper,
            band,
            simulations: params.simulations,
            seed: None,
            non_positive_paths,
        })
    }
}

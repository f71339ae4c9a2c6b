//! # Bankscope Forecast Engine
//!
//! Monte Carlo projection of an instrument's future price. Daily returns are
//! drawn from a normal distribution fitted to the instrument's history, paths
//! are compounded independently and the ensemble is summarized per day as a
//! lower / median / upper percentile band over business-day dates.
//!
//! ## Public API
//!
//! - `ForecastEngine`: Runs the simulation, in parallel or sequentially.
//! - `ForecastParams` / `ForecastRequest`: Inputs, built by hand or from analytics.
//! - `ForecastResult`: Dates and percentile bands.
//! - `PathStreams` / `ChaChaStreams`: Injectable per-path randomness.

pub mod calendar;
pub mod engine;
pub mod error;
pub mod params;
pub mod percentile;
pub mod result;
pub mod streams;

pub use configuration::{BandPercentiles, ForecastBasis};
pub use engine::{Execution, ForecastEngine};
pub use error::ForecastError;
pub use params::{ForecastParams, ForecastRequest};
pub use result::ForecastResult;
pub use streams::{ChaChaStreams, PathStreams};

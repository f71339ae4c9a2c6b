use chrono::NaiveDate;
use core_types::{
    CumulativeReturnSeries, MovingAverageSeries, PriceSeries, ReturnSeries, VolatilitySeries,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Sample statistics of a daily return series.
///
/// `mean` and `std_dev` are the distribution parameters handed to the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (denominator `count - 1`).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Equal-width histogram of daily returns.
///
/// `edges` has one more element than `counts`. Every bin is half-open
/// `[edge_i, edge_i+1)` except the last, which also includes its right edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnHistogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl ReturnHistogram {
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(lower_edge, upper_edge, count)` for each bin.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(e, &c)| (e[0], e[1], c))
    }
}

/// Everything the analytics engine derives for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentAnalytics {
    pub instrument: String,
    pub prices: PriceSeries,
    pub returns: ReturnSeries,
    pub cumulative_returns: CumulativeReturnSeries,
    pub volatility: VolatilitySeries,
    /// Keyed by window length. Windows longer than the history are absent.
    pub moving_averages: BTreeMap<usize, MovingAverageSeries>,
    pub stats: ReturnStats,
    pub histogram: ReturnHistogram,
}

impl InstrumentAnalytics {
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.prices.last().map(|(d, _)| d)
    }

    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().map(|(_, p)| p)
    }

    pub fn last_cumulative_return(&self) -> Option<f64> {
        self.cumulative_returns.last().map(|(_, v)| v)
    }

    pub fn last_volatility(&self) -> Option<f64> {
        self.volatility.last().map(|(_, v)| v)
    }
}

/// Analytics for every instrument of a price table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub instruments: BTreeMap<String, InstrumentAnalytics>,
}

impl AnalyticsReport {
    pub fn get(&self, instrument: &str) -> Option<&InstrumentAnalytics> {
        self.instruments.get(instrument)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentAnalytics> {
        self.instruments.values()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

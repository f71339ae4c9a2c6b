pub mod error;
pub mod series;
pub mod table;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use series::{
    CumulativeReturnSeries, MovingAverageSeries, PriceSeries, ReturnSeries, TimeSeries,
    VolatilitySeries,
};
pub use table::PriceTable;

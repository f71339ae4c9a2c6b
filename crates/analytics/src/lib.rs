//! # Bankscope Analytics Engine
//!
//! This crate turns closing prices into the derived series the rest of the
//! system consumes: daily returns, cumulative returns, rolling volatility,
//! moving averages and the summary statistics of the return distribution.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` and `configuration` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless calculator. It takes
//!   price series as input and returns new series; nothing is cached between calls.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `InstrumentAnalytics` / `AnalyticsReport`: Per-instrument and per-table results.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod rolling;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{AnalyticsReport, InstrumentAnalytics, ReturnHistogram, ReturnStats};

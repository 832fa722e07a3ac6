//! # MarketLens Analytics Engine
//!
//! This crate turns a filtered view of stock records into the numbers the
//! dashboards display: time-bucketed aggregates, rolling volatility, KPI
//! summaries and overview KPI sets.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files,
//!   caches or HTTP. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every function takes a borrowed view
//!   (`&[&Record]`) and returns fresh values. The canonical table is never touched.
//! - **Missing, Not Zero:** Statistics skip missing cells and report undefined
//!   results as NaN or `None`. Only the `Sanitize` pass at the response boundary
//!   turns non-finite numbers into `0`.
//!
//! ## Public API
//!
//! - `Aggregator`: Buckets a view by `Period` and produces `BucketRow`s.
//! - `summarize`: Computes the five-field `KpiSummary`.
//! - `OverviewKind`: Computes the market / performance / valuation KPI sets.
//! - `Sanitize`: Makes any payload JSON-safe.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod aggregator;
pub mod error;
pub mod kpi;
pub mod overview;
pub mod sanitize;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use aggregator::{
    AggregationPolicy, AggregationSettings, Aggregator, BucketRow, Metric, MissingPolicy,
    DEFAULT_VOLATILITY_WINDOW, SHARPE_EPSILON,
};
pub use error::AnalyticsError;
pub use kpi::{summarize, KpiSummary};
pub use overview::{Overview, OverviewKind};
pub use sanitize::{finite_or_zero, Sanitize};

//! # MarketLens Dashboards
//!
//! This crate assembles the three dashboard views the frontend renders and
//! keeps the computed payloads in memory.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Orchestration:** It wires the `dataset` store to the `analytics`
//!   engine. It knows nothing about HTTP; the web server only calls `DashboardService`.
//! - **Sanitize at the Boundary:** Every payload leaving this crate has passed
//!   through `Sanitize`, so it can be serialized to JSON without NaN or infinities.
//! - **Compute Once:** The dataset is immutable, so a payload is a pure function
//!   of its `CacheKey` and is stored after the first request.
//!
//! ## Public API
//!
//! - `DashboardService`: Serves views, KPI summaries and overview KPI sets.
//! - `ViewId` / `ViewPayload`: The dashboards and their response shapes.
//! - `ResultCache` / `CachePolicy`: The memoization layer.
//! - `DashboardError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod assemble;
pub mod cache;
pub mod error;
pub mod service;
pub mod views;

// Re-export the key components to create a clean, public-facing API.
pub use assemble::assemble;
pub use cache::{CacheKey, CachePolicy, ResultCache};
pub use error::DashboardError;
pub use service::DashboardService;
pub use views::{
    DatePoint, DeepDivePayload, EarningsPoint, IndustryProfile, NamedValue, ReturnVolumePoint,
    SectorProfile, SectorReturn, SectorRiskPayload, SectorShare, SummaryPayload, ViewId, ViewPayload,
};

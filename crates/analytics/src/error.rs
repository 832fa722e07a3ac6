use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("The filtered view is empty; summary statistics are undefined")]
    EmptyResult,

    #[error("Rolling volatility window must be at least 2 observations, got {0}")]
    InvalidWindow(usize),

    #[error("Unknown overview '{0}'; expected market, performance or valuation")]
    UnknownOverview(String),
}

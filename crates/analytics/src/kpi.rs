use crate::aggregator::SHARPE_EPSILON;
use crate::error::AnalyticsError;
use crate::stats::{mean, round2, sample_std};
use core_types::Record;
use serde::{Deserialize, Serialize};

/// The five headline numbers shown on every dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    #[serde(rename = "Avg Return (%)")]
    pub avg_return: f64,
    #[serde(rename = "Volatility (%)")]
    pub volatility: f64,
    #[serde(rename = "Sharpe Ratio")]
    pub sharpe_ratio: f64,
    #[serde(rename = "Avg Volume (M)")]
    pub avg_volume_m: f64,
    #[serde(rename = "Beta")]
    pub beta: f64,
}

impl KpiSummary {
    /// Label/value pairs in display order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("Avg Return (%)", self.avg_return),
            ("Volatility (%)", self.volatility),
            ("Sharpe Ratio", self.sharpe_ratio),
            ("Avg Volume (M)", self.avg_volume_m),
            ("Beta", self.beta),
        ]
    }
}

/// Mean of `Return` over the view, NaN when undefined.
pub fn mean_return(view: &[&Record]) -> f64 {
    mean(view.iter().map(|r| r.return_pct)).unwrap_or(f64::NAN)
}

/// Sample standard deviation of `Return` over the view, NaN when undefined.
pub fn return_std(view: &[&Record]) -> f64 {
    sample_std(view.iter().map(|r| r.return_pct)).unwrap_or(f64::NAN)
}

/// Computes the KPI summary of an unaggregated view.
///
/// An empty view has no defined statistics and is reported as
/// `AnalyticsError::EmptyResult`. A non-empty view may still carry NaN fields
/// (e.g. the volatility of a single row); those are left for the sanitizer.
pub fn summarize(view: &[&Record]) -> Result<KpiSummary, AnalyticsError> {
    if view.is_empty() {
        return Err(AnalyticsError::EmptyResult);
    }

    let avg_return = mean_return(view);
    let std = return_std(view);
    let avg_volume = mean(view.iter().map(|r| r.volume)).unwrap_or(f64::NAN);
    let beta = mean(view.iter().map(|r| r.beta)).unwrap_or(f64::NAN);

    Ok(KpiSummary {
        avg_return: round2(avg_return),
        volatility: round2(std),
        sharpe_ratio: round2(avg_return / (std + SHARPE_EPSILON)),
        avg_volume_m: round2(avg_volume / 1_000_000.0),
        beta: round2(beta),
    })
}

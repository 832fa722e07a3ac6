//! Scrubs non-finite floats before anything is serialized.
//!
//! JSON has no token for NaN or the infinities, so every payload is passed
//! through `Sanitize` on its way to the response boundary.

use crate::aggregator::BucketRow;
use crate::kpi::KpiSummary;

/// Replaces NaN, `+inf` and `-inf` with `0`.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// A value whose floats can be made JSON-safe in place.
pub trait Sanitize {
    fn sanitize(&mut self);

    /// Consumes and returns the sanitized value.
    fn sanitized(mut self) -> Self
    where
        Self: Sized,
    {
        self.sanitize();
        self
    }
}

impl Sanitize for f64 {
    fn sanitize(&mut self) {
        *self = finite_or_zero(*self);
    }
}

impl<T: Sanitize> Sanitize for Vec<T> {
    fn sanitize(&mut self) {
        self.iter_mut().for_each(Sanitize::sanitize);
    }
}

impl<T: Sanitize> Sanitize for Option<T> {
    fn sanitize(&mut self) {
        if let Some(inner) = self {
            inner.sanitize();
        }
    }
}

impl Sanitize for KpiSummary {
    fn sanitize(&mut self) {
        self.avg_return.sanitize();
        self.volatility.sanitize();
        self.sharpe_ratio.sanitize();
        self.avg_volume_m.sanitize();
        self.beta.sanitize();
    }
}

impl Sanitize for BucketRow {
    fn sanitize(&mut self) {
        for value in [
            &mut self.return_pct,
            &mut self.volume,
            &mut self.beta,
            &mut self.pe_ratio,
            &mut self.eps,
            &mut self.dividend_yield,
            &mut self.close,
            &mut self.market_cap,
            &mut self.volatility,
            &mut self.sharpe_ratio,
        ] {
            value.sanitize();
        }
    }
}

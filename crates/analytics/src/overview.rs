use crate::error::AnalyticsError;
use crate::sanitize::Sanitize;
use crate::stats::{mean, median, round2, sum};
use core_types::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Headline market averages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    #[serde(rename = "Average Beta")]
    pub average_beta: f64,
    #[serde(rename = "Avg Daily Change (%)")]
    pub avg_daily_change: f64,
    #[serde(rename = "Avg Dividend Yield (%)")]
    pub avg_dividend_yield: f64,
    #[serde(rename = "Avg EPS")]
    pub avg_eps: f64,
    #[serde(rename = "Avg PE Ratio")]
    pub avg_pe_ratio: f64,
    #[serde(rename = "Avg Volume (Millions)")]
    pub avg_volume_m: f64,
}

/// 52-week range, ownership and a simple composite risk score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceOverview {
    #[serde(rename = "Avg 52W High")]
    pub avg_52w_high: f64,
    #[serde(rename = "Avg 52W Low")]
    pub avg_52w_low: f64,
    #[serde(rename = "Avg Institutional Ownership (%)")]
    pub avg_institution_ownership: f64,
    #[serde(rename = "Avg Float Shares (Millions)")]
    pub avg_float_shares_m: f64,
    #[serde(rename = "Avg Beta")]
    pub avg_beta: f64,
    #[serde(rename = "High/Low Ratio")]
    pub high_low_ratio: f64,
    #[serde(rename = "Risk Score")]
    pub risk_score: f64,
}

/// Size and valuation totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationOverview {
    #[serde(rename = "Total MarketCap (Bn)")]
    pub total_market_cap_bn: f64,
    #[serde(rename = "Median PE Ratio")]
    pub median_pe_ratio: f64,
    #[serde(rename = "Median EPS")]
    pub median_eps: f64,
    #[serde(rename = "Avg Dividend Yield (%)")]
    pub avg_dividend_yield: f64,
    #[serde(rename = "Avg Volume (Millions)")]
    pub avg_volume_m: f64,
    #[serde(rename = "Avg PE/EPS Ratio")]
    pub avg_pe_to_eps: f64,
}

/// Which overview to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverviewKind {
    Market,
    Performance,
    Valuation,
}

impl OverviewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverviewKind::Market => "market",
            OverviewKind::Performance => "performance",
            OverviewKind::Valuation => "valuation",
        }
    }

    pub fn compute(&self, view: &[&Record]) -> Overview {
        let overview = match self {
            OverviewKind::Market => Overview::Market(market_overview(view)),
            OverviewKind::Performance => Overview::Performance(performance_overview(view)),
            OverviewKind::Valuation => Overview::Valuation(valuation_overview(view)),
        };
        overview.sanitized()
    }
}

impl fmt::Display for OverviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverviewKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "market" => Ok(OverviewKind::Market),
            "performance" => Ok(OverviewKind::Performance),
            "valuation" => Ok(OverviewKind::Valuation),
            other => Err(AnalyticsError::UnknownOverview(other.to_string())),
        }
    }
}

/// Any one of the overview KPI sets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Overview {
    Market(MarketOverview),
    Performance(PerformanceOverview),
    Valuation(ValuationOverview),
}

impl Overview {
    /// Label/value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        match self {
            Overview::Market(o) => vec![
                ("Average Beta", o.average_beta),
                ("Avg Daily Change (%)", o.avg_daily_change),
                ("Avg Dividend Yield (%)", o.avg_dividend_yield),
                ("Avg EPS", o.avg_eps),
                ("Avg PE Ratio", o.avg_pe_ratio),
                ("Avg Volume (Millions)", o.avg_volume_m),
            ],
            Overview::Performance(o) => vec![
                ("Avg 52W High", o.avg_52w_high),
                ("Avg 52W Low", o.avg_52w_low),
                ("Avg Institutional Ownership (%)", o.avg_institution_ownership),
                ("Avg Float Shares (Millions)", o.avg_float_shares_m),
                ("Avg Beta", o.avg_beta),
                ("High/Low Ratio", o.high_low_ratio),
                ("Risk Score", o.risk_score),
            ],
            Overview::Valuation(o) => vec![
                ("Total MarketCap (Bn)", o.total_market_cap_bn),
                ("Median PE Ratio", o.median_pe_ratio),
                ("Median EPS", o.median_eps),
                ("Avg Dividend Yield (%)", o.avg_dividend_yield),
                ("Avg Volume (Millions)", o.avg_volume_m),
                ("Avg PE/EPS Ratio", o.avg_pe_to_eps),
            ],
        }
    }
}

fn avg<F>(view: &[&Record], field: F) -> f64
where
    F: Fn(&Record) -> Option<f64>,
{
    mean(view.iter().map(|&r| field(r))).unwrap_or(f64::NAN)
}

pub fn market_overview(view: &[&Record]) -> MarketOverview {
    MarketOverview {
        average_beta: round2(avg(view, |r| r.beta)),
        avg_daily_change: round2(avg(view, |r| r.return_pct)),
        avg_dividend_yield: round2(avg(view, |r| r.dividend_yield)),
        avg_eps: round2(avg(view, |r| r.eps)),
        avg_pe_ratio: round2(avg(view, |r| r.pe_ratio)),
        avg_volume_m: round2(avg(view, |r| r.volume) / 1_000_000.0),
    }
}

pub fn performance_overview(view: &[&Record]) -> PerformanceOverview {
    let high = avg(view, |r| r.high_52w);
    let low = avg(view, |r| r.low_52w);
    let ownership = avg(view, |r| r.institution_ownership);
    let beta = avg(view, |r| r.beta);
    let high_low_ratio = if low != 0.0 { high / low } else { f64::NAN };

    PerformanceOverview {
        avg_52w_high: round2(high),
        avg_52w_low: round2(low),
        avg_institution_ownership: round2(ownership),
        avg_float_shares_m: round2(avg(view, |r| r.float_shares) / 1_000_000.0),
        avg_beta: round2(beta),
        high_low_ratio: round2(high_low_ratio),
        risk_score: round2(beta * (1.0 - ownership / 100.0) * 100.0),
    }
}

pub fn valuation_overview(view: &[&Record]) -> ValuationOverview {
    let pe_to_eps = view.iter().map(|r| match (r.pe_ratio, r.eps) {
        (Some(pe), Some(eps)) => Some(pe / eps),
        _ => None,
    });

    ValuationOverview {
        total_market_cap_bn: round2(sum(view.iter().map(|r| r.market_cap)) / 1_000_000_000.0),
        median_pe_ratio: round2(median(view.iter().map(|r| r.pe_ratio)).unwrap_or(f64::NAN)),
        median_eps: round2(median(view.iter().map(|r| r.eps)).unwrap_or(f64::NAN)),
        avg_dividend_yield: round2(avg(view, |r| r.dividend_yield)),
        avg_volume_m: round2(avg(view, |r| r.volume) / 1_000_000.0),
        avg_pe_to_eps: round2(mean(pe_to_eps).unwrap_or(f64::NAN)),
    }
}

impl Sanitize for MarketOverview {
    fn sanitize(&mut self) {
        for value in [
            &mut self.average_beta,
            &mut self.avg_daily_change,
            &mut self.avg_dividend_yield,
            &mut self.avg_eps,
            &mut self.avg_pe_ratio,
            &mut self.avg_volume_m,
        ] {
            value.sanitize();
        }
    }
}

impl Sanitize for PerformanceOverview {
    fn sanitize(&mut self) {
        for value in [
            &mut self.avg_52w_high,
            &mut self.avg_52w_low,
            &mut self.avg_institution_ownership,
            &mut self.avg_float_shares_m,
            &mut self.avg_beta,
            &mut self.high_low_ratio,
            &mut self.risk_score,
        ] {
            value.sanitize();
        }
    }
}

impl Sanitize for ValuationOverview {
    fn sanitize(&mut self) {
        for value in [
            &mut self.total_market_cap_bn,
            &mut self.median_pe_ratio,
            &mut self.median_eps,
            &mut self.avg_dividend_yield,
            &mut self.avg_volume_m,
            &mut self.avg_pe_to_eps,
        ] {
            value.sanitize();
        }
    }
}

impl Sanitize for Overview {
    fn sanitize(&mut self) {
        match self {
            Overview::Market(o) => o.sanitize(),
            Overview::Performance(o) => o.sanitize(),
            Overview::Valuation(o) => o.sanitize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(pe: f64, eps: f64, cap: f64, high: Option<f64>, low: Option<f64>) -> Record {
        Record {
            open: Some(10.0),
            close: Some(11.0),
            volume: Some(3_000_000.0),
            beta: Some(1.2),
            pe_ratio: Some(pe),
            eps: Some(eps),
            dividend_yield: Some(2.0),
            market_cap: Some(cap),
            high_52w: high,
            low_52w: low,
            institution_ownership: Some(40.0),
            float_shares: Some(5_000_000.0),
            ..Record::new(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap())
        }
        .derived()
    }

    #[test]
    fn market_overview_averages_every_column() {
        let rows = [record(10.0, 2.0, 1e9, None, None), record(30.0, 4.0, 3e9, None, None)];
        let view: Vec<&Record> = rows.iter().collect();
        let o = market_overview(&view);

        assert_eq!(o.average_beta, 1.2);
        assert_eq!(o.avg_daily_change, 10.0);
        assert_eq!(o.avg_eps, 3.0);
        assert_eq!(o.avg_pe_ratio, 20.0);
        assert_eq!(o.avg_volume_m, 3.0);
    }

    #[test]
    fn valuation_overview_uses_medians_and_totals() {
        let rows = [
            record(10.0, 2.0, 1e9, None, None),
            record(30.0, 4.0, 3e9, None, None),
            record(20.0, 5.0, 2.5e9, None, None),
        ];
        let view: Vec<&Record> = rows.iter().collect();
        let o = valuation_overview(&view);

        assert_eq!(o.total_market_cap_bn, 6.5);
        assert_eq!(o.median_pe_ratio, 20.0);
        assert_eq!(o.median_eps, 4.0);
        // (5 + 7.5 + 4) / 3
        assert_eq!(o.avg_pe_to_eps, 5.5);
    }

    #[test]
    fn performance_overview_derives_ratio_and_risk_score() {
        let rows = [record(10.0, 2.0, 1e9, Some(120.0), Some(80.0))];
        let view: Vec<&Record> = rows.iter().collect();
        let o = performance_overview(&view);

        assert_eq!(o.high_low_ratio, 1.5);
        assert_eq!(o.avg_float_shares_m, 5.0);
        // 1.2 * (1 - 0.4) * 100
        assert_eq!(o.risk_score, 72.0);
    }

    #[test]
    fn missing_optional_columns_sanitize_to_zero() {
        let rows = [record(10.0, 0.0, 1e9, None, None)];
        let view: Vec<&Record> = rows.iter().collect();

        match OverviewKind::Performance.compute(&view) {
            Overview::Performance(o) => {
                assert_eq!(o.avg_52w_high, 0.0);
                assert_eq!(o.high_low_ratio, 0.0);
            }
            other => panic!("unexpected overview {other:?}"),
        }
        match OverviewKind::Valuation.compute(&view) {
            Overview::Valuation(o) => assert_eq!(o.avg_pe_to_eps, 0.0),
            other => panic!("unexpected overview {other:?}"),
        }
    }

    #[test]
    fn overview_kind_parses_lowercase_names() {
        assert_eq!("valuation".parse::<OverviewKind>(), Ok(OverviewKind::Valuation));
        assert_eq!(
            "Valuation".parse::<OverviewKind>(),
            Err(AnalyticsError::UnknownOverview("Valuation".to_string()))
        );
    }
}

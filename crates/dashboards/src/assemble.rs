use crate::views::{
    DatePoint, DeepDivePayload, EarningsPoint, IndustryProfile, NamedValue, ReturnVolumePoint,
    SectorProfile, SectorReturn, SectorRiskPayload, SectorShare, SummaryPayload, ViewId, ViewPayload,
};
use analytics::kpi::{mean_return, return_std};
use analytics::stats::{max, mean};
use analytics::{
    summarize, AggregationPolicy, AggregationSettings, Aggregator, AnalyticsError, BucketRow, Metric,
    MissingPolicy,
};
use core_types::{Period, Record};
use std::collections::BTreeMap;

/// Builds the raw (unsanitized) payload for `view` from a filtered view.
///
/// Fails with `AnalyticsError::EmptyResult` when `rows` is empty.
pub fn assemble(
    view: ViewId,
    rows: &[&Record],
    period: Period,
    settings: AggregationSettings,
) -> Result<ViewPayload, AnalyticsError> {
    let payload = match view {
        ViewId::Summary => ViewPayload::Summary(summary(rows, period, settings)?),
        ViewId::SectorRisk => ViewPayload::SectorRisk(sector_risk(rows)?),
        ViewId::DeepDive => ViewPayload::DeepDive(deep_dive(rows, period, settings)?),
    };
    Ok(payload)
}

fn summary(
    rows: &[&Record],
    period: Period,
    settings: AggregationSettings,
) -> Result<SummaryPayload, AnalyticsError> {
    let kpi = summarize(rows)?;
    let buckets = Aggregator::new(settings, AggregationPolicy::drop_all()).aggregate(rows, period);

    let series = |value: fn(&BucketRow) -> f64| -> Vec<DatePoint> {
        buckets
            .iter()
            .map(|b| DatePoint {
                date: b.label(),
                value: value(b),
            })
            .collect()
    };

    Ok(SummaryPayload {
        kpi,
        area: series(|b| b.return_pct),
        bar: series(|b| b.volume),
        line: series(|b| b.volatility),
        scatter: buckets
            .iter()
            .map(|b| ReturnVolumePoint {
                return_pct: b.return_pct,
                volume: b.volume,
            })
            .collect(),
    })
}

fn sector_risk(rows: &[&Record]) -> Result<SectorRiskPayload, AnalyticsError> {
    let kpi = summarize(rows)?;
    let by_sector = group_by(rows, |r| r.sector.as_deref());

    let heatmap = by_sector
        .iter()
        .map(|(sector, members)| SectorReturn {
            sector: sector.to_string(),
            return_pct: column_mean(members, |r| r.return_pct),
        })
        .collect();

    let bubble = by_sector
        .iter()
        .map(|(sector, members)| SectorProfile {
            sector: sector.to_string(),
            market_cap: column_mean(members, |r| r.market_cap),
            beta: column_mean(members, |r| r.beta),
        })
        .collect();

    let grouped_rows: usize = by_sector.values().map(Vec::len).sum();
    let pie = by_sector
        .iter()
        .map(|(sector, members)| SectorShare {
            sector: sector.to_string(),
            value: members.len() as f64 / grouped_rows as f64 * 100.0,
        })
        .collect();

    let liquidity = column_mean(rows, |r| r.volume) / max(rows.iter().map(|r| r.volume)).unwrap_or(f64::NAN);
    let radar = vec![
        NamedValue::new("Volatility", return_std(rows) / 100.0),
        NamedValue::new("Sharpe Ratio", kpi.sharpe_ratio),
        NamedValue::new("Beta", column_mean(rows, |r| r.beta)),
        NamedValue::new("Return", mean_return(rows) / 100.0),
        NamedValue::new("Liquidity", liquidity),
    ];

    Ok(SectorRiskPayload {
        kpi,
        heatmap,
        radar,
        bubble,
        pie,
    })
}

fn deep_dive(
    rows: &[&Record],
    period: Period,
    settings: AggregationSettings,
) -> Result<DeepDivePayload, AnalyticsError> {
    let kpi = summarize(rows)?;

    let treemap = group_by(rows, |r| r.industry.as_deref())
        .iter()
        .map(|(industry, members)| IndustryProfile {
            industry: industry.to_string(),
            market_cap: column_mean(members, |r| r.market_cap),
            beta: column_mean(members, |r| r.beta),
        })
        .collect();

    // Earnings fields are zero-filled instead of dropping their bucket.
    let policy = AggregationPolicy::drop_all()
        .with(Metric::Eps, MissingPolicy::ZeroFill)
        .with(Metric::DividendYield, MissingPolicy::ZeroFill);
    let waterfall = Aggregator::new(settings, policy)
        .aggregate(rows, period)
        .iter()
        .map(|b| EarningsPoint {
            date: b.label(),
            eps: b.eps,
            dividend_yield: b.dividend_yield,
        })
        .collect();

    let gauge = vec![
        NamedValue::new("Volatility", return_std(rows)),
        NamedValue::new("Sharpe Ratio", kpi.sharpe_ratio),
    ];

    Ok(DeepDivePayload {
        kpi,
        treemap,
        waterfall,
        gauge,
    })
}

/// Groups rows by a text key in ascending key order. Rows without a key are skipped.
fn group_by<'a, K>(rows: &[&'a Record], key: K) -> BTreeMap<&'a str, Vec<&'a Record>>
where
    K: Fn(&'a Record) -> Option<&'a str>,
{
    let mut groups: BTreeMap<&'a str, Vec<&'a Record>> = BTreeMap::new();
    for &record in rows {
        if let Some(k) = key(record) {
            groups.entry(k).or_default().push(record);
        }
    }
    groups
}

fn column_mean<F>(rows: &[&Record], field: F) -> f64
where
    F: Fn(&Record) -> Option<f64>,
{
    mean(rows.iter().map(|&r| field(r))).unwrap_or(f64::NAN)
}

use crate::error::AnalyticsError;
use crate::stats;
use chrono::NaiveDate;
use core_types::{Period, Record, VolatilityAlignment};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Added to every Sharpe denominator so a zero volatility never divides by zero.
pub const SHARPE_EPSILON: f64 = 1e-6;

/// Default number of close-to-close changes in the rolling volatility window.
pub const DEFAULT_VOLATILITY_WINDOW: usize = 10;

/// The metrics averaged inside every bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Return,
    Volume,
    Beta,
    PeRatio,
    Eps,
    DividendYield,
    Close,
    MarketCap,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Return,
        Metric::Volume,
        Metric::Beta,
        Metric::PeRatio,
        Metric::Eps,
        Metric::DividendYield,
        Metric::Close,
        Metric::MarketCap,
    ];

    /// Reads this metric's cell from a record.
    pub fn value(&self, record: &Record) -> Option<f64> {
        match self {
            Metric::Return => record.return_pct,
            Metric::Volume => record.volume,
            Metric::Beta => record.beta,
            Metric::PeRatio => record.pe_ratio,
            Metric::Eps => record.eps,
            Metric::DividendYield => record.dividend_yield,
            Metric::Close => record.close,
            Metric::MarketCap => record.market_cap,
        }
    }
}

/// What to do with a bucket whose mean for a metric is undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Drop the whole bucket from the output.
    #[default]
    Drop,
    /// Keep the bucket and report the metric as `0`.
    ZeroFill,
}

/// Per-metric missing-value policy. Metrics without an override use `Drop`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationPolicy {
    overrides: HashMap<Metric, MissingPolicy>,
}

impl AggregationPolicy {
    /// Every metric drops its bucket when undefined.
    pub fn drop_all() -> Self {
        Self::default()
    }

    pub fn with(mut self, metric: Metric, policy: MissingPolicy) -> Self {
        self.overrides.insert(metric, policy);
        self
    }

    pub fn policy(&self, metric: Metric) -> MissingPolicy {
        self.overrides.get(&metric).copied().unwrap_or_default()
    }
}

/// Tuning for the volatility column of the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationSettings {
    pub volatility_window: usize,
    pub alignment: VolatilityAlignment,
}

impl AggregationSettings {
    pub fn new(volatility_window: usize, alignment: VolatilityAlignment) -> Result<Self, AnalyticsError> {
        if volatility_window < 2 {
            return Err(AnalyticsError::InvalidWindow(volatility_window));
        }
        Ok(Self {
            volatility_window,
            alignment,
        })
    }
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
            alignment: VolatilityAlignment::Positional,
        }
    }
}

/// One time bucket of the aggregate: per-metric means plus volatility and Sharpe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketRow {
    #[serde(rename = "Date", serialize_with = "serialize_label")]
    pub date: NaiveDate,
    #[serde(rename = "Return")]
    pub return_pct: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
    #[serde(rename = "Beta")]
    pub beta: f64,
    #[serde(rename = "PE_Ratio")]
    pub pe_ratio: f64,
    #[serde(rename = "EPS")]
    pub eps: f64,
    #[serde(rename = "DividendYield")]
    pub dividend_yield: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "MarketCap")]
    pub market_cap: f64,
    #[serde(rename = "Volatility")]
    pub volatility: f64,
    #[serde(rename = "Sharpe_Ratio")]
    pub sharpe_ratio: f64,
}

impl BucketRow {
    /// The bucket-end date as `YYYY-MM-DD`.
    pub fn label(&self) -> String {
        format_label(self.date)
    }
}

pub fn format_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn serialize_label<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_label(*date))
}

/// Buckets a filtered view by calendar period and averages each bucket.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    settings: AggregationSettings,
    policy: AggregationPolicy,
}

impl Aggregator {
    pub fn new(settings: AggregationSettings, policy: AggregationPolicy) -> Self {
        Self { settings, policy }
    }

    /// Aggregates `view` into ascending buckets of `period`.
    ///
    /// Buckets whose mean is undefined for a `Drop` metric are removed.
    /// With `Positional` alignment, the i-th surviving bucket receives the
    /// i-th value of the rolling volatility computed over the whole view in
    /// row order, not a volatility of its own rows. Existing dashboards depend
    /// on those numbers, so the alignment is kept as is.
    pub fn aggregate(&self, view: &[&Record], period: Period) -> Vec<BucketRow> {
        let mut buckets: BTreeMap<NaiveDate, Vec<&Record>> = BTreeMap::new();
        for &record in view {
            buckets.entry(period.bucket_end(record.date)).or_default().push(record);
        }

        let row_volatility = match self.settings.alignment {
            VolatilityAlignment::Positional => {
                let closes: Vec<Option<f64>> = view.iter().map(|r| r.close).collect();
                stats::rolling_volatility(&closes, self.settings.volatility_window)
            }
            VolatilityAlignment::PerBucket => Vec::new(),
        };

        let rows: Vec<BucketRow> = buckets
            .into_iter()
            .filter_map(|(end, members)| self.bucket_means(end, &members))
            .enumerate()
            .map(|(i, mut row)| {
                row.volatility = match self.settings.alignment {
                    VolatilityAlignment::Positional => row_volatility.get(i).copied().unwrap_or(0.0),
                    VolatilityAlignment::PerBucket => row.volatility,
                };
                row.sharpe_ratio = row.return_pct / (row.volatility + SHARPE_EPSILON);
                row
            })
            .collect();

        tracing::debug!(period = %period, rows = view.len(), buckets = rows.len(), "Aggregated view.");
        rows
    }

    /// Computes the means of one bucket, or `None` if the bucket must be dropped.
    fn bucket_means(&self, end: NaiveDate, members: &[&Record]) -> Option<BucketRow> {
        let mut means = [0.0; Metric::ALL.len()];
        for (slot, metric) in means.iter_mut().zip(Metric::ALL) {
            *slot = match stats::mean(members.iter().map(|r| metric.value(r))) {
                Some(mean) => mean,
                None => match self.policy.policy(metric) {
                    MissingPolicy::Drop => return None,
                    MissingPolicy::ZeroFill => 0.0,
                },
            };
        }

        // Only read when alignment is per-bucket; positional overwrites it.
        let volatility = if self.settings.alignment == VolatilityAlignment::PerBucket {
            let closes: Vec<Option<f64>> = members.iter().map(|r| r.close).collect();
            stats::rolling_volatility(&closes, self.settings.volatility_window)
                .last()
                .copied()
                .unwrap_or(0.0)
        } else {
            0.0
        };

        let [return_pct, volume, beta, pe_ratio, eps, dividend_yield, close, market_cap] = means;
        Some(BucketRow {
            date: end,
            return_pct,
            volume,
            beta,
            pe_ratio,
            eps,
            dividend_yield,
            close,
            market_cap,
            volatility,
            sharpe_ratio: 0.0,
        })
    }
}

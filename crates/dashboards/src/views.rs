use crate::error::DashboardError;
use analytics::{KpiSummary, Sanitize};
use core_types::Period;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The dashboards the frontend can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewId {
    /// Return / volume / volatility time series.
    Summary,
    /// Sector heatmap, risk radar, sector bubbles and share pie.
    SectorRisk,
    /// Industry treemap, earnings waterfall and risk gauge.
    DeepDive,
}

impl ViewId {
    pub const ALL: [ViewId; 3] = [ViewId::Summary, ViewId::SectorRisk, ViewId::DeepDive];

    /// The bucketing period used when the request does not name one.
    pub fn default_period(&self) -> Period {
        match self {
            ViewId::Summary => Period::Yearly,
            ViewId::SectorRisk | ViewId::DeepDive => Period::Quarterly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::Summary => "summary",
            ViewId::SectorRisk => "sector-risk",
            ViewId::DeepDive => "deep-dive",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewId {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewId::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| DashboardError::UnknownView(s.to_string()))
    }
}

// ==============================================================================
// Chart points
// ==============================================================================

/// One point of a dated series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatePoint {
    #[serde(rename = "Date")]
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnVolumePoint {
    #[serde(rename = "Return")]
    pub return_pct: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorReturn {
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Return")]
    pub return_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorProfile {
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "MarketCap")]
    pub market_cap: f64,
    #[serde(rename = "Beta")]
    pub beta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryProfile {
    #[serde(rename = "Industry")]
    pub industry: String,
    #[serde(rename = "MarketCap")]
    pub market_cap: f64,
    #[serde(rename = "Beta")]
    pub beta: f64,
}

/// Percentage of rows belonging to a sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorShare {
    #[serde(rename = "Sector")]
    pub sector: String,
    pub value: f64,
}

/// A named scalar, used by the radar and the gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

impl NamedValue {
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsPoint {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "EPS")]
    pub eps: f64,
    #[serde(rename = "DividendYield")]
    pub dividend_yield: f64,
}

// ==============================================================================
// Payloads
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryPayload {
    pub kpi: KpiSummary,
    pub area: Vec<DatePoint>,
    pub bar: Vec<DatePoint>,
    pub line: Vec<DatePoint>,
    pub scatter: Vec<ReturnVolumePoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectorRiskPayload {
    pub kpi: KpiSummary,
    pub heatmap: Vec<SectorReturn>,
    pub radar: Vec<NamedValue>,
    pub bubble: Vec<SectorProfile>,
    pub pie: Vec<SectorShare>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeepDivePayload {
    pub kpi: KpiSummary,
    pub treemap: Vec<IndustryProfile>,
    pub waterfall: Vec<EarningsPoint>,
    pub gauge: Vec<NamedValue>,
}

/// A fully assembled, JSON-safe dashboard response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewPayload {
    Summary(SummaryPayload),
    SectorRisk(SectorRiskPayload),
    DeepDive(DeepDivePayload),
}

impl ViewPayload {
    /// The payload returned when filters leave no rows: zero KPIs, no series.
    pub fn empty(view: ViewId) -> Self {
        match view {
            ViewId::Summary => ViewPayload::Summary(SummaryPayload::default()),
            ViewId::SectorRisk => ViewPayload::SectorRisk(SectorRiskPayload::default()),
            ViewId::DeepDive => ViewPayload::DeepDive(DeepDivePayload::default()),
        }
    }

    pub fn kpi(&self) -> &KpiSummary {
        match self {
            ViewPayload::Summary(p) => &p.kpi,
            ViewPayload::SectorRisk(p) => &p.kpi,
            ViewPayload::DeepDive(p) => &p.kpi,
        }
    }
}

// ==============================================================================
// Sanitize
// ==============================================================================

impl Sanitize for DatePoint {
    fn sanitize(&mut self) {
        self.value.sanitize();
    }
}

impl Sanitize for ReturnVolumePoint {
    fn sanitize(&mut self) {
        self.return_pct.sanitize();
        self.volume.sanitize();
    }
}

impl Sanitize for SectorReturn {
    fn sanitize(&mut self) {
        self.return_pct.sanitize();
    }
}

impl Sanitize for SectorProfile {
    fn sanitize(&mut self) {
        self.market_cap.sanitize();
        self.beta.sanitize();
    }
}

impl Sanitize for IndustryProfile {
    fn sanitize(&mut self) {
        self.market_cap.sanitize();
        self.beta.sanitize();
    }
}

impl Sanitize for SectorShare {
    fn sanitize(&mut self) {
        self.value.sanitize();
    }
}

impl Sanitize for NamedValue {
    fn sanitize(&mut self) {
        self.value.sanitize();
    }
}

impl Sanitize for EarningsPoint {
    fn sanitize(&mut self) {
        self.eps.sanitize();
        self.dividend_yield.sanitize();
    }
}

impl Sanitize for ViewPayload {
    fn sanitize(&mut self) {
        match self {
            ViewPayload::Summary(p) => {
                p.kpi.sanitize();
                p.area.sanitize();
                p.bar.sanitize();
                p.line.sanitize();
                p.scatter.sanitize();
            }
            ViewPayload::SectorRisk(p) => {
                p.kpi.sanitize();
                p.heatmap.sanitize();
                p.radar.sanitize();
                p.bubble.sanitize();
                p.pie.sanitize();
            }
            ViewPayload::DeepDive(p) => {
                p.kpi.sanitize();
                p.treemap.sanitize();
                p.waterfall.sanitize();
                p.gauge.sanitize();
            }
        }
    }
}

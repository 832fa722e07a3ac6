use crate::enums::{Period, Risk};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the stock dataset, with its derived `risk` and `return_pct`.
///
/// Numeric cells that were empty or non-numeric in the source are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub beta: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,

    // Optional columns, not every export carries them.
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
    pub institution_ownership: Option<f64>,
    pub float_shares: Option<f64>,

    // Derived once at load time.
    pub risk: Option<Risk>,
    pub return_pct: Option<f64>,
}

impl Record {
    /// Creates a record for `date` with every other cell missing.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            open: None,
            close: None,
            volume: None,
            beta: None,
            pe_ratio: None,
            eps: None,
            dividend_yield: None,
            market_cap: None,
            sector: None,
            industry: None,
            high_52w: None,
            low_52w: None,
            institution_ownership: None,
            float_shares: None,
            risk: None,
            return_pct: None,
        }
    }

    /// Fills in `risk` from `beta` and `return_pct` from `open`/`close`.
    ///
    /// `return_pct = (close - open) / open * 100`. An open of zero produces an
    /// infinite return, which is kept and only scrubbed at the response boundary.
    pub fn derived(mut self) -> Self {
        self.risk = self.beta.and_then(Risk::from_beta);
        self.return_pct = match (self.open, self.close) {
            (Some(open), Some(close)) => {
                let value = (close - open) / open * 100.0;
                (!value.is_nan()).then_some(value)
            }
            _ => None,
        };
        self
    }
}

/// Equality predicates applied to the canonical table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewFilter {
    pub sector: Option<String>,
    pub risk: Option<Risk>,
}

impl ViewFilter {
    pub fn new(sector: Option<String>, risk: Option<Risk>) -> Self {
        Self { sector, risk }
    }

    /// Returns true when the record passes every predicate that is set.
    pub fn matches(&self, record: &Record) -> bool {
        let sector_ok = match &self.sector {
            Some(sector) => record.sector.as_deref() == Some(sector.as_str()),
            None => true,
        };
        let risk_ok = match self.risk {
            Some(risk) => record.risk == Some(risk),
            None => true,
        };
        sector_ok && risk_ok
    }
}

/// A dashboard request as received from the HTTP layer or the CLI.
///
/// A `period` of `None` means "use the view's default period".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(flatten)]
    pub filter: ViewFilter,
    pub period: Option<Period>,
}

impl FilterRequest {
    pub fn new(sector: Option<String>, risk: Option<Risk>, period: Option<Period>) -> Self {
        Self {
            filter: ViewFilter::new(sector, risk),
            period,
        }
    }
}

use crate::error::CoreError;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound (inclusive) of the `Low` risk tier.
pub const LOW_BETA_CEILING: f64 = 0.8;
/// Upper bound (inclusive) of the `Medium` risk tier.
pub const MEDIUM_BETA_CEILING: f64 = 1.2;

/// The risk tier of a record, derived from its `Beta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl Risk {
    /// Classifies a beta into a risk tier.
    ///
    /// The tiers are `(-inf, 0.8]`, `(0.8, 1.2]` and `(1.2, +inf)`.
    /// A missing (NaN) beta has no tier.
    pub fn from_beta(beta: f64) -> Option<Self> {
        if beta.is_nan() {
            None
        } else if beta <= LOW_BETA_CEILING {
            Some(Risk::Low)
        } else if beta <= MEDIUM_BETA_CEILING {
            Some(Risk::Medium)
        } else {
            Some(Risk::High)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Risk::Low => "Low",
            Risk::Medium => "Medium",
            Risk::High => "High",
        }
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Risk {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Risk::Low),
            "Medium" => Ok(Risk::Medium),
            "High" => Ok(Risk::High),
            other => Err(CoreError::InvalidInput("risk".to_string(), other.to_string())),
        }
    }
}

/// The calendar period used to bucket records before averaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "Y")]
    Yearly,
    #[serde(rename = "Q")]
    Quarterly,
    #[serde(rename = "M")]
    Monthly,
}

impl Period {
    /// Parses a period code, falling back to `Yearly` for anything unrecognised.
    pub fn from_code_lossy(code: &str) -> Self {
        code.parse().unwrap_or(Period::Yearly)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Period::Yearly => "Y",
            Period::Quarterly => "Q",
            Period::Monthly => "M",
        }
    }

    /// Returns the last calendar day of the bucket that contains `date`.
    ///
    /// Years end on December 31st, quarters on the last day of March, June,
    /// September and December, and months on their own last day.
    pub fn bucket_end(&self, date: NaiveDate) -> NaiveDate {
        let end_month = match self {
            Period::Yearly => 12,
            Period::Quarterly => date.month().div_ceil(3) * 3,
            Period::Monthly => date.month(),
        };
        last_day_of_month(date.year(), end_month).unwrap_or(date)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Y" => Ok(Period::Yearly),
            "Q" => Ok(Period::Quarterly),
            "M" => Ok(Period::Monthly),
            other => Err(CoreError::InvalidInput("period".to_string(), other.to_string())),
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// How the rolling close-to-close volatility is attached to bucket rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityAlignment {
    /// The i-th value of the per-row rolling series is assigned to the i-th
    /// output bucket. Matches the dashboards already in production.
    #[default]
    Positional,
    /// Each bucket gets the rolling volatility computed over its own rows.
    PerBucket,
}

impl FromStr for VolatilityAlignment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positional" => Ok(VolatilityAlignment::Positional),
            "per_bucket" | "per-bucket" => Ok(VolatilityAlignment::PerBucket),
            other => Err(CoreError::InvalidInput(
                "volatility alignment".to_string(),
                other.to_string(),
            )),
        }
    }
}

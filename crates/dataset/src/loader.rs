use crate::error::DatasetError;
use crate::table::CanonicalTable;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use core_types::Record;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

/// Columns that must be present in the header row.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "Date",
    "Open",
    "Close",
    "Volume",
    "Beta",
    "PE_Ratio",
    "EPS",
    "DividendYield",
    "MarketCap",
    "Sector",
    "Industry",
];

/// Columns that are read when present and left missing otherwise.
pub const OPTIONAL_COLUMNS: [&str; 4] = ["52W_High", "52W_Low", "InstitutionOwnership", "FloatShares"];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Header positions of every column the loader understands.
struct ColumnMap {
    date: usize,
    open: usize,
    close: usize,
    volume: usize,
    beta: usize,
    pe_ratio: usize,
    eps: usize,
    dividend_yield: usize,
    market_cap: usize,
    sector: usize,
    industry: usize,
    high_52w: Option<usize>,
    low_52w: Option<usize>,
    institution_ownership: Option<usize>,
    float_shares: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<Self, DatasetError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| find(name).ok_or_else(|| DatasetError::Schema(name.to_string()));

        let mut required = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = require(name)?;
        }
        let [date, open, close, volume, beta, pe_ratio, eps, dividend_yield, market_cap, sector, industry] = required;
        let [high_52w, low_52w, institution_ownership, float_shares] = OPTIONAL_COLUMNS.map(find);

        Ok(Self {
            date,
            open,
            close,
            volume,
            beta,
            pe_ratio,
            eps,
            dividend_yield,
            market_cap,
            sector,
            industry,
            high_52w,
            low_52w,
            institution_ownership,
            float_shares,
        })
    }

    /// Maps one raw row onto a `Record`. Returns `None` if the date is unusable.
    fn read(&self, row: &StringRecord) -> Option<Record> {
        let date = parse_date(row.get(self.date)?)?;
        let number = |idx: usize| row.get(idx).and_then(parse_number);
        let optional = |idx: Option<usize>| idx.and_then(|i| number(i));
        let text = |idx: usize| {
            row.get(idx)
                .filter(|cell| !cell.is_empty())
                .map(str::to_string)
        };

        let record = Record {
            open: number(self.open),
            close: number(self.close),
            volume: number(self.volume),
            beta: number(self.beta),
            pe_ratio: number(self.pe_ratio),
            eps: number(self.eps),
            dividend_yield: number(self.dividend_yield),
            market_cap: number(self.market_cap),
            sector: text(self.sector),
            industry: text(self.industry),
            high_52w: optional(self.high_52w),
            low_52w: optional(self.low_52w),
            institution_ownership: optional(self.institution_ownership),
            float_shares: optional(self.float_shares),
            ..Record::new(date)
        };
        Some(record.derived())
    }
}

/// Reads the dataset at `path` into a `CanonicalTable`.
///
/// Rows whose `Date` cannot be parsed are skipped. Numeric cells that cannot be
/// parsed become missing values; they never drop the row.
pub fn load_table(path: &Path) -> Result<CanonicalTable, DatasetError> {
    let unavailable = |reason: String| DatasetError::DataUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| unavailable(e.to_string()))?;

    let headers = reader.headers().map_err(|e| unavailable(e.to_string()))?.clone();
    let columns = ColumnMap::resolve(&headers)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.records() {
        let row = row.map_err(|e| unavailable(e.to_string()))?;
        match columns.read(&row) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Dropped rows with an unparseable date.");
    }
    tracing::info!(rows = records.len(), path = %path.display(), "Dataset loaded.");

    Ok(CanonicalTable::new(records))
}

fn parse_number(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    if cell.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(cell).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2023-04-05")]
    #[case("2023/04/05")]
    #[case("04/05/2023")]
    #[case("2023-04-05 16:00:00")]
    #[case("2023-04-05T16:00:00")]
    #[case("2023-04-05T16:00:00+00:00")]
    fn accepts_common_date_layouts(#[case] cell: &str) {
        assert_eq!(parse_date(cell), NaiveDate::from_ymd_opt(2023, 4, 5));
    }

    #[rstest]
    #[case("")]
    #[case("not a date")]
    #[case("2023-13-40")]
    fn rejects_unusable_dates(#[case] cell: &str) {
        assert_eq!(parse_date(cell), None);
    }

    #[test]
    fn numeric_coercion_turns_junk_into_missing() {
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number(""), None);
    }
}

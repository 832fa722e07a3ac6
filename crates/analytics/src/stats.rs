//! Column statistics with "skip missing" semantics.
//!
//! Every helper takes `Option<f64>` cells and ignores `None` and NaN, the way a
//! dataframe reduction would. An undefined result is `None`.

/// Keeps the present, non-NaN cells.
fn present<I>(values: I) -> impl Iterator<Item = f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().filter(|v| !v.is_nan())
}

/// Arithmetic mean of the present values.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = present(values).fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Sum of the present values. An empty column sums to zero.
pub fn sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    present(values).sum()
}

/// Sample standard deviation (`n - 1` denominator). Needs at least two values.
pub fn sample_std<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let values: Vec<f64> = present(values).collect();
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Median of the present values.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut values: Vec<f64> = present(values).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Largest present value.
pub fn max<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    present(values).reduce(f64::max)
}

/// Rounds to two decimals the way Python's `round(x, 2)` does.
///
/// The exact binary value is rounded, so `2.675` (stored just below) becomes
/// `2.67` while `19.765` (stored just above) becomes `19.77`. Exact ties go to
/// the even digit. Non-finite values pass through.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Fractional change between consecutive cells, with gaps padded.
///
/// A missing or NaN cell takes the last present value before it, so the gap
/// itself reports a change of `0` and the next present cell is compared with
/// the value before the gap. Cells before the first present value, and the
/// first cell, have no change.
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last: Option<f64> = None;
    values
        .iter()
        .map(|cell| {
            let current = cell.filter(|v| !v.is_nan()).or(last);
            let change = match (last, current) {
                (Some(prev), Some(curr)) => Some(curr / prev - 1.0).filter(|c| !c.is_nan()),
                _ => None,
            };
            last = current;
            change
        })
        .collect()
}

/// Trailing sample standard deviation over exactly `window` consecutive cells.
///
/// A position is only computed when all `window` cells ending at it are
/// present; the first `window - 1` positions are always `None`.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|end| {
            if window == 0 || end + 1 < window {
                return None;
            }
            let cells = &values[end + 1 - window..=end];
            if cells.iter().any(|c| c.is_none_or(f64::is_nan)) {
                return None;
            }
            sample_std(cells.iter().copied()).filter(|v| !v.is_nan())
        })
        .collect()
}

/// Rolling close-to-close volatility in percent, one value per input row.
///
/// `pct_change -> rolling_std(window) -> * 100`, with every undefined
/// position reported as `0`.
pub fn rolling_volatility(closes: &[Option<f64>], window: usize) -> Vec<f64> {
    rolling_std(&pct_change(closes), window)
        .into_iter()
        .map(|v| v.map_or(0.0, |std| std * 100.0))
        .collect()
}

//! Pure helpers shared by the analyzers: value series in, scalar out.

use super::PERIODS_PER_YEAR;

/// Per-bar simple returns of a value series that starts at `start`.
pub fn period_returns(start: f64, values: &[f64]) -> Vec<f64> {
    let mut prev = start;
    values
        .iter()
        .map(|&v| {
            let r = if prev > 0.0 { v / prev - 1.0 } else { 0.0 };
            prev = v;
            r
        })
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn pstdev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Annualized compound return from log returns over `values.len()` bars.
///
/// `None` for an empty series or non-positive endpoints.
pub fn annualized_return(start: f64, values: &[f64]) -> Option<f64> {
    let last = *values.last()?;
    if start <= 0.0 || last <= 0.0 {
        return None;
    }
    let ravg = (last / start).ln() / values.len() as f64;
    Some((ravg * PERIODS_PER_YEAR).exp() - 1.0)
}

/// Largest peak-to-trough decline as a positive fraction (0.15 = 15%).
pub fn max_drawdown(start: f64, values: &[f64]) -> f64 {
    let mut peak = start;
    let mut max_dd = 0.0_f64;
    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            max_dd = max_dd.max((peak - v) / peak);
        }
    }
    max_dd
}

//! Trailing-window statistics over one ordered series.
//!
//! Windows count observations, not calendar days: a gap in the dates does not
//! shrink the window. Output index `i` covers `values[i+1-window ..= i]`
//! (clipped at the series start) and is `None` while fewer than
//! `min_periods` observations are available.

use super::stats;

/// Trailing mean.
pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    assert!(window >= 1, "window must be >= 1");
    let mut result = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for i in 0..values.len() {
        sum += values[i];
        if i >= window {
            sum -= values[i - window];
        }
        let count = (i + 1).min(window);
        if count >= min_periods.max(1) {
            result.push(Some(sum / count as f64));
        } else {
            result.push(None);
        }
    }

    result
}

/// Trailing coefficient of variation: sample std / mean.
///
/// Undefined when the window mean is zero.
pub fn rolling_cv(values: &[f64], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    assert!(window >= 1, "window must be >= 1");
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            if slice.len() < min_periods.max(2) {
                return None;
            }
            let mean = stats::mean(slice)?;
            if mean == 0.0 {
                return None;
            }
            stats::sample_std(slice).map(|sd| sd / mean)
        })
        .collect()
}

/// Positional percent change (×100) against the value `lag` places earlier.
pub fn lagged_pct_change(values: &[f64], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if lag == 0 || i < lag {
                return None;
            }
            stats::pct_change(values[i], values[i - lag]).map(|c| c * 100.0)
        })
        .collect()
}

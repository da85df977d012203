//! Performance indicators and flags.

use std::ops::Range;

use super::window::rolling_cv;
use crate::domain::ProcessedRow;

/// `yoy_growth` above this marks a row high-growth.
pub const HIGH_GROWTH_THRESHOLD: f64 = 15.0;
/// `yoy_growth` below this marks a row declining.
pub const DECLINE_THRESHOLD: f64 = -5.0;

pub const VOLATILITY_WINDOW: usize = 30;
pub const VOLATILITY_MIN_PERIODS: usize = 10;

/// Percent deviation of a count from its 30-observation average.
pub fn performance_vs_average(registrations: u64, avg_30d: f64) -> Option<f64> {
    if avg_30d == 0.0 || !avg_30d.is_finite() {
        return None;
    }
    Some((registrations as f64 - avg_30d) / avg_30d * 100.0)
}

/// Fill performance, flags and `volatility_30d`.
///
/// Rows must already carry rolling averages and growth rates, and `series`
/// must partition `rows` into (state, category) runs ordered by date.
pub fn apply(rows: &mut [ProcessedRow], series: &[Range<usize>]) {
    for row in rows.iter_mut() {
        row.performance_vs_30d =
            performance_vs_average(row.registrations, row.registrations_30d_avg);
        row.is_above_average = row.performance_vs_30d.is_some_and(|p| p > 0.0);
        row.is_high_growth = row.yoy_growth.is_some_and(|g| g > HIGH_GROWTH_THRESHOLD);
        row.is_declining = row.yoy_growth.is_some_and(|g| g < DECLINE_THRESHOLD);
    }

    for range in series {
        let values: Vec<f64> = rows[range.clone()]
            .iter()
            .map(|r| r.registrations as f64)
            .collect();
        let cv = rolling_cv(&values, VOLATILITY_WINDOW, VOLATILITY_MIN_PERIODS);
        for (row, v) in rows[range.clone()].iter_mut().zip(cv) {
            row.volatility_30d = v;
        }
    }
}

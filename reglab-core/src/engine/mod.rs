//! Metrics engine: raw observations in, processed rows and summary out.
//!
//! `process` runs the stages in a fixed order, each reading what the previous
//! stages wrote:
//!
//! 1. Calendar fields, then a stable sort by (state, category, date)
//! 2. 7- and 30-observation trailing means per series
//! 3. Monthly growth rates, broadcast back onto daily rows
//! 4. Daily totals and market shares
//! 5. Performance vs. 30-day average, flags, 30-observation volatility

pub mod growth;
pub mod market_share;
pub mod performance;
pub mod stats;
pub mod summary;
pub mod window;

pub use growth::{GrowthRates, MonthlyTotal};
pub use summary::{summarize, summarize_records, GrowthMetricsSummary, SummaryRecord};

use std::ops::Range;

use tracing::debug;

use crate::domain::{Observation, ProcessedRow, ProcessedTable};

pub const SHORT_WINDOW: usize = 7;
pub const LONG_WINDOW: usize = 30;

/// Derive the processed table from raw observations.
///
/// Output is sorted by (state, category, date); rows that tie keep their
/// input order. The input is not modified, so repeated calls agree.
pub fn process(observations: &[Observation]) -> ProcessedTable {
    let span = tracing::debug_span!("process", rows = observations.len());
    let _enter = span.enter();

    let mut rows: Vec<ProcessedRow> = observations
        .iter()
        .map(ProcessedRow::from_observation)
        .collect();
    rows.sort_by(|a, b| {
        (&a.state, &a.category, a.date).cmp(&(&b.state, &b.category, b.date))
    });

    let series = series_ranges(&rows);
    debug!(series = series.len(), "sorted into series");

    add_rolling_averages(&mut rows, &series);
    growth::apply(&mut rows);
    market_share::apply(&mut rows);
    performance::apply(&mut rows, &series);

    debug!("processing complete");
    rows
}

/// Contiguous index ranges of each (state, category) run in sorted rows.
pub fn series_ranges(rows: &[ProcessedRow]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for i in 1..=rows.len() {
        if i == rows.len() || !rows[i].same_series(&rows[start]) {
            if start < i {
                ranges.push(start..i);
            }
            start = i;
        }
    }
    ranges
}

fn add_rolling_averages(rows: &mut [ProcessedRow], series: &[Range<usize>]) {
    for range in series {
        let values: Vec<f64> = rows[range.clone()]
            .iter()
            .map(|r| r.registrations as f64)
            .collect();
        let short = window::rolling_mean(&values, SHORT_WINDOW, 1);
        let long = window::rolling_mean(&values, LONG_WINDOW, 1);

        for (i, row) in rows[range.clone()].iter_mut().enumerate() {
            // min_periods = 1, so every position is defined
            let own = values[i];
            row.registrations_7d_avg = short[i].unwrap_or(own);
            row.registrations_30d_avg = long[i].unwrap_or(own);
        }
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use chrono::{Duration, NaiveDate};

    fn obs(day_offset: i64, state: &str, category: &str, regs: u64) -> Observation {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Observation::new(base + Duration::days(day_offset), state, category, regs)
    }

    #[test]
    fn empty_input() {
        assert!(process(&[]).is_empty());
        assert!(series_ranges(&[]).is_empty());
    }

    #[test]
    fn output_sorted_by_state_category_date() {
        let input = vec![
            obs(1, "Punjab", "2W", 5),
            obs(0, "Delhi", "4W", 6),
            obs(1, "Delhi", "2W", 7),
            obs(0, "Delhi", "2W", 8),
        ];
        let rows = process(&input);
        let keys: Vec<(String, Category, i64)> = rows
            .iter()
            .map(|r| {
                (
                    r.state.to_string(),
                    r.category.clone(),
                    (r.date - NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).num_days(),
                )
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Delhi".into(), Category::TwoWheeler, 0),
                ("Delhi".into(), Category::TwoWheeler, 1),
                ("Delhi".into(), Category::FourWheeler, 0),
                ("Punjab".into(), Category::TwoWheeler, 1),
            ]
        );
        assert_eq!(series_ranges(&rows), vec![0..2, 2..3, 3..4]);
    }

    #[test]
    fn duplicate_keys_keep_input_order() {
        let input = vec![
            obs(0, "Delhi", "2W", 1).with_manufacturer("Honda"),
            obs(0, "Delhi", "2W", 2).with_manufacturer("TVS"),
        ];
        let rows = process(&input);
        assert_eq!(rows[0].manufacturer.as_deref(), Some("Honda"));
        assert_eq!(rows[1].manufacturer.as_deref(), Some("TVS"));
    }

    #[test]
    fn rolling_averages_per_series() {
        let mut input: Vec<Observation> = (0..10).map(|d| obs(d, "Delhi", "2W", 10 * (d as u64 + 1))).collect();
        input.push(obs(0, "Goa", "2W", 999));
        let rows = process(&input);

        assert_eq!(rows[0].registrations_7d_avg, 10.0);
        assert_eq!(rows[0].registrations_30d_avg, 10.0);
        // day 9: last 7 = 40..=100
        assert_approx(rows[9].registrations_7d_avg, 70.0, DEFAULT_EPSILON);
        assert_approx(rows[9].registrations_30d_avg, 55.0, DEFAULT_EPSILON);
        // new series restarts its window
        assert_eq!(rows[10].registrations_7d_avg, 999.0);
    }

    #[test]
    fn unlisted_spelling_of_listed_label_shares_series() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let input = vec![
            Observation::new(base, "Delhi", Category::TwoWheeler, 10),
            Observation::new(base + Duration::days(1), "Delhi", Category::Unlisted("2W".into()), 20),
        ];
        let rows = process(&input);
        assert_eq!(series_ranges(&rows), vec![0..2]);
        assert_eq!(rows[1].registrations_7d_avg, 15.0);
    }

    #[test]
    fn process_is_idempotent() {
        let input: Vec<Observation> = (0..60)
            .flat_map(|d| {
                [
                    obs(d, "Delhi", "2W", 100 + d as u64),
                    obs(d, "Delhi", "4W", 50),
                ]
            })
            .collect();
        assert_eq!(process(&input), process(&input));
    }
}

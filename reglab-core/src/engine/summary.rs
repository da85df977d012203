//! Aggregate growth metrics over a processed table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::stats::{self, mean_defined, pct_change};
use crate::domain::{Category, MonthKey, ProcessedRow, State};

/// Label reported when there is no category to rank.
pub const NO_CATEGORY: &str = "N/A";

/// The columns of a processed row the summary reads.
///
/// Lets callers summarize tables that were processed elsewhere and only
/// carry a subset of the processed columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub year: i32,
    pub month: MonthKey,
    pub state: State,
    pub category: Category,
    pub registrations: u64,
    pub yoy_growth: Option<f64>,
    pub volatility_30d: Option<f64>,
}

impl From<&ProcessedRow> for SummaryRecord {
    fn from(row: &ProcessedRow) -> Self {
        Self {
            year: row.year,
            month: row.month,
            state: row.state.clone(),
            category: row.category.clone(),
            registrations: row.registrations,
            yoy_growth: row.yoy_growth,
            volatility_30d: row.volatility_30d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetricsSummary {
    /// Percent change of the latest year's total against the year before.
    pub total_yoy_growth: f64,
    /// Mean row-level YoY growth per category label.
    pub category_yoy_growth: BTreeMap<String, f64>,
    /// Mean row-level YoY growth per state.
    pub state_yoy_growth: BTreeMap<String, f64>,
    /// Mean month-over-month percent change of the overall monthly total.
    pub monthly_growth: f64,
    /// Category share of all registrations, in percent.
    pub market_concentration: BTreeMap<String, f64>,
    /// Sample std / |mean| of the monthly changes.
    pub growth_consistency: f64,
    pub top_growing_category: String,
    pub top_growth_rate: f64,
    pub average_volatility: f64,
}

impl Default for GrowthMetricsSummary {
    fn default() -> Self {
        Self {
            total_yoy_growth: 0.0,
            category_yoy_growth: BTreeMap::new(),
            state_yoy_growth: BTreeMap::new(),
            monthly_growth: 0.0,
            market_concentration: BTreeMap::new(),
            growth_consistency: 0.0,
            top_growing_category: NO_CATEGORY.to_string(),
            top_growth_rate: 0.0,
            average_volatility: 0.0,
        }
    }
}

/// Summarize a processed table.
pub fn summarize(rows: &[ProcessedRow]) -> GrowthMetricsSummary {
    let records: Vec<SummaryRecord> = rows.iter().map(SummaryRecord::from).collect();
    summarize_records(&records)
}

pub fn summarize_records(records: &[SummaryRecord]) -> GrowthMetricsSummary {
    let category_yoy_growth = mean_yoy_by(records, |r| r.category.as_str().to_string());
    let (top_growing_category, top_growth_rate) = top_category(&category_yoy_growth);
    let monthly_changes = monthly_changes(records);

    GrowthMetricsSummary {
        total_yoy_growth: total_yoy_growth(records),
        state_yoy_growth: mean_yoy_by(records, |r| r.state.as_str().to_string()),
        monthly_growth: monthly_growth(&monthly_changes),
        market_concentration: market_concentration(records),
        growth_consistency: growth_consistency(&monthly_changes),
        top_growing_category,
        top_growth_rate,
        average_volatility: mean_defined(records.iter().map(|r| r.volatility_30d)).unwrap_or(0.0),
        category_yoy_growth,
    }
}

/// Latest year against the year before. 0 when the prior year is absent or sums to 0.
fn total_yoy_growth(records: &[SummaryRecord]) -> f64 {
    let Some(current_year) = records.iter().map(|r| r.year).max() else {
        return 0.0;
    };
    let sum_for = |year: i32| -> u64 {
        records
            .iter()
            .filter(|r| r.year == year)
            .map(|r| r.registrations)
            .sum()
    };
    let current = sum_for(current_year) as f64;
    let previous = sum_for(current_year - 1) as f64;
    pct_change(current, previous).map_or(0.0, |c| c * 100.0)
}

fn mean_yoy_by<F>(records: &[SummaryRecord], key: F) -> BTreeMap<String, f64>
where
    F: Fn(&SummaryRecord) -> String,
{
    let mut groups: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for r in records {
        groups.entry(key(r)).or_default().push(r.yoy_growth);
    }
    groups
        .into_iter()
        .map(|(k, values)| (k, mean_defined(values).unwrap_or(0.0)))
        .collect()
}

/// Defined fractional changes of the overall monthly total, ordered by month.
fn monthly_changes(records: &[SummaryRecord]) -> Vec<f64> {
    let mut totals: BTreeMap<MonthKey, u64> = BTreeMap::new();
    for r in records {
        *totals.entry(r.month).or_insert(0) += r.registrations;
    }
    let values: Vec<f64> = totals.values().map(|v| *v as f64).collect();
    values
        .windows(2)
        .filter_map(|w| pct_change(w[1], w[0]))
        .collect()
}

fn monthly_growth(changes: &[f64]) -> f64 {
    stats::mean(changes).map_or(0.0, |m| m * 100.0)
}

fn growth_consistency(changes: &[f64]) -> f64 {
    let (Some(mean), Some(sd)) = (stats::mean(changes), stats::sample_std(changes)) else {
        return 0.0;
    };
    if mean == 0.0 {
        return 0.0;
    }
    sd / mean.abs()
}

fn market_concentration(records: &[SummaryRecord]) -> BTreeMap<String, f64> {
    let mut by_category: BTreeMap<String, u64> = BTreeMap::new();
    for r in records {
        *by_category.entry(r.category.as_str().to_string()).or_insert(0) += r.registrations;
    }
    let total: u64 = by_category.values().sum();
    by_category
        .into_iter()
        .map(|(k, v)| {
            let share = if total == 0 {
                0.0
            } else {
                v as f64 / total as f64 * 100.0
            };
            (k, share)
        })
        .collect()
}

/// Highest mean YoY; ties go to the first label in order.
fn top_category(category_yoy: &BTreeMap<String, f64>) -> (String, f64) {
    let mut best: Option<(&String, f64)> = None;
    for (label, rate) in category_yoy {
        match best {
            Some((_, top)) if *rate <= top => {}
            _ => best = Some((label, *rate)),
        }
    }
    best.map_or_else(
        || (NO_CATEGORY.to_string(), 0.0),
        |(label, rate)| (label.clone(), rate),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{assert_approx, DEFAULT_EPSILON};

    fn record(year: i32, month: u32, category: &str, regs: u64, yoy: Option<f64>) -> SummaryRecord {
        SummaryRecord {
            year,
            month: MonthKey::new(year, month),
            state: State::from("Delhi"),
            category: Category::from(category),
            registrations: regs,
            yoy_growth: yoy,
            volatility_30d: None,
        }
    }

    #[test]
    fn empty_table_summary() {
        let s = summarize_records(&[]);
        assert_eq!(s, GrowthMetricsSummary::default());
        assert_eq!(s.top_growing_category, "N/A");
    }

    #[test]
    fn total_yoy_from_year_sums() {
        let records = vec![record(2023, 6, "2W", 1000, None), record(2024, 6, "2W", 1200, None)];
        assert_approx(summarize_records(&records).total_yoy_growth, 20.0, 1e-9);
    }

    #[test]
    fn total_yoy_without_prior_year() {
        let records = vec![record(2024, 1, "2W", 10, None), record(2024, 2, "2W", 20, None)];
        assert_eq!(summarize_records(&records).total_yoy_growth, 0.0);
        let zero_prior = vec![record(2023, 1, "2W", 0, None), record(2024, 1, "2W", 20, None)];
        assert_eq!(summarize_records(&zero_prior).total_yoy_growth, 0.0);
    }

    #[test]
    fn category_means_skip_missing() {
        let records = vec![
            record(2024, 1, "2W", 1, Some(10.0)),
            record(2024, 1, "2W", 1, None),
            record(2024, 1, "2W", 1, Some(20.0)),
            record(2024, 1, "4W", 1, None),
        ];
        let s = summarize_records(&records);
        assert_approx(s.category_yoy_growth["2W"], 15.0, DEFAULT_EPSILON);
        assert_eq!(s.category_yoy_growth["4W"], 0.0);
        assert_eq!(s.top_growing_category, "2W");
        assert_approx(s.top_growth_rate, 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn top_category_tie_goes_to_first_label() {
        let records = vec![
            record(2024, 1, "4W", 1, Some(5.0)),
            record(2024, 1, "3W", 1, Some(5.0)),
        ];
        assert_eq!(summarize_records(&records).top_growing_category, "3W");
    }

    #[test]
    fn monthly_growth_and_consistency() {
        // monthly totals 100 -> 110 -> 121: two +10% changes
        let records = vec![
            record(2024, 1, "2W", 100, None),
            record(2024, 2, "2W", 110, None),
            record(2024, 3, "2W", 121, None),
        ];
        let s = summarize_records(&records);
        assert_approx(s.monthly_growth, 10.0, 1e-9);
        assert_approx(s.growth_consistency, 0.0, 1e-9);
    }

    #[test]
    fn consistency_uses_absolute_mean_and_skips_zero_prior() {
        // totals 100 -> 120 -> 108 -> 0 -> 50; the change out of 0 is undefined
        let records = vec![
            record(2024, 1, "2W", 100, None),
            record(2024, 2, "2W", 120, None),
            record(2024, 3, "2W", 108, None),
            record(2024, 4, "2W", 0, None),
            record(2024, 5, "2W", 50, None),
        ];
        let s = summarize_records(&records);
        // changes [0.2, -0.1, -1.0]: mean -0.3, sample variance 0.39
        assert_approx(s.monthly_growth, -30.0, 1e-9);
        assert_approx(s.growth_consistency, 0.39f64.sqrt() / 0.3, 1e-9);
        assert!(s.growth_consistency > 0.0);
    }

    #[test]
    fn cancelling_changes_have_zero_consistency() {
        // +50% then -50%: mean change is exactly 0
        let records = vec![
            record(2024, 1, "2W", 100, None),
            record(2024, 2, "2W", 150, None),
            record(2024, 3, "2W", 75, None),
        ];
        let s = summarize_records(&records);
        assert_eq!(s.monthly_growth, 0.0);
        assert_eq!(s.growth_consistency, 0.0);
    }

    #[test]
    fn single_month_has_no_monthly_growth() {
        let s = summarize_records(&[record(2024, 1, "2W", 100, None)]);
        assert_eq!(s.monthly_growth, 0.0);
        assert_eq!(s.growth_consistency, 0.0);
    }

    #[test]
    fn concentration_sums_to_hundred() {
        let records = vec![
            record(2024, 1, "2W", 700, None),
            record(2024, 1, "4W", 200, None),
            record(2024, 1, "3W", 100, None),
        ];
        let s = summarize_records(&records);
        let total: f64 = s.market_concentration.values().sum();
        assert_approx(total, 100.0, 1e-9);
        assert_approx(s.market_concentration["2W"], 70.0, 1e-9);
    }

    #[test]
    fn average_volatility_defaults_to_zero() {
        let mut records = vec![record(2024, 1, "2W", 1, None)];
        assert_eq!(summarize_records(&records).average_volatility, 0.0);
        records[0].volatility_30d = Some(0.25);
        records.push(record(2024, 1, "2W", 1, None));
        assert_eq!(summarize_records(&records).average_volatility, 0.25);
    }
}

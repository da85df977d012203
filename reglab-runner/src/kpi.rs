//! Headline KPIs and the manufacturer filter.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use reglab_core::domain::{MonthKey, ProcessedRow};

use crate::growth_math::cagr;

/// Keep rows whose manufacturer is in `manufacturers`.
///
/// An empty set means no filter. Rows without a manufacturer never match a
/// non-empty set.
pub fn filter_by_manufacturer<'a>(
    rows: &'a [ProcessedRow],
    manufacturers: &[String],
) -> Cow<'a, [ProcessedRow]> {
    if manufacturers.is_empty() {
        return Cow::Borrowed(rows);
    }
    Cow::Owned(
        rows.iter()
            .filter(|r| {
                r.manufacturer
                    .as_deref()
                    .is_some_and(|m| manufacturers.iter().any(|wanted| wanted == m))
            })
            .cloned()
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_registrations: u64,
    /// Mean of the per-month totals.
    pub avg_monthly_registrations: f64,
    pub leading_category: Option<String>,
    /// Leading category's share of all registrations, in percent.
    pub leading_category_share: f64,
    /// Highest-volume state; only reported when more than one state is present.
    pub top_state: Option<String>,
    pub records: usize,
    /// Compound annual growth of each category's yearly total from its first
    /// to its last year, in percent. Categories seen in one year are absent.
    #[serde(default)]
    pub category_cagr: BTreeMap<String, f64>,
}

impl Kpis {
    pub fn compute(rows: &[ProcessedRow]) -> Self {
        let total: u64 = rows.iter().map(|r| r.registrations).sum();

        let mut monthly: BTreeMap<MonthKey, u64> = BTreeMap::new();
        let mut by_category: BTreeMap<&str, u64> = BTreeMap::new();
        let mut by_state: BTreeMap<&str, u64> = BTreeMap::new();
        let mut yearly: BTreeMap<&str, BTreeMap<i32, u64>> = BTreeMap::new();
        for r in rows {
            *monthly.entry(r.month).or_insert(0) += r.registrations;
            *by_category.entry(r.category.as_str()).or_insert(0) += r.registrations;
            *by_state.entry(r.state.as_str()).or_insert(0) += r.registrations;
            *yearly
                .entry(r.category.as_str())
                .or_default()
                .entry(r.year)
                .or_insert(0) += r.registrations;
        }

        let avg_monthly_registrations = if monthly.is_empty() {
            0.0
        } else {
            monthly.values().sum::<u64>() as f64 / monthly.len() as f64
        };

        let leading = largest(&by_category);
        let leading_category_share = match leading {
            Some((_, volume)) if total > 0 => volume as f64 / total as f64 * 100.0,
            _ => 0.0,
        };
        let top_state = if by_state.len() > 1 {
            largest(&by_state).map(|(s, _)| s.to_string())
        } else {
            None
        };

        Self {
            total_registrations: total,
            avg_monthly_registrations,
            leading_category: leading.map(|(c, _)| c.to_string()),
            leading_category_share,
            top_state,
            records: rows.len(),
            category_cagr: category_cagr(&yearly),
        }
    }
}

fn category_cagr(yearly: &BTreeMap<&str, BTreeMap<i32, u64>>) -> BTreeMap<String, f64> {
    yearly
        .iter()
        .filter_map(|(category, years)| {
            let (first_year, first) = years.first_key_value()?;
            let (last_year, last) = years.last_key_value()?;
            let periods = u32::try_from(last_year - first_year).ok().filter(|p| *p > 0)?;
            Some((category.to_string(), cagr(*last as f64, *first as f64, periods)))
        })
        .collect()
}

/// Key with the largest value; ties go to the first key.
fn largest<'a>(totals: &BTreeMap<&'a str, u64>) -> Option<(&'a str, u64)> {
    let mut best: Option<(&'a str, u64)> = None;
    for (key, value) in totals {
        match best {
            Some((_, top)) if *value <= top => {}
            _ => best = Some((*key, *value)),
        }
    }
    best
}

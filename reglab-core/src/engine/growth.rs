//! Period-over-period growth on monthly aggregates.
//!
//! Daily rows are summed per (state, category, month), the monthly series is
//! ordered by month, and percent changes are taken positionally at lags 12, 3
//! and 1. A missing month in the series is not filled: the lag counts rows of
//! the aggregate, so `qoq_growth` is a three-row lag rather than a
//! quarter-aligned comparison. Rates are then broadcast back onto every daily
//! row of the month.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::window::lagged_pct_change;
use crate::domain::{MonthKey, ProcessedRow, SeriesKey};

pub const YOY_LAG: usize = 12;
pub const QOQ_LAG: usize = 3;
pub const MOM_LAG: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: MonthKey,
    pub registrations: u64,
}

/// Growth rates (percent) for one (series, month).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GrowthRates {
    pub yoy: Option<f64>,
    pub qoq: Option<f64>,
    pub mom: Option<f64>,
}

/// Monthly sums per series, each series ordered by month.
pub fn monthly_totals(rows: &[ProcessedRow]) -> BTreeMap<SeriesKey, Vec<MonthlyTotal>> {
    let mut sums: BTreeMap<SeriesKey, BTreeMap<MonthKey, u64>> = BTreeMap::new();
    for row in rows {
        *sums
            .entry(row.series_key())
            .or_default()
            .entry(row.month)
            .or_insert(0) += row.registrations;
    }

    sums.into_iter()
        .map(|(key, months)| {
            let totals = months
                .into_iter()
                .map(|(month, registrations)| MonthlyTotal {
                    month,
                    registrations,
                })
                .collect();
            (key, totals)
        })
        .collect()
}

/// Growth rates keyed by (series, month).
pub fn growth_lookup(
    totals: &BTreeMap<SeriesKey, Vec<MonthlyTotal>>,
) -> HashMap<(SeriesKey, MonthKey), GrowthRates> {
    let mut lookup = HashMap::new();
    for (key, months) in totals {
        let values: Vec<f64> = months.iter().map(|m| m.registrations as f64).collect();
        let yoy = lagged_pct_change(&values, YOY_LAG);
        let qoq = lagged_pct_change(&values, QOQ_LAG);
        let mom = lagged_pct_change(&values, MOM_LAG);

        for (i, m) in months.iter().enumerate() {
            lookup.insert(
                (key.clone(), m.month),
                GrowthRates {
                    yoy: yoy[i],
                    qoq: qoq[i],
                    mom: mom[i],
                },
            );
        }
    }
    lookup
}

/// Fill `yoy_growth`, `qoq_growth` and `mom_growth` on every row.
pub fn apply(rows: &mut [ProcessedRow]) {
    let totals = monthly_totals(rows);
    let lookup = growth_lookup(&totals);

    for row in rows.iter_mut() {
        // Every row contributed to the aggregate, but a miss stays explicit.
        let rates = lookup
            .get(&(row.series_key(), row.month))
            .copied()
            .unwrap_or_default();
        row.yoy_growth = rates.yoy;
        row.qoq_growth = rates.qoq;
        row.mom_growth = rates.mom;
    }
}

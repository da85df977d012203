//! Per-date totals and market shares.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{ProcessedRow, State};

/// Fill `total_daily_registrations`, `category_market_share` and
/// `state_market_share`.
///
/// `category_market_share` is the row's own count over the date's total, so
/// several rows sharing a (date, state, category) each get their own share.
/// A zero daily total leaves both shares missing.
pub fn apply(rows: &mut [ProcessedRow]) {
    let mut daily: HashMap<NaiveDate, u64> = HashMap::new();
    let mut by_state: HashMap<(NaiveDate, State), u64> = HashMap::new();

    for row in rows.iter() {
        *daily.entry(row.date).or_insert(0) += row.registrations;
        *by_state
            .entry((row.date, row.state.clone()))
            .or_insert(0) += row.registrations;
    }

    for row in rows.iter_mut() {
        let total = daily.get(&row.date).copied().unwrap_or(0);
        row.total_daily_registrations = total;
        if total == 0 {
            row.category_market_share = None;
            row.state_market_share = None;
            continue;
        }
        let state_total = by_state
            .get(&(row.date, row.state.clone()))
            .copied()
            .unwrap_or(0);
        row.category_market_share = Some(row.registrations as f64 / total as f64 * 100.0);
        row.state_market_share = Some(state_total as f64 / total as f64 * 100.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use crate::engine::{assert_approx, DEFAULT_EPSILON};

    fn row(day: u32, state: &str, category: &str, regs: u64) -> ProcessedRow {
        ProcessedRow::from_observation(&Observation::new(
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            state,
            category,
            regs,
        ))
    }

    #[test]
    fn shares_of_daily_total() {
        let mut rows = vec![
            row(1, "Delhi", "2W", 300),
            row(1, "Delhi", "4W", 100),
            row(1, "Punjab", "2W", 600),
            row(2, "Delhi", "2W", 50),
        ];
        apply(&mut rows);

        assert_eq!(rows[0].total_daily_registrations, 1000);
        assert_approx(rows[0].category_market_share.unwrap(), 30.0, DEFAULT_EPSILON);
        assert_approx(rows[0].state_market_share.unwrap(), 40.0, DEFAULT_EPSILON);
        assert_approx(rows[2].state_market_share.unwrap(), 60.0, DEFAULT_EPSILON);
        assert_eq!(rows[3].total_daily_registrations, 50);
        assert_approx(rows[3].category_market_share.unwrap(), 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_day_has_missing_shares() {
        let mut rows = vec![row(1, "Delhi", "2W", 0), row(1, "Goa", "3W", 0)];
        apply(&mut rows);
        assert!(rows.iter().all(|r| r.total_daily_registrations == 0));
        assert!(rows.iter().all(|r| r.category_market_share.is_none()));
        assert!(rows.iter().all(|r| r.state_market_share.is_none()));
    }
}

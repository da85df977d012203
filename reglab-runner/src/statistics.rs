//! Dataset summary statistics.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use reglab_core::domain::ProcessedRow;
use reglab_core::engine::stats;

use crate::growth_math::{detect_outliers, OutlierMethod};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Distribution of per-row registration counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` for a single row.
    pub std: Option<f64>,
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_records: usize,
    pub date_range: Option<DateRange>,
    pub total_registrations: u64,
    /// Mean registrations per row.
    pub daily_average: Option<f64>,
    pub states_covered: usize,
    pub categories_covered: usize,
    pub registrations_distribution: Option<Distribution>,
    /// Rows outside the 1.5·IQR fences of the count distribution.
    pub outlier_rows: usize,
}

impl SummaryStatistics {
    pub fn compute(rows: &[ProcessedRow]) -> Self {
        let counts: Vec<f64> = rows.iter().map(|r| r.registrations as f64).collect();

        let date_range = match (rows.iter().map(|r| r.date).min(), rows.iter().map(|r| r.date).max()) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        };

        let distribution = match (
            stats::mean(&counts),
            stats::median(&counts),
            rows.iter().map(|r| r.registrations).min(),
            rows.iter().map(|r| r.registrations).max(),
        ) {
            (Some(mean), Some(median), Some(min), Some(max)) => Some(Distribution {
                mean,
                median,
                std: stats::sample_std(&counts),
                min,
                max,
            }),
            _ => None,
        };

        let states: BTreeSet<&str> = rows.iter().map(|r| r.state.as_str()).collect();
        let categories: BTreeSet<&str> = rows.iter().map(|r| r.category.as_str()).collect();

        Self {
            total_records: rows.len(),
            date_range,
            total_registrations: rows.iter().map(|r| r.registrations).sum(),
            daily_average: stats::mean(&counts),
            states_covered: states.len(),
            categories_covered: categories.len(),
            registrations_distribution: distribution,
            outlier_rows: detect_outliers(&counts, OutlierMethod::Iqr)
                .into_iter()
                .filter(|o| *o)
                .count(),
        }
    }
}

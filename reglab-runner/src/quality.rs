//! Data quality report over a table frame.
//!
//! Works on the Polars frame rather than typed rows so that it can describe
//! tables the typed readers would reject (nulls, negative counts).

use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Columns identifying one observation when looking for duplicates.
const IDENTITY_COLUMNS: &[&str] = &["date", "state", "category", "registrations", "manufacturer"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_rows: usize,
    /// Null count per column.
    pub missing_values: BTreeMap<String, usize>,
    /// Rows repeating an earlier row on the identity columns.
    pub duplicate_rows: usize,
    /// Negative values per registration-count column.
    pub negative_values: BTreeMap<String, usize>,
    /// Share of non-null cells, in percent. 100 for an empty frame.
    pub completeness_percentage: f64,
}

impl QualityReport {
    pub fn assess(df: &DataFrame) -> PolarsResult<Self> {
        let mut missing_values = BTreeMap::new();
        let mut negative_values = BTreeMap::new();
        let mut missing_cells = 0usize;

        for col in df.get_columns() {
            let name = col.name().to_string();
            let nulls = col.null_count();
            missing_cells += nulls;
            missing_values.insert(name.clone(), nulls);

            if name.contains("registration") && col.dtype().is_integer() {
                let as_i64 = col.cast(&DataType::Int64)?;
                let negatives = as_i64.i64()?.into_iter().flatten().filter(|v| *v < 0).count();
                negative_values.insert(name, negatives);
            }
        }

        let total_cells = df.height() * df.width();
        let completeness_percentage = if total_cells == 0 {
            100.0
        } else {
            (total_cells - missing_cells) as f64 / total_cells as f64 * 100.0
        };

        Ok(Self {
            total_rows: df.height(),
            missing_values,
            duplicate_rows: count_duplicates(df)?,
            negative_values,
            completeness_percentage,
        })
    }

    pub fn total_missing(&self) -> usize {
        self.missing_values.values().sum()
    }
}

/// Rows whose identity-column values already appeared on an earlier row.
fn count_duplicates(df: &DataFrame) -> PolarsResult<usize> {
    let mut keys: Vec<Vec<Option<String>>> = vec![Vec::new(); df.height()];
    for name in IDENTITY_COLUMNS {
        let Ok(col) = df.column(name) else {
            continue;
        };
        let rendered = col.cast(&DataType::String)?;
        let ca = rendered.str()?;
        for (i, key) in keys.iter_mut().enumerate() {
            key.push(ca.get(i).map(str::to_string));
        }
    }

    let mut seen = HashSet::with_capacity(keys.len());
    Ok(keys.into_iter().filter(|k| !seen.insert(k.clone())).count())
}

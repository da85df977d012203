//! Column contract for raw and processed tables.
//!
//! Defines the column names, their logical types, and the subsets each
//! entry point requires. This module does not depend on Polars: the frame
//! boundary and the CSV reader both validate against it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaType {
    Date,
    Text,
    Integer,
    Float,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: &'static str,
    pub dtype: SchemaType,
    pub nullable: bool,
}

const fn field(name: &'static str, dtype: SchemaType, nullable: bool) -> SchemaField {
    SchemaField {
        name,
        dtype,
        nullable,
    }
}

/// Raw observation table, in CSV column order.
pub const RAW_SCHEMA: &[SchemaField] = &[
    field("date", SchemaType::Date, false),
    field("state", SchemaType::Text, false),
    field("category", SchemaType::Text, false),
    field("registrations", SchemaType::Integer, false),
    field("manufacturer", SchemaType::Text, true),
];

/// Processed table, in CSV column order.
///
/// Period columns (`month`, `quarter`, `week`) are rendered as text.
pub const PROCESSED_SCHEMA: &[SchemaField] = &[
    field("date", SchemaType::Date, false),
    field("state", SchemaType::Text, false),
    field("category", SchemaType::Text, false),
    field("registrations", SchemaType::Integer, false),
    field("manufacturer", SchemaType::Text, true),
    field("year", SchemaType::Integer, false),
    field("month", SchemaType::Text, false),
    field("quarter", SchemaType::Text, false),
    field("week", SchemaType::Text, false),
    field("day_of_week", SchemaType::Text, false),
    field("month_name", SchemaType::Text, false),
    field("registrations_7d_avg", SchemaType::Float, false),
    field("registrations_30d_avg", SchemaType::Float, false),
    field("yoy_growth", SchemaType::Float, true),
    field("qoq_growth", SchemaType::Float, true),
    field("mom_growth", SchemaType::Float, true),
    field("total_daily_registrations", SchemaType::Integer, false),
    field("category_market_share", SchemaType::Float, true),
    field("state_market_share", SchemaType::Float, true),
    field("performance_vs_30d", SchemaType::Float, true),
    field("is_above_average", SchemaType::Boolean, false),
    field("is_high_growth", SchemaType::Boolean, false),
    field("is_declining", SchemaType::Boolean, false),
    field("volatility_30d", SchemaType::Float, true),
];

/// Columns `process` cannot run without.
pub const PROCESS_REQUIRED: &[&str] = &["date", "state", "category", "registrations"];

/// Columns the growth summary reads.
pub const SUMMARY_REQUIRED: &[&str] = &[
    "year",
    "month",
    "state",
    "category",
    "registrations",
    "yoy_growth",
    "volatility_30d",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("type mismatch in column {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },
}

/// Column names of a schema, in order.
pub fn column_names(schema: &[SchemaField]) -> Vec<&'static str> {
    schema.iter().map(|f| f.name).collect()
}

pub fn lookup(schema: &[SchemaField], name: &str) -> Option<SchemaField> {
    schema.iter().find(|f| f.name == name).copied()
}

/// Fail on the first required column absent from `present`.
pub fn require_columns<S: AsRef<str>>(present: &[S], required: &[&str]) -> Result<(), SchemaError> {
    for name in required {
        if !present.iter().any(|p| p.as_ref() == *name) {
            return Err(SchemaError::MissingColumn((*name).to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_is_prefix_of_processed() {
        let raw = column_names(RAW_SCHEMA);
        let processed = column_names(PROCESSED_SCHEMA);
        assert_eq!(&processed[..raw.len()], raw.as_slice());
        assert_eq!(processed.len(), 24);
    }

    #[test]
    fn required_sets_exist_in_processed() {
        for name in PROCESS_REQUIRED.iter().chain(SUMMARY_REQUIRED) {
            assert!(lookup(PROCESSED_SCHEMA, name).is_some(), "{name}");
        }
    }

    #[test]
    fn manufacturer_is_optional() {
        let present = ["date", "state", "category", "registrations"];
        assert!(require_columns(&present, PROCESS_REQUIRED).is_ok());
    }

    #[test]
    fn missing_column_named() {
        let present = vec!["date".to_string(), "state".to_string(), "registrations".to_string()];
        let err = require_columns(&present, PROCESS_REQUIRED).unwrap_err();
        assert_eq!(err, SchemaError::MissingColumn("category".into()));
        assert_eq!(err.to_string(), "missing required column: category");
    }
}

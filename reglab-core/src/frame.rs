//! Polars boundary: DataFrame ⇄ typed rows.
//!
//! The engine works on typed rows. Tables coming from outside arrive as
//! DataFrames and are checked against the column contract in [`crate::schema`]
//! before conversion. Missing values travel as Polars nulls.

use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::domain::{MonthKey, Observation, ObservationTable, ProcessedRow};
use crate::engine::{self, GrowthMetricsSummary, SummaryRecord};
use crate::schema::{self, SchemaError, PROCESS_REQUIRED, SUMMARY_REQUIRED};

#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("invalid value in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        column: String,
        row: usize,
        reason: String,
    },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn invalid(column: &str, row: usize, reason: impl Into<String>) -> FrameError {
    FrameError::InvalidValue {
        column: column.to_string(),
        row,
        reason: reason.into(),
    }
}

fn mismatch(column: &str, expected: &str, actual: &DataType) -> FrameError {
    FrameError::Schema(SchemaError::TypeMismatch {
        column: column.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    })
}

fn epoch() -> NaiveDate {
    // NaiveDate's default is 1970-01-01
    NaiveDate::default()
}

fn to_days(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

fn from_days(days: i32) -> NaiveDate {
    epoch() + Duration::days(days as i64)
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect()
}

// ── Column readers ──────────────────────────────────────────────────

/// Date column stored as Date, Datetime (any unit) or `YYYY-MM-DD` strings.
/// Datetimes are truncated to their calendar day.
fn read_dates(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>, FrameError> {
    let col = df.column(name)?;
    match col.dtype() {
        DataType::Date => date_values(col, name),
        DataType::Datetime(_, _) => date_values(&col.cast(&DataType::Date)?, name),
        DataType::String => {
            let ca = col.str()?;
            (0..df.height())
                .map(|i| {
                    let raw = ca.get(i).ok_or_else(|| invalid(name, i, "null date"))?;
                    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                        .map_err(|e| invalid(name, i, format!("'{raw}': {e}")))
                })
                .collect()
        }
        other => Err(mismatch(name, "date, datetime or string", other)),
    }
}

fn date_values(col: &Column, name: &str) -> Result<Vec<NaiveDate>, FrameError> {
    let ca = col.date()?;
    (0..col.len())
        .map(|i| {
            ca.get(i)
                .map(from_days)
                .ok_or_else(|| invalid(name, i, "null date"))
        })
        .collect()
}

fn read_strings(df: &DataFrame, name: &str) -> Result<Vec<String>, FrameError> {
    let col = df.column(name)?;
    if col.dtype() != &DataType::String {
        return Err(mismatch(name, "string", col.dtype()));
    }
    let ca = col.str()?;
    (0..df.height())
        .map(|i| {
            ca.get(i)
                .map(str::to_string)
                .ok_or_else(|| invalid(name, i, "null value"))
        })
        .collect()
}

fn read_optional_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, FrameError> {
    let col = df.column(name)?;
    match col.dtype() {
        DataType::String => {
            let ca = col.str()?;
            Ok((0..df.height()).map(|i| ca.get(i).map(str::to_string)).collect())
        }
        // an all-null column may arrive untyped
        DataType::Null => Ok(vec![None; df.height()]),
        other => Err(mismatch(name, "string", other)),
    }
}

/// Non-negative, non-null integer counts.
fn read_counts(df: &DataFrame, name: &str) -> Result<Vec<u64>, FrameError> {
    let col = df.column(name)?;
    if !col.dtype().is_integer() {
        return Err(mismatch(name, "integer", col.dtype()));
    }
    let cast = col.cast(&DataType::Int64)?;
    let ca = cast.i64()?;
    (0..df.height())
        .map(|i| match ca.get(i) {
            None => Err(invalid(name, i, "null registrations")),
            Some(v) if v < 0 => Err(invalid(name, i, format!("negative registrations {v}"))),
            Some(v) => Ok(v as u64),
        })
        .collect()
}

fn read_years(df: &DataFrame, name: &str) -> Result<Vec<i32>, FrameError> {
    let col = df.column(name)?;
    if !col.dtype().is_integer() {
        return Err(mismatch(name, "integer", col.dtype()));
    }
    let cast = col.cast(&DataType::Int32)?;
    let ca = cast.i32()?;
    (0..df.height())
        .map(|i| ca.get(i).ok_or_else(|| invalid(name, i, "null year")))
        .collect()
}

/// Month column stored as `YYYY-MM` strings or as dates.
fn read_months(df: &DataFrame, name: &str) -> Result<Vec<MonthKey>, FrameError> {
    let col = df.column(name)?;
    match col.dtype() {
        DataType::Date | DataType::Datetime(_, _) => Ok(read_dates(df, name)?
            .into_iter()
            .map(MonthKey::from_date)
            .collect()),
        DataType::String => {
            let ca = col.str()?;
            (0..df.height())
                .map(|i| {
                    let raw = ca.get(i).ok_or_else(|| invalid(name, i, "null month"))?;
                    raw.parse::<MonthKey>()
                        .map_err(|e| invalid(name, i, e.to_string()))
                })
                .collect()
        }
        other => Err(mismatch(name, "string or date", other)),
    }
}

/// Nullable floats; integer columns are widened.
fn read_optional_floats(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, FrameError> {
    let col = df.column(name)?;
    let dtype = col.dtype();
    if dtype == &DataType::Null {
        return Ok(vec![None; df.height()]);
    }
    if !(dtype.is_float() || dtype.is_integer()) {
        return Err(mismatch(name, "float", dtype));
    }
    let cast = col.cast(&DataType::Float64)?;
    let ca = cast.f64()?;
    Ok((0..df.height())
        .map(|i| ca.get(i).filter(|v| v.is_finite()))
        .collect())
}

// ── Conversions ─────────────────────────────────────────────────────

pub fn observations_to_frame(rows: &[Observation]) -> Result<DataFrame, FrameError> {
    let dates: Vec<i32> = rows.iter().map(|r| to_days(r.date)).collect();
    let states: Vec<&str> = rows.iter().map(|r| r.state.as_str()).collect();
    let categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    let registrations: Vec<u64> = rows.iter().map(|r| r.registrations).collect();
    let manufacturers: Vec<Option<String>> = rows.iter().map(|r| r.manufacturer.clone()).collect();

    Ok(DataFrame::new(vec![
        Column::new("date".into(), dates).cast(&DataType::Date)?,
        Column::new("state".into(), states),
        Column::new("category".into(), categories),
        Column::new("registrations".into(), registrations),
        Column::new("manufacturer".into(), manufacturers),
    ])?)
}

/// Read raw observations. `manufacturer` is optional.
pub fn observations_from_frame(df: &DataFrame) -> Result<ObservationTable, FrameError> {
    schema::require_columns(&column_names(df), PROCESS_REQUIRED)?;

    let dates = read_dates(df, "date")?;
    let states = read_strings(df, "state")?;
    let categories = read_strings(df, "category")?;
    let registrations = read_counts(df, "registrations")?;
    let manufacturers = if df.column("manufacturer").is_ok() {
        read_optional_strings(df, "manufacturer")?
    } else {
        vec![None; df.height()]
    };

    Ok(dates
        .into_iter()
        .zip(states)
        .zip(categories)
        .zip(registrations)
        .zip(manufacturers)
        .map(|((((date, state), category), registrations), manufacturer)| {
            let mut obs = Observation::new(date, state.as_str(), category, registrations);
            obs.manufacturer = manufacturer;
            obs
        })
        .collect())
}

/// Flatten processed rows into a frame with the processed column order.
pub fn processed_to_frame(rows: &[ProcessedRow]) -> Result<DataFrame, FrameError> {
    fn col<T, F>(rows: &[ProcessedRow], f: F) -> Vec<T>
    where
        F: Fn(&ProcessedRow) -> T,
    {
        rows.iter().map(f).collect()
    }

    let dates = Column::new("date".into(), col(rows, |r| to_days(r.date))).cast(&DataType::Date)?;

    let df = DataFrame::new(vec![
        dates,
        Column::new("state".into(), col(rows, |r| r.state.to_string())),
        Column::new("category".into(), col(rows, |r| r.category.to_string())),
        Column::new("registrations".into(), col(rows, |r| r.registrations)),
        Column::new("manufacturer".into(), col(rows, |r| r.manufacturer.clone())),
        Column::new("year".into(), col(rows, |r| r.year)),
        Column::new("month".into(), col(rows, |r| r.month.to_string())),
        Column::new("quarter".into(), col(rows, |r| r.quarter.to_string())),
        Column::new("week".into(), col(rows, |r| r.week.to_string())),
        Column::new("day_of_week".into(), col(rows, |r| r.day_of_week.clone())),
        Column::new("month_name".into(), col(rows, |r| r.month_name.clone())),
        Column::new("registrations_7d_avg".into(), col(rows, |r| r.registrations_7d_avg)),
        Column::new("registrations_30d_avg".into(), col(rows, |r| r.registrations_30d_avg)),
        Column::new("yoy_growth".into(), col(rows, |r| r.yoy_growth)),
        Column::new("qoq_growth".into(), col(rows, |r| r.qoq_growth)),
        Column::new("mom_growth".into(), col(rows, |r| r.mom_growth)),
        Column::new(
            "total_daily_registrations".into(),
            col(rows, |r| r.total_daily_registrations),
        ),
        Column::new(
            "category_market_share".into(),
            col(rows, |r| r.category_market_share),
        ),
        Column::new("state_market_share".into(), col(rows, |r| r.state_market_share)),
        Column::new("performance_vs_30d".into(), col(rows, |r| r.performance_vs_30d)),
        Column::new("is_above_average".into(), col(rows, |r| r.is_above_average)),
        Column::new("is_high_growth".into(), col(rows, |r| r.is_high_growth)),
        Column::new("is_declining".into(), col(rows, |r| r.is_declining)),
        Column::new("volatility_30d".into(), col(rows, |r| r.volatility_30d)),
    ])?;
    Ok(df)
}

/// Read the columns the growth summary needs from a processed frame.
pub fn summary_records_from_frame(df: &DataFrame) -> Result<Vec<SummaryRecord>, FrameError> {
    schema::require_columns(&column_names(df), SUMMARY_REQUIRED)?;

    let years = read_years(df, "year")?;
    let months = read_months(df, "month")?;
    let states = read_strings(df, "state")?;
    let categories = read_strings(df, "category")?;
    let registrations = read_counts(df, "registrations")?;
    let yoy = read_optional_floats(df, "yoy_growth")?;
    let volatility = read_optional_floats(df, "volatility_30d")?;

    Ok((0..df.height())
        .map(|i| SummaryRecord {
            year: years[i],
            month: months[i],
            state: states[i].as_str().into(),
            category: categories[i].as_str().into(),
            registrations: registrations[i],
            yoy_growth: yoy[i],
            volatility_30d: volatility[i],
        })
        .collect())
}

// ── Frame-level entry points ────────────────────────────────────────

/// Process a raw registration frame into the processed frame.
pub fn process_registration_data(raw: &DataFrame) -> Result<DataFrame, FrameError> {
    let observations = observations_from_frame(raw)?;
    let processed = engine::process(&observations);
    debug!(rows = processed.len(), "processed registration frame");
    processed_to_frame(&processed)
}

/// Growth summary of a processed frame.
pub fn calculate_growth_metrics(processed: &DataFrame) -> Result<GrowthMetricsSummary, FrameError> {
    let records = summary_records_from_frame(processed)?;
    Ok(engine::summarize_records(&records))
}

pub fn write_parquet(df: &DataFrame, path: &Path) -> Result<(), FrameError> {
    let file = fs::File::create(path)?;
    ParquetWriter::new(file).finish(&mut df.clone())?;
    Ok(())
}

pub fn read_parquet(path: &Path) -> Result<DataFrame, FrameError> {
    let file = fs::File::open(path)?;
    Ok(ParquetReader::new(file).finish()?)
}

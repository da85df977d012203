//! CSV import and export of raw and processed tables.
//!
//! Column order follows the schemas in [`reglab_core::schema`]. Missing
//! values are written as empty cells and read back as missing.

use std::io::{Read, Write};

use chrono::NaiveDate;
use thiserror::Error;

use reglab_core::domain::{MonthKey, Observation, ObservationTable, ProcessedRow};
use reglab_core::engine::SummaryRecord;
use reglab_core::schema::{
    self, column_names, SchemaError, PROCESSED_SCHEMA, PROCESS_REQUIRED, RAW_SCHEMA,
    SUMMARY_REQUIRED,
};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("invalid value in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },
}

fn invalid(row: usize, column: &str, reason: impl Into<String>) -> TableError {
    TableError::InvalidValue {
        row,
        column: column.to_string(),
        reason: reason.into(),
    }
}

fn opt_float(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

// ── Writers ─────────────────────────────────────────────────────────

pub fn write_raw_csv<W: Write>(rows: &[Observation], writer: W) -> Result<(), TableError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(column_names(RAW_SCHEMA))?;
    for r in rows {
        wtr.write_record([
            r.date.to_string(),
            r.state.to_string(),
            r.category.to_string(),
            r.registrations.to_string(),
            r.manufacturer.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_processed_csv<W: Write>(rows: &[ProcessedRow], writer: W) -> Result<(), TableError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(column_names(PROCESSED_SCHEMA))?;
    for r in rows {
        wtr.write_record([
            r.date.to_string(),
            r.state.to_string(),
            r.category.to_string(),
            r.registrations.to_string(),
            r.manufacturer.clone().unwrap_or_default(),
            r.year.to_string(),
            r.month.to_string(),
            r.quarter.to_string(),
            r.week.to_string(),
            r.day_of_week.clone(),
            r.month_name.clone(),
            r.registrations_7d_avg.to_string(),
            r.registrations_30d_avg.to_string(),
            opt_float(r.yoy_growth),
            opt_float(r.qoq_growth),
            opt_float(r.mom_growth),
            r.total_daily_registrations.to_string(),
            opt_float(r.category_market_share),
            opt_float(r.state_market_share),
            opt_float(r.performance_vs_30d),
            r.is_above_average.to_string(),
            r.is_high_growth.to_string(),
            r.is_declining.to_string(),
            opt_float(r.volatility_30d),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn raw_csv_string(rows: &[Observation]) -> Result<String, TableError> {
    let mut buf = Vec::new();
    write_raw_csv(rows, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn processed_csv_string(rows: &[ProcessedRow]) -> Result<String, TableError> {
    let mut buf = Vec::new();
    write_processed_csv(rows, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// ── Readers ─────────────────────────────────────────────────────────

/// Header positions, validated against a required column set.
struct Header {
    names: Vec<String>,
}

impl Header {
    fn read<R: Read>(rdr: &mut csv::Reader<R>, required: &[&str]) -> Result<Self, TableError> {
        let names: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
        schema::require_columns(&names, required)?;
        Ok(Self { names })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Reads typed cells out of one record.
struct Cells<'a> {
    record: &'a csv::StringRecord,
    header: &'a Header,
    row: usize,
}

impl<'a> Cells<'a> {
    fn raw(&self, column: &str) -> Option<&'a str> {
        self.header
            .position(column)
            .and_then(|i| self.record.get(i))
            .map(str::trim)
    }

    fn required(&self, column: &str) -> Result<&'a str, TableError> {
        match self.raw(column) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(invalid(self.row, column, "missing value")),
        }
    }

    fn optional(&self, column: &str) -> Option<&'a str> {
        self.raw(column).filter(|v| !v.is_empty())
    }

    fn date(&self, column: &str) -> Result<NaiveDate, TableError> {
        let v = self.required(column)?;
        NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map_err(|e| invalid(self.row, column, format!("'{v}': {e}")))
    }

    fn count(&self, column: &str) -> Result<u64, TableError> {
        let v = self.required(column)?;
        let n: i64 = v
            .parse()
            .map_err(|_| invalid(self.row, column, format!("'{v}' is not an integer")))?;
        if n < 0 {
            return Err(invalid(self.row, column, format!("negative registrations {n}")));
        }
        Ok(n as u64)
    }

    fn float(&self, column: &str) -> Result<Option<f64>, TableError> {
        self.optional(column)
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| invalid(self.row, column, format!("'{v}' is not a number")))
            })
            .transpose()
            .map(|v| v.filter(|x| x.is_finite()))
    }
}

/// Read a raw table. `manufacturer` may be absent or empty.
pub fn read_raw_csv<R: Read>(reader: R) -> Result<ObservationTable, TableError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let header = Header::read(&mut rdr, PROCESS_REQUIRED)?;

    let mut rows = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let cells = Cells {
            record: &record,
            header: &header,
            row,
        };
        let mut obs = Observation::new(
            cells.date("date")?,
            cells.required("state")?,
            cells.required("category")?,
            cells.count("registrations")?,
        );
        obs.manufacturer = cells.optional("manufacturer").map(str::to_string);
        rows.push(obs);
    }
    Ok(rows)
}

/// Read the columns the growth summary needs from a processed CSV.
pub fn read_summary_csv<R: Read>(reader: R) -> Result<Vec<SummaryRecord>, TableError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let header = Header::read(&mut rdr, SUMMARY_REQUIRED)?;

    let mut records = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let cells = Cells {
            record: &record,
            header: &header,
            row,
        };
        let year_raw = cells.required("year")?;
        let year: i32 = year_raw
            .parse()
            .map_err(|_| invalid(row, "year", format!("'{year_raw}' is not a year")))?;
        let month = cells
            .required("month")?
            .parse::<MonthKey>()
            .map_err(|e| invalid(row, "month", e.to_string()))?;

        records.push(SummaryRecord {
            year,
            month,
            state: cells.required("state")?.into(),
            category: cells.required("category")?.into(),
            registrations: cells.count("registrations")?,
            yoy_growth: cells.float("yoy_growth")?,
            volatility_30d: cells.float("volatility_30d")?,
        });
    }
    Ok(records)
}

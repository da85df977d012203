//! Observation and processed-row records.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::period::{month_name, weekday_name, MonthKey, QuarterKey, WeekKey};
use super::state::State;

/// A raw registration count for one (date, state, category).
///
/// Several observations may share a key when the source splits counts by
/// manufacturer; aggregate before assuming uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub state: State,
    pub category: Category,
    pub registrations: u64,
    pub manufacturer: Option<String>,
}

impl Observation {
    pub fn new(
        date: NaiveDate,
        state: impl Into<State>,
        category: impl Into<Category>,
        registrations: u64,
    ) -> Self {
        Self {
            date,
            state: state.into(),
            category: category.into(),
            registrations,
            manufacturer: None,
        }
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn series_key(&self) -> SeriesKey {
        SeriesKey {
            state: self.state.clone(),
            category: self.category.clone(),
        }
    }
}

/// Grouping key of a single time series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub state: State,
    pub category: Category,
}

/// Raw table: rows in generation or ingestion order.
pub type ObservationTable = Vec<Observation>;

/// Processed table: rows sorted by (state, category, date).
pub type ProcessedTable = Vec<ProcessedRow>;

/// An observation extended with every derived analytics column.
///
/// `None` marks a value that is undefined for the row (no prior period,
/// zero denominator, too few observations in the window).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRow {
    pub date: NaiveDate,
    pub state: State,
    pub category: Category,
    pub registrations: u64,
    pub manufacturer: Option<String>,

    pub year: i32,
    pub month: MonthKey,
    pub quarter: QuarterKey,
    pub week: WeekKey,
    pub day_of_week: String,
    pub month_name: String,

    pub registrations_7d_avg: f64,
    pub registrations_30d_avg: f64,

    pub yoy_growth: Option<f64>,
    pub qoq_growth: Option<f64>,
    pub mom_growth: Option<f64>,

    pub total_daily_registrations: u64,
    pub category_market_share: Option<f64>,
    pub state_market_share: Option<f64>,

    pub performance_vs_30d: Option<f64>,
    pub is_above_average: bool,
    pub is_high_growth: bool,
    pub is_declining: bool,
    pub volatility_30d: Option<f64>,
}

impl ProcessedRow {
    /// Start a processed row from an observation: calendar fields are filled,
    /// rolling averages start at the row's own count, everything else is unset.
    pub fn from_observation(obs: &Observation) -> Self {
        let date = obs.date;
        let own = obs.registrations as f64;
        Self {
            date,
            state: obs.state.clone(),
            category: obs.category.clone(),
            registrations: obs.registrations,
            manufacturer: obs.manufacturer.clone(),
            year: date.year(),
            month: MonthKey::from_date(date),
            quarter: QuarterKey::from_date(date),
            week: WeekKey::from_date(date),
            day_of_week: weekday_name(date).to_string(),
            month_name: month_name(date.month()).to_string(),
            registrations_7d_avg: own,
            registrations_30d_avg: own,
            yoy_growth: None,
            qoq_growth: None,
            mom_growth: None,
            total_daily_registrations: 0,
            category_market_share: None,
            state_market_share: None,
            performance_vs_30d: None,
            is_above_average: false,
            is_high_growth: false,
            is_declining: false,
            volatility_30d: None,
        }
    }

    pub fn series_key(&self) -> SeriesKey {
        SeriesKey {
            state: self.state.clone(),
            category: self.category.clone(),
        }
    }

    /// True when both rows belong to the same (state, category) series.
    pub fn same_series(&self, other: &ProcessedRow) -> bool {
        self.state == other.state && self.category == other.category
    }
}

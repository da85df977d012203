//! Calendar period keys.
//!
//! Periods render the way downstream consumers expect them in flat tables:
//! months as `2024-03`, quarters as `2024Q1`, weeks as the Monday–Sunday span
//! `2024-01-01/2024-01-07`.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} period '{input}'")]
pub struct PeriodParseError {
    pub kind: &'static str,
    pub input: String,
}

impl PeriodParseError {
    fn new(kind: &'static str, input: &str) -> Self {
        Self {
            kind,
            input: input.to_string(),
        }
    }
}

/// Year-month period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeriodParseError::new("month", s);
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) {
            return Err(err());
        }
        Ok(Self { year, month })
    }
}

/// Year-quarter period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuarterKey {
    pub year: i32,
    pub quarter: u32,
}

impl QuarterKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month() - 1) / 3 + 1,
        }
    }
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

impl FromStr for QuarterKey {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeriodParseError::new("quarter", s);
        let (year, quarter) = s.trim().split_once('Q').ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let quarter: u32 = quarter.parse().map_err(|_| err())?;
        if !(1..=4).contains(&quarter) {
            return Err(err());
        }
        Ok(Self { year, quarter })
    }
}

/// Monday-to-Sunday week, keyed by its Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekKey {
    pub start: NaiveDate,
}

impl WeekKey {
    pub fn from_date(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        Self {
            start: date - Duration::days(offset),
        }
    }

    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(6)
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start, self.end())
    }
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_display_and_parse() {
        let key = MonthKey::from_date(d(2024, 3, 17));
        assert_eq!(key.to_string(), "2024-03");
        assert_eq!("2024-03".parse::<MonthKey>().unwrap(), key);
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("March".parse::<MonthKey>().is_err());
    }

    #[test]
    fn months_order_across_years() {
        assert!(MonthKey::new(2023, 12) < MonthKey::new(2024, 1));
    }

    #[test]
    fn quarter_boundaries() {
        assert_eq!(QuarterKey::from_date(d(2024, 3, 31)).to_string(), "2024Q1");
        assert_eq!(QuarterKey::from_date(d(2024, 4, 1)).to_string(), "2024Q2");
        assert_eq!(QuarterKey::from_date(d(2024, 12, 31)).to_string(), "2024Q4");
        assert_eq!("2024Q4".parse::<QuarterKey>().unwrap().quarter, 4);
    }

    #[test]
    fn week_runs_monday_to_sunday() {
        // 2024-01-03 is a Wednesday
        let week = WeekKey::from_date(d(2024, 1, 3));
        assert_eq!(week.start, d(2024, 1, 1));
        assert_eq!(week.to_string(), "2024-01-01/2024-01-07");
        // Sunday belongs to the preceding Monday's week
        assert_eq!(WeekKey::from_date(d(2024, 1, 7)).start, d(2024, 1, 1));
    }

    #[test]
    fn names() {
        assert_eq!(weekday_name(d(2024, 1, 1)), "Monday");
        assert_eq!(month_name(10), "October");
        assert_eq!(month_name(0), "Unknown");
    }
}

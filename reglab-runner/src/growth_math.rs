//! Growth helpers over scalars and slices.
//!
//! Used by the report and KPI layers for display-oriented figures.

use std::fmt;

use serde::{Deserialize, Serialize};

use reglab_core::engine::stats;

/// Percent growth from `previous` to `current`. 0 when undefined.
pub fn growth_rate(current: f64, previous: f64) -> f64 {
    stats::pct_change(current, previous).map_or(0.0, |c| c * 100.0)
}

/// Compound annual growth rate in percent. 0 for a non-positive start or period count.
pub fn cagr(end_value: f64, start_value: f64, periods: u32) -> f64 {
    if start_value <= 0.0 || periods == 0 {
        return 0.0;
    }
    ((end_value / start_value).powf(1.0 / periods as f64) - 1.0) * 100.0
}

/// Herfindahl–Hirschman index from percentage shares (0–10 000).
pub fn herfindahl_index(shares_pct: &[f64]) -> f64 {
    shares_pct.iter().map(|s| (s / 100.0).powi(2)).sum::<f64>() * 10_000.0
}

/// Descriptive band for a percent growth rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthLabel {
    VeryHighGrowth,
    HighGrowth,
    ModerateGrowth,
    LowGrowth,
    SlightDecline,
    ModerateDecline,
    SteepDecline,
    Unknown,
}

impl GrowthLabel {
    pub fn classify(rate: f64) -> Self {
        if rate.is_nan() {
            GrowthLabel::Unknown
        } else if rate > 20.0 {
            GrowthLabel::VeryHighGrowth
        } else if rate > 10.0 {
            GrowthLabel::HighGrowth
        } else if rate > 5.0 {
            GrowthLabel::ModerateGrowth
        } else if rate > 0.0 {
            GrowthLabel::LowGrowth
        } else if rate > -5.0 {
            GrowthLabel::SlightDecline
        } else if rate > -15.0 {
            GrowthLabel::ModerateDecline
        } else {
            GrowthLabel::SteepDecline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthLabel::VeryHighGrowth => "Very High Growth",
            GrowthLabel::HighGrowth => "High Growth",
            GrowthLabel::ModerateGrowth => "Moderate Growth",
            GrowthLabel::LowGrowth => "Low Growth",
            GrowthLabel::SlightDecline => "Slight Decline",
            GrowthLabel::ModerateDecline => "Moderate Decline",
            GrowthLabel::SteepDecline => "Steep Decline",
            GrowthLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for GrowthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Outside [Q1 - 1.5·IQR, Q3 + 1.5·IQR]
    Iqr,
    /// |z| > 3 using the sample standard deviation
    ZScore,
}

/// Flag outliers in `values`, one bool per value.
pub fn detect_outliers(values: &[f64], method: OutlierMethod) -> Vec<bool> {
    match method {
        OutlierMethod::Iqr => {
            let (Some(q1), Some(q3)) = (stats::quantile(values, 0.25), stats::quantile(values, 0.75))
            else {
                return vec![false; values.len()];
            };
            let iqr = q3 - q1;
            let lower = q1 - 1.5 * iqr;
            let upper = q3 + 1.5 * iqr;
            values.iter().map(|v| *v < lower || *v > upper).collect()
        }
        OutlierMethod::ZScore => {
            let (Some(mean), Some(sd)) = (stats::mean(values), stats::sample_std(values)) else {
                return vec![false; values.len()];
            };
            if sd == 0.0 {
                return vec![false; values.len()];
            }
            values.iter().map(|v| ((v - mean) / sd).abs() > 3.0).collect()
        }
    }
}

/// Compact display form with K/M/B suffixes.
pub fn format_number(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "N/A".to_string();
    }
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.*}B", precision, value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.*}M", precision, value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.*}K", precision, value / 1_000.0)
    } else {
        format!("{:.*}", precision, value)
    }
}

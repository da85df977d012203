//! Calibration tables for synthetic registrations.
//!
//! Unknown categories and states fall back to neutral defaults instead of
//! failing, so callers may request labels the tables do not list.

use crate::domain::{Category, State};
use chrono::{Datelike, NaiveDate};

/// First year of the compound growth curve (growth factor 1.0).
pub const GROWTH_BASE_YEAR: i32 = 2020;

const DEFAULT_BASE: f64 = 1000.0;
const DEFAULT_GROWTH_RATE: f64 = 0.10;
const DEFAULT_STATE_FACTOR: f64 = 0.8;

/// Seasonal multipliers, January first. Festive peak Oct–Dec, monsoon trough Jun–Aug.
const SEASONAL: [f64; 12] = [0.9, 0.85, 1.1, 1.15, 0.95, 0.8, 0.75, 0.8, 1.0, 1.3, 1.4, 1.2];

const STATE_FACTORS: [(&str, f64); 12] = [
    ("Maharashtra", 1.2),
    ("Karnataka", 1.0),
    ("Tamil Nadu", 1.1),
    ("Gujarat", 0.9),
    ("Uttar Pradesh", 1.3),
    ("Rajasthan", 0.8),
    ("West Bengal", 0.85),
    ("Telangana", 0.75),
    ("Haryana", 0.7),
    ("Delhi", 0.6),
    ("Punjab", 0.65),
    ("Madhya Pradesh", 0.8),
];

/// Baseline daily registrations per state and category.
pub fn base_registrations(category: &Category) -> f64 {
    match category {
        Category::TwoWheeler => 15_000.0,
        Category::ThreeWheeler => 1_200.0,
        Category::FourWheeler => 8_000.0,
        Category::Commercial => 2_500.0,
        Category::Others => 800.0,
        Category::Unlisted(_) => DEFAULT_BASE,
    }
}

pub fn seasonal_factor(month: u32) -> f64 {
    SEASONAL
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or(1.0)
}

pub fn annual_growth_rate(category: &Category) -> f64 {
    match category {
        Category::TwoWheeler => 0.08,
        Category::ThreeWheeler => 0.12,
        Category::FourWheeler => 0.15,
        Category::Commercial => 0.06,
        Category::Others => 0.10,
        Category::Unlisted(_) => DEFAULT_GROWTH_RATE,
    }
}

/// Compound growth `(1 + rate)^(year - base_year)`. Years before the base
/// year shrink the baseline.
pub fn growth_factor(year: i32, category: &Category, base_year: i32) -> f64 {
    (1.0 + annual_growth_rate(category)).powi(year - base_year)
}

pub fn state_factor(state: &State) -> f64 {
    STATE_FACTORS
        .iter()
        .find(|(name, _)| *name == state.as_str())
        .map(|(_, factor)| *factor)
        .unwrap_or(DEFAULT_STATE_FACTOR)
}

pub fn manufacturers(category: &Category) -> &'static [&'static str] {
    match category {
        Category::TwoWheeler => &["Hero MotoCorp", "Honda", "TVS", "Bajaj", "Royal Enfield"],
        Category::ThreeWheeler => &["Bajaj", "TVS", "Mahindra", "Piaggio"],
        Category::FourWheeler => &["Maruti Suzuki", "Hyundai", "Tata Motors", "Mahindra", "Kia"],
        Category::Commercial => &["Tata Motors", "Ashok Leyland", "Mahindra", "Eicher"],
        Category::Others => &["Various", "Others"],
        Category::Unlisted(_) => &["Others"],
    }
}

/// Noise-free expected registrations for one row.
pub fn expected_registrations(
    date: NaiveDate,
    state: &State,
    category: &Category,
    base_year: i32,
) -> f64 {
    base_registrations(category)
        * seasonal_factor(date.month())
        * growth_factor(date.year(), category, base_year)
        * state_factor(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn unknown_labels_use_defaults() {
        let unknown = Category::from("Tractor");
        assert_eq!(base_registrations(&unknown), 1000.0);
        assert_eq!(annual_growth_rate(&unknown), 0.10);
        assert_eq!(manufacturers(&unknown), &["Others"]);
        assert_eq!(state_factor(&State::from("Goa")), 0.8);
    }

    #[test]
    fn seasonal_peaks_in_november() {
        let peak = (1..=12)
            .max_by(|a, b| seasonal_factor(*a).total_cmp(&seasonal_factor(*b)))
            .unwrap();
        assert_eq!(peak, 11);
        assert!(seasonal_factor(7) < seasonal_factor(1));
    }

    #[test]
    fn growth_compounds_from_base_year() {
        assert!((growth_factor(2020, &Category::FourWheeler, 2020) - 1.0).abs() < EPS);
        assert!((growth_factor(2022, &Category::FourWheeler, 2020) - 1.15 * 1.15).abs() < EPS);
        assert!(growth_factor(2019, &Category::TwoWheeler, 2020) < 1.0);
    }

    #[test]
    fn expected_value_combines_factors() {
        let date = NaiveDate::from_ymd_opt(2021, 10, 5).unwrap();
        let v = expected_registrations(
            date,
            &State::from("Maharashtra"),
            &Category::TwoWheeler,
            GROWTH_BASE_YEAR,
        );
        assert!((v - 15_000.0 * 1.3 * 1.08 * 1.2).abs() < 1e-6);
    }

    #[test]
    fn calibrated_states_resolve_their_factor() {
        for (name, factor) in STATE_FACTORS {
            assert_eq!(state_factor(&State::from(name)), factor);
            assert_eq!(state_factor(&State::new(format!(" {name} "))), factor);
        }
    }
}

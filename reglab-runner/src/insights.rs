//! Investor-oriented insights per vehicle category.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use reglab_core::domain::ProcessedRow;
use reglab_core::engine::stats;

/// Number of most recent defined YoY values averaged for momentum.
pub const MOMENTUM_WINDOW: usize = 30;
/// Number of most recent defined YoY values averaged for the trend label.
pub const TREND_WINDOW: usize = 10;
/// Number of categories listed as market leaders.
pub const LEADER_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "Strong Growth")]
    StrongGrowth,
    #[serde(rename = "Moderate Growth")]
    ModerateGrowth,
    Stable,
    Declining,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl Trend {
    pub fn classify(recent_yoy: Option<f64>) -> Self {
        match recent_yoy {
            None => Trend::InsufficientData,
            Some(g) if g > 15.0 => Trend::StrongGrowth,
            Some(g) if g > 5.0 => Trend::ModerateGrowth,
            Some(g) if g > -5.0 => Trend::Stable,
            Some(_) => Trend::Declining,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::StrongGrowth => "Strong Growth",
            Trend::ModerateGrowth => "Moderate Growth",
            Trend::Stable => "Stable",
            Trend::Declining => "Declining",
            Trend::InsufficientData => "Insufficient Data",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketLeader {
    pub category: String,
    pub registrations: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestmentInsights {
    /// Mean of the latest defined YoY values per category.
    pub growth_momentum: BTreeMap<String, f64>,
    /// Categories with the highest total volume, largest first.
    pub market_leaders: Vec<MarketLeader>,
    /// Coefficient of variation of per-row counts per category.
    pub volatility_scores: BTreeMap<String, Option<f64>>,
    pub trend_classification: BTreeMap<String, Trend>,
}

impl InvestmentInsights {
    pub fn compute(rows: &[ProcessedRow]) -> Self {
        let mut by_category: BTreeMap<String, Vec<&ProcessedRow>> = BTreeMap::new();
        for row in rows {
            by_category
                .entry(row.category.as_str().to_string())
                .or_default()
                .push(row);
        }

        let mut insights = InvestmentInsights::default();
        let mut volumes: Vec<MarketLeader> = Vec::with_capacity(by_category.len());

        for (category, mut group) in by_category {
            // latest means latest by date across all states
            group.sort_by_key(|r| r.date);
            let defined_yoy: Vec<f64> = group.iter().filter_map(|r| r.yoy_growth).collect();

            if let Some(momentum) = stats::mean(tail(&defined_yoy, MOMENTUM_WINDOW)) {
                insights.growth_momentum.insert(category.clone(), momentum);
            }
            insights.trend_classification.insert(
                category.clone(),
                Trend::classify(stats::mean(tail(&defined_yoy, TREND_WINDOW))),
            );

            let counts: Vec<f64> = group.iter().map(|r| r.registrations as f64).collect();
            let cv = match (stats::sample_std(&counts), stats::mean(&counts)) {
                (Some(sd), Some(mean)) if mean != 0.0 => Some(sd / mean),
                _ => None,
            };
            insights.volatility_scores.insert(category.clone(), cv);

            volumes.push(MarketLeader {
                category,
                registrations: group.iter().map(|r| r.registrations).sum(),
            });
        }

        // stable sort keeps label order among equal volumes
        volumes.sort_by(|a, b| b.registrations.cmp(&a.registrations));
        volumes.truncate(LEADER_COUNT);
        insights.market_leaders = volumes;
        insights
    }
}

fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

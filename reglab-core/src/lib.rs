//! RegLab Core: domain types, synthetic data generator, metrics engine.
//!
//! This crate contains the analytics pipeline:
//! - Domain types (observations, processed rows, categories, states, periods)
//! - Synthetic registration generator with a per-series seeded RNG hierarchy
//! - Metrics engine: rolling averages, monthly growth, market shares, flags
//! - Growth metrics summary
//! - Polars DataFrame boundary with column-contract validation

pub mod domain;
pub mod engine;
pub mod frame;
pub mod generator;
pub mod rng;
pub mod schema;

pub use domain::{
    Category, Observation, ObservationTable, ProcessedRow, ProcessedTable, SeriesKey, State,
};
pub use engine::{process, summarize, GrowthMetricsSummary, SummaryRecord};
pub use frame::{calculate_growth_metrics, process_registration_data, FrameError};
pub use generator::{collect_data, CollectError, GenerationRequest, GeneratorConfig};
pub use schema::SchemaError;

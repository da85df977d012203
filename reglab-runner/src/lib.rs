//! RegLab Runner: pipeline orchestration, analytics, artifact export.
//!
//! This crate builds on `reglab-core` to provide:
//! - TOML pipeline configuration
//! - The collect → process → summarize pipeline with a dataset fingerprint
//! - Summary statistics, data quality, investment insights and KPIs
//! - CSV/Parquet/JSON/Markdown artifacts per run

pub mod config;
pub mod export;
pub mod growth_math;
pub mod insights;
pub mod kpi;
pub mod pipeline;
pub mod quality;
pub mod report;
pub mod statistics;
pub mod tabular;

pub use config::{ConfigError, PipelineConfig};
pub use export::{export_json, import_json, load_artifacts, save_artifacts};
pub use insights::{InvestmentInsights, Trend};
pub use kpi::{filter_by_manufacturer, Kpis};
pub use pipeline::{analyze, dataset_hash, run_pipeline, PipelineError, PipelineOutput, RunReport};
pub use quality::QualityReport;
pub use report::generate_report;
pub use statistics::SummaryStatistics;
pub use tabular::{read_raw_csv, read_summary_csv, write_processed_csv, write_raw_csv, TableError};

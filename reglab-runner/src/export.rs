//! Artifact export: JSON metrics, CSV and Parquet tables, Markdown report.
//!
//! `metrics.json` carries a `schema_version`; newer versions are rejected on
//! load.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use reglab_core::frame;

use crate::pipeline::{PipelineOutput, RunReport, SCHEMA_VERSION};
use crate::report::generate_report;
use crate::tabular;

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

/// Deserialize a `RunReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunReport> {
    let report: RunReport =
        serde_json::from_str(json).context("failed to deserialize RunReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one run.
///
/// Creates `run_{timestamp}/` under `output_dir` containing `raw.csv`,
/// `processed.csv`, `processed.parquet` (when `write_parquet`),
/// `metrics.json` and `report.md`. Returns the created directory.
pub fn save_artifacts(
    output: &PipelineOutput,
    output_dir: &Path,
    write_parquet: bool,
) -> Result<PathBuf> {
    let dirname = format!("run_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let raw_path = run_dir.join("raw.csv");
    tabular::write_raw_csv(&output.raw, create(&raw_path)?)
        .with_context(|| format!("failed to write {}", raw_path.display()))?;

    let processed_path = run_dir.join("processed.csv");
    tabular::write_processed_csv(&output.processed, create(&processed_path)?)
        .with_context(|| format!("failed to write {}", processed_path.display()))?;

    if write_parquet {
        let parquet_path = run_dir.join("processed.parquet");
        let df = frame::processed_to_frame(&output.processed)?;
        frame::write_parquet(&df, &parquet_path)
            .with_context(|| format!("failed to write {}", parquet_path.display()))?;
    }

    std::fs::write(run_dir.join("metrics.json"), export_json(&output.report)?)?;
    std::fs::write(run_dir.join("report.md"), generate_report(&output.report))?;

    info!(dir = %run_dir.display(), rows = output.processed.len(), "saved artifacts");
    Ok(run_dir)
}

/// Load the run report from an artifact directory.
pub fn load_artifacts(dir: &Path) -> Result<RunReport> {
    let path = dir.join("metrics.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

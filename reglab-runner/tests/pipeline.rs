//! Integration tests for the run pipeline and its artifacts.

use std::fs::File;

use reglab_core::frame;
use reglab_runner::{
    import_json, load_artifacts, read_raw_csv, read_summary_csv, run_pipeline, save_artifacts,
    PipelineConfig,
};

fn config(seed: u64) -> PipelineConfig {
    PipelineConfig::from_toml(&format!(
        r#"
        [data]
        start = "2023-01-01"
        end = "2024-03-31"
        states = ["Delhi", "Maharashtra"]
        categories = ["2W", "4W"]

        [generator]
        seed = {seed}
        "#
    ))
    .unwrap()
}

#[test]
fn artifacts_are_written() {
    let out = run_pipeline(&config(11)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&out, dir.path(), true).unwrap();

    let name = run_dir.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("run_"), "unexpected dir name {name}");
    for file in ["raw.csv", "processed.csv", "processed.parquet", "metrics.json", "report.md"] {
        assert!(run_dir.join(file).exists(), "missing {file}");
    }

    let report = load_artifacts(&run_dir).unwrap();
    assert_eq!(report.dataset_hash, out.report.dataset_hash);
    assert_eq!(report.seed, Some(11));
}

#[test]
fn parquet_can_be_skipped() {
    let out = run_pipeline(&config(3)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&out, dir.path(), false).unwrap();
    assert!(!run_dir.join("processed.parquet").exists());
    assert!(run_dir.join("processed.csv").exists());
}

#[test]
fn raw_csv_reproduces_the_run() {
    let out = run_pipeline(&config(5)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&out, dir.path(), false).unwrap();

    let raw = read_raw_csv(File::open(run_dir.join("raw.csv")).unwrap()).unwrap();
    assert_eq!(raw, out.raw);
    assert_eq!(reglab_runner::dataset_hash(&raw), out.report.dataset_hash);

    let records = read_summary_csv(File::open(run_dir.join("processed.csv")).unwrap()).unwrap();
    assert_eq!(records.len(), out.processed.len());
    let summary = reglab_core::engine::summarize_records(&records);
    assert_eq!(summary.market_concentration, out.report.summary.market_concentration);
    assert_eq!(summary.top_growing_category, out.report.summary.top_growing_category);
}

#[test]
fn parquet_matches_processed_rows() {
    let out = run_pipeline(&config(9)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&out, dir.path(), true).unwrap();

    let df = frame::read_parquet(&run_dir.join("processed.parquet")).unwrap();
    assert_eq!(df.height(), out.processed.len());
    let metrics = reglab_core::calculate_growth_metrics(&df).unwrap();
    assert_eq!(metrics, out.report.summary);
}

#[test]
fn yoy_available_after_a_year() {
    let out = run_pipeline(&config(21)).unwrap();
    // 15 months of data: the last three months of each series carry YoY
    let with_yoy = out.processed.iter().filter(|r| r.yoy_growth.is_some()).count();
    let series = 2 * 2;
    assert_eq!(with_yoy, series * (31 + 29 + 31));
    assert!(out.report.summary.total_yoy_growth != 0.0);
}

#[test]
fn metrics_json_is_versioned() {
    let out = run_pipeline(&config(2)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&out, dir.path(), false).unwrap();

    let json = std::fs::read_to_string(run_dir.join("metrics.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["schema_version"], 1);
    for key in ["summary", "statistics", "quality", "insights", "kpis", "data_source"] {
        assert!(value.get(key).is_some(), "metrics.json missing {key}");
    }
    assert!(import_json(&json).is_ok());
}

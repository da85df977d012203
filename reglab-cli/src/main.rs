//! RegLab CLI: generate, process and summarize registration data.
//!
//! Commands:
//! - `generate`: write a synthetic raw table as CSV
//! - `run`: full pipeline from a TOML config, saving a run artifact directory
//! - `process`: derive the processed table from a raw CSV
//! - `summarize`: print the growth metrics of a processed CSV as JSON

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use reglab_core::domain::{Category, State};
use reglab_core::generator::{
    collect_data, AssumeOnline, ConnectivityProbe, GenerationRequest, GeneratorConfig, HttpProbe,
    SyntheticGenerator, DEFAULT_PROBE_TIMEOUT, DEFAULT_PROBE_URL,
};
use reglab_core::{engine, process};
use reglab_runner::growth_math::format_number;
use reglab_runner::{
    read_raw_csv, read_summary_csv, run_pipeline, save_artifacts, write_processed_csv,
    write_raw_csv, PipelineConfig, PipelineOutput,
};

#[derive(Parser)]
#[command(
    name = "reglab",
    about = "RegLab CLI: vehicle registration analytics"
)]
struct Cli {
    /// Debug-level logging (overrides RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic raw registration table.
    Generate {
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: String,

        /// States to generate. Defaults to the five default states.
        #[arg(long, num_args = 1..)]
        states: Vec<String>,

        /// Categories to generate. Defaults to 2W, 3W, 4W.
        #[arg(long, num_args = 1..)]
        categories: Vec<String>,

        /// Random seed for reproducible output.
        #[arg(long)]
        seed: Option<u64>,

        /// Run the connectivity pre-check first.
        #[arg(long, default_value_t = false)]
        check_connectivity: bool,

        /// Output CSV. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run the full pipeline and save artifacts.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Start date (YYYY-MM-DD); overrides the config.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD); overrides the config.
        #[arg(long)]
        end: Option<String>,

        #[arg(long, num_args = 1..)]
        states: Vec<String>,

        #[arg(long, num_args = 1..)]
        categories: Vec<String>,

        /// Restrict KPIs and insights to these manufacturers.
        #[arg(long, num_args = 1..)]
        manufacturers: Vec<String>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = false)]
        check_connectivity: bool,

        /// Output directory; overrides the config.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip the Parquet copy of the processed table.
        #[arg(long, default_value_t = false)]
        no_parquet: bool,
    },
    /// Process a raw CSV into the processed table.
    Process {
        #[arg(long)]
        input: PathBuf,

        /// Output CSV. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the growth metrics of a processed CSV as JSON.
    Summarize {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            start,
            end,
            states,
            categories,
            seed,
            check_connectivity,
            output,
        } => run_generate(
            &start,
            &end,
            states,
            categories,
            seed,
            check_connectivity,
            output.as_deref(),
        ),
        Commands::Run {
            config,
            start,
            end,
            states,
            categories,
            manufacturers,
            seed,
            check_connectivity,
            output_dir,
            no_parquet,
        } => {
            let mut pipeline_config = match &config {
                Some(path) => PipelineConfig::from_file(path)?,
                None => PipelineConfig::default(),
            };
            if let Some(s) = start {
                pipeline_config.data.start = parse_date(&s)?;
            }
            if let Some(e) = end {
                pipeline_config.data.end = parse_date(&e)?;
            }
            if !states.is_empty() {
                pipeline_config.data.states = states;
            }
            if !categories.is_empty() {
                pipeline_config.data.categories = categories;
            }
            if !manufacturers.is_empty() {
                pipeline_config.data.manufacturers = manufacturers;
            }
            if seed.is_some() {
                pipeline_config.generator.seed = seed;
            }
            if check_connectivity {
                pipeline_config.connectivity.enabled = true;
            }
            if let Some(dir) = output_dir {
                pipeline_config.output.dir = dir;
            }
            if no_parquet {
                pipeline_config.output.write_parquet = false;
            }
            pipeline_config.validate()?;
            run_full(&pipeline_config)
        }
        Commands::Process { input, output } => run_process(&input, output.as_deref()),
        Commands::Summarize { input } => run_summarize(&input),
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

/// Output file, or stdout when no path is given.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(
            File::create(p).with_context(|| format!("failed to create {}", p.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    })
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn run_generate(
    start: &str,
    end: &str,
    states: Vec<String>,
    categories: Vec<String>,
    seed: Option<u64>,
    check_connectivity: bool,
    output: Option<&Path>,
) -> Result<()> {
    let request = GenerationRequest::new(parse_date(start)?, parse_date(end)?)
        .with_states(states.iter().map(|s| State::new(s.as_str())).collect())
        .with_categories(categories.iter().map(|c| Category::from(c.as_str())).collect());

    let probe: Box<dyn ConnectivityProbe> = if check_connectivity {
        Box::new(HttpProbe::new(DEFAULT_PROBE_URL, DEFAULT_PROBE_TIMEOUT)?)
    } else {
        Box::new(AssumeOnline)
    };
    let generator = SyntheticGenerator::new(GeneratorConfig {
        seed,
        ..GeneratorConfig::default()
    });

    let rows = collect_data(probe.as_ref(), &generator, &request)?;
    write_raw_csv(&rows, open_output(output)?)?;
    if let Some(path) = output {
        info!(rows = rows.len(), path = %path.display(), "wrote raw table");
    }
    Ok(())
}

fn run_full(config: &PipelineConfig) -> Result<()> {
    let output = run_pipeline(config)?;
    print_summary(&output);

    let run_dir = save_artifacts(&output, &config.output.dir, config.output.write_parquet)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn run_process(input: &Path, output: Option<&Path>) -> Result<()> {
    let raw = read_raw_csv(open_input(input)?)
        .with_context(|| format!("failed to read raw table {}", input.display()))?;
    let processed = process(&raw);
    write_processed_csv(&processed, open_output(output)?)?;
    info!(rows = processed.len(), "processed raw table");
    Ok(())
}

fn run_summarize(input: &Path) -> Result<()> {
    let records = read_summary_csv(open_input(input)?)
        .with_context(|| format!("failed to read processed table {}", input.display()))?;
    let summary = engine::summarize_records(&records);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn print_summary(output: &PipelineOutput) {
    let r = &output.report;
    println!("=== Run Summary ===");
    if let Some(request) = &r.request {
        println!("Period:            {} to {}", request.start, request.end);
    }
    if let Some(seed) = r.seed {
        println!("Seed:              {seed}");
    }
    println!("Rows:              {}", r.processed_rows);
    println!(
        "Registrations:     {}",
        format_number(r.kpis.total_registrations as f64, 1)
    );
    println!("Total YoY growth:  {:.2}%", r.summary.total_yoy_growth);
    println!(
        "Top category:      {} ({:.2}%)",
        r.summary.top_growing_category, r.summary.top_growth_rate
    );
    println!(
        "Leading category:  {} ({:.1}% share)",
        r.kpis.leading_category.as_deref().unwrap_or("N/A"),
        r.kpis.leading_category_share
    );
    println!("Completeness:      {:.2}%", r.quality.completeness_percentage);
    println!("Dataset hash:      {}", r.dataset_hash);
    println!();
}

//! Pipeline configuration, loaded from TOML.
//!
//! ```toml
//! [data]
//! start = "2023-01-01"
//! end = "2024-12-31"
//! states = ["Delhi", "Karnataka"]   # empty = default five states
//! categories = ["2W", "4W"]          # empty = 2W, 3W, 4W
//! manufacturers = []                 # empty = no manufacturer filter
//!
//! [generator]
//! noise_std_dev = 0.1
//! seed = 42
//!
//! [connectivity]
//! enabled = false
//!
//! [output]
//! dir = "results"
//! ```
//!
//! Every section and field is optional; missing ones take the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use reglab_core::domain::{Category, State};
use reglab_core::generator::{
    profile::GROWTH_BASE_YEAR, GenerationRequest, GeneratorConfig, DEFAULT_PROBE_URL,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub states: Vec<String>,
    pub categories: Vec<String>,
    /// Restrict KPIs and insights to these manufacturers.
    pub manufacturers: Vec<String>,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            states: Vec::new(),
            categories: Vec::new(),
            manufacturers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSection {
    pub noise_std_dev: f64,
    pub base_year: i32,
    pub seed: Option<u64>,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            noise_std_dev: 0.1,
            base_year: GROWTH_BASE_YEAR,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivitySection {
    /// Run the HTTP pre-check before generating.
    pub enabled: bool,
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for ConnectivitySection {
    fn default() -> Self {
        Self {
            enabled: false,
            url: DEFAULT_PROBE_URL.to_string(),
            timeout_secs: 5,
        }
    }
}

impl ConnectivitySection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,
    pub write_parquet: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
            write_parquet: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataSection,
    pub generator: GeneratorSection,
    pub connectivity: ConnectivitySection,
    pub output: OutputSection,
}

impl PipelineConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// A reversed date range is allowed and yields an empty table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sd = self.generator.noise_std_dev;
        if !sd.is_finite() || sd < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "generator.noise_std_dev must be finite and >= 0, got {sd}"
            )));
        }
        if self.connectivity.enabled {
            if self.connectivity.url.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "connectivity.url must not be empty when the check is enabled".into(),
                ));
            }
            if self.connectivity.timeout_secs == 0 {
                return Err(ConfigError::Invalid(
                    "connectivity.timeout_secs must be > 0".into(),
                ));
            }
        }
        if self.data.states.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid("data.states contains an empty name".into()));
        }
        if self.data.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "data.categories contains an empty label".into(),
            ));
        }
        Ok(())
    }

    pub fn generation_request(&self) -> GenerationRequest {
        GenerationRequest::new(self.data.start, self.data.end)
            .with_states(self.data.states.iter().map(|s| State::new(s.as_str())).collect())
            .with_categories(
                self.data
                    .categories
                    .iter()
                    .map(|c| Category::from(c.trim()))
                    .collect(),
            )
    }

    /// Generator settings with the given resolved seed.
    pub fn generator_config(&self, seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            noise_std_dev: self.generator.noise_std_dev,
            base_year: self.generator.base_year,
            seed: Some(seed),
        }
    }
}

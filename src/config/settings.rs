//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dataset::Split;
use crate::generation::{GenerationConfig, ModelVariant, RunnerOptions};
use crate::metrics::{Aggregation, Metric};
use crate::APP_NAME;

/// Environment variable that fills any empty `api_key`.
pub const API_KEY_ENV: &str = "SUMMEVAL_API_KEY";

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Evaluation dataset
    #[serde(default)]
    pub dataset: DatasetSettings,

    /// Decoding options shared by every model variant
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Concurrency and timeouts for generation calls
    #[serde(default)]
    pub runner: RunnerSettings,

    /// ROUGE scoring options
    #[serde(default)]
    pub scoring: ScoringSettings,

    /// Backends for each model variant
    #[serde(default)]
    pub models: ModelsSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Data directory for the run history database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSettings {
    /// Directory containing `<split>.jsonl` or `<split>.csv`
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    /// Split to evaluate on
    #[serde(default)]
    pub split: Split,

    /// Evaluate only the first N dialogues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// Maximum concurrent generation calls
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout for a single generation call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringSettings {
    /// Porter-stem tokens longer than three characters before matching
    #[serde(default)]
    pub use_stemmer: bool,

    /// Report the batch mean (mean) or every example (per-example)
    #[serde(default)]
    pub aggregation: Aggregation,

    /// Metrics to compute
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsSettings {
    /// Pretrained model without fine-tuning
    #[serde(default = "default_base_model")]
    pub base: ModelSettings,

    /// Fully fine-tuned model
    #[serde(default = "default_full_model")]
    pub full: ModelSettings,

    /// Base model with the LoRA adapter attached
    #[serde(default = "default_adapter_model")]
    pub adapter: ModelSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Generation backend (tgi)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Base URL of the backend
    #[serde(default)]
    pub endpoint: String,

    /// Model name, for reports
    #[serde(default = "default_model_name")]
    pub model: String,

    /// Bearer token (optional)
    #[serde(default)]
    pub api_key: String,
}

// Default value functions

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", APP_NAME, APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/summeval"))
}

fn default_dataset_path() -> PathBuf {
    let mut dir = default_data_dir();
    dir.push("dialogsum");
    dir
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_metrics() -> Vec<Metric> {
    Metric::ALL.to_vec()
}

fn default_provider() -> String {
    "tgi".to_string()
}

fn default_model_name() -> String {
    "google/flan-t5-base".to_string()
}

fn model_at(endpoint: &str, model: &str) -> ModelSettings {
    ModelSettings {
        endpoint: endpoint.to_string(),
        model: model.to_string(),
        ..ModelSettings::default()
    }
}

fn default_base_model() -> ModelSettings {
    model_at("http://127.0.0.1:8080", "google/flan-t5-base")
}

fn default_full_model() -> ModelSettings {
    model_at("http://127.0.0.1:8081", "flan-t5-base-dialogsum-full")
}

fn default_adapter_model() -> ModelSettings {
    model_at("http://127.0.0.1:8082", "flan-t5-base-dialogsum-lora")
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            split: Split::default(),
            limit: None,
        }
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            use_stemmer: false,
            aggregation: Aggregation::default(),
            metrics: default_metrics(),
        }
    }
}

impl Default for ModelsSettings {
    fn default() -> Self {
        Self {
            base: default_base_model(),
            full: default_full_model(),
            adapter: default_adapter_model(),
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: String::new(),
            model: default_model_name(),
            api_key: String::new(),
        }
    }
}

impl ModelsSettings {
    pub fn get(&self, variant: ModelVariant) -> &ModelSettings {
        match variant {
            ModelVariant::Base => &self.base,
            ModelVariant::Full => &self.full,
            ModelVariant::Adapter => &self.adapter,
        }
    }

    fn all_mut(&mut self) -> [&mut ModelSettings; 3] {
        [&mut self.base, &mut self.full, &mut self.adapter]
    }
}

impl RunnerSettings {
    pub fn options(&self) -> RunnerOptions {
        RunnerOptions {
            concurrency: self.concurrency.max(1),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        Self::load_from(&config_path)
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        let Ok(key) = std::env::var(API_KEY_ENV) else {
            return;
        };
        if key.trim().is_empty() {
            return;
        }

        for model in self.models.all_mut() {
            if model.api_key.trim().is_empty() {
                model.api_key = key.clone();
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", APP_NAME, APP_NAME)
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &Path) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the run history database path
    pub fn database_path(&self) -> PathBuf {
        self.general.data_dir.join("summeval.db")
    }
}

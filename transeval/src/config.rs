use anyhow::{Context as _, Result};
use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use transeval_core::{MetricId, MetricsConfig, ValidationMode};
use transeval_workflow::DEFAULT_OUTPUT_PATH;
use validator::Validate;

/// Environment variable prefix, e.g. `TRANSEVAL_OUTPUT_PATH` or
/// `TRANSEVAL_BLEU__MAX_ORDER`.
pub const ENV_PREFIX: &str = "TRANSEVAL";

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    pub output_path: PathBuf,
    /// Metrics to run, in column order
    #[validate(length(min = 1))]
    pub metrics: Vec<MetricId>,
    pub validation_mode: ValidationMode,
    pub log_level: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub scoring: MetricsConfig,
}

impl Config {
    /// Layered load: `config/default`, `config/local`, the explicit file if
    /// any, then `TRANSEVAL_*` environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("metrics")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            metrics: MetricId::ALL.to_vec(),
            validation_mode: ValidationMode::default(),
            log_level: "info".to_string(),
            scoring: MetricsConfig::default(),
        }
    }
}

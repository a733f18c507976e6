use anyhow::{Context as _, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use transeval_core::{Corpus, MetricId, Reference, ValidationMode};
use transeval_metrics::MetricRegistry;
use transeval_workflow::TranslationEvaluator;

mod config;
mod summary;

/// Score machine translation output sentence by sentence.
#[derive(Debug, Parser)]
#[command(name = "transeval", version, about)]
struct Cli {
    /// JSON corpus document with `predictions` and `references`; the
    /// built-in sample corpus is scored when omitted
    #[arg(long, value_name = "FILE")]
    corpus: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Metrics to run, in column order (comma-separated: bleu,meteor,ter,rouge)
    #[arg(short, long, value_delimiter = ',')]
    metrics: Option<Vec<MetricId>>,

    /// Require the same number of references on every row
    #[arg(long)]
    strict: bool,

    /// Additional configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip the summary table
    #[arg(long)]
    no_summary: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::Config::load(cli.config.as_deref())?;
    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }
    if let Some(metrics) = &cli.metrics {
        config.metrics = metrics.clone();
    }
    if cli.strict {
        config.validation_mode = ValidationMode::Strict;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    tracing::debug!(?config, "configuration loaded");

    let corpus = match &cli.corpus {
        Some(path) => load_corpus(path)?,
        None => {
            tracing::info!("no corpus given, scoring the sample corpus");
            sample_corpus()
        }
    };

    let registry = MetricRegistry::from_ids(&config.metrics, &config.scoring)
        .context("Failed to set up metrics")?;

    let mut evaluator = TranslationEvaluator::new(corpus, registry, config.validation_mode)
        .context("Input validation failed")?
        .with_output_path(&config.output_path);

    evaluator.compute_scores().await;
    let path = evaluator
        .save_to_csv()
        .with_context(|| format!("Failed to write {}", config.output_path.display()))?;

    if !cli.no_summary {
        summary::print_summary(evaluator.report());
    }

    println!("Results saved to {}", path.display());
    Ok(())
}

fn load_corpus(path: &Path) -> Result<Corpus> {
    let document = fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus from {}", path.display()))?;
    let corpus = Corpus::from_json_str(&document)
        .with_context(|| format!("Failed to parse corpus from {}", path.display()))?;

    tracing::info!(rows = corpus.len(), path = %path.display(), "corpus loaded");
    Ok(corpus)
}

/// Two Korean sentence pairs: one exact match, one paraphrase.
fn sample_corpus() -> Corpus {
    Corpus::new(
        vec![
            "이것은 예시 번역입니다.".to_string(),
            "또 다른 예시 번역입니다.".to_string(),
        ],
        vec![
            Reference::from(vec!["이것은 예시 번역입니다."]),
            Reference::from(vec!["이것은 또 다른 예시입니다."]),
        ],
    )
}

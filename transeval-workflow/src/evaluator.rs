use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use transeval_core::{
    Corpus, InputValidator, MetricFailure, MetricInput, Reference, Result, ScoreRow,
    ValidationMode,
};
use transeval_metrics::MetricRegistry;

use crate::writer::ResultWriter;

/// Output file used when the caller does not name one.
pub const DEFAULT_OUTPUT_PATH: &str = "evaluation_results.csv";

/// Rows and recovered failures of one scoring pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub rows: Vec<ScoreRow>,
    pub failures: Vec<MetricFailure>,
}

/// Score one corpus position with every registered metric.
///
/// A scorer error nulls that scorer's fields on this row and is returned as
/// a [`MetricFailure`]; it never aborts the row.
pub async fn score_row(
    registry: &MetricRegistry,
    index: usize,
    prediction: &str,
    reference: &Reference,
) -> (ScoreRow, Vec<MetricFailure>) {
    let resolved = reference.resolve();
    let mut row = ScoreRow::new(index, &resolved, prediction);
    let mut failures = Vec::new();
    let input = MetricInput::new(prediction, resolved.candidates);

    for scorer in registry.iter() {
        let metric = scorer.id();
        match scorer.compute(&input).await {
            Ok(result) => {
                tracing::trace!(row = index, metric = %metric, metadata = %result.metadata, "scored");
                for (column, value) in result.columns(metric) {
                    row.set(column, Some(value));
                }
            }
            Err(err) => {
                if err.is_fatal() {
                    tracing::error!(row = index, metric = %metric, error = %err, "metric backend error");
                } else {
                    tracing::warn!(row = index, metric = %metric, error = %err, "metric computation failed");
                }
                for column in scorer.fields() {
                    row.set(column, None);
                }
                failures.push(MetricFailure {
                    metric,
                    row: index,
                    message: err.to_string(),
                });
            }
        }
    }

    (row, failures)
}

/// Score every corpus position in input order.
pub async fn score_corpus(corpus: &Corpus, registry: &MetricRegistry) -> EvaluationReport {
    let mut report = EvaluationReport::default();

    for (index, prediction, reference) in corpus.iter() {
        let (row, failures) = score_row(registry, index, prediction, reference).await;
        report.rows.push(row);
        report.failures.extend(failures);
        tracing::debug!(row = index, total = corpus.len(), "row scored");
    }

    report
}

/// Validates a corpus up front, scores it and persists the table.
#[derive(Debug)]
pub struct TranslationEvaluator {
    corpus: Corpus,
    registry: MetricRegistry,
    output_path: PathBuf,
    report: EvaluationReport,
}

impl TranslationEvaluator {
    /// Fails with `InvalidInput` before any scoring when the corpus shape
    /// is wrong.
    pub fn new(corpus: Corpus, registry: MetricRegistry, mode: ValidationMode) -> Result<Self> {
        let validator = InputValidator::new(mode);
        validator.validate(&corpus)?;

        tracing::info!(
            rows = corpus.len(),
            metrics = ?registry.ids(),
            validation = %validator.mode(),
            "evaluator ready"
        );

        Ok(Self {
            corpus,
            registry,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            report: EvaluationReport::default(),
        })
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Score the corpus, replacing the results of any earlier pass.
    pub async fn compute_scores(&mut self) -> &[ScoreRow] {
        self.report = score_corpus(&self.corpus, &self.registry).await;

        if !self.report.failures.is_empty() {
            tracing::warn!(
                failures = self.report.failures.len(),
                "some metric computations failed and were left empty"
            );
        }

        &self.report.rows
    }

    pub fn results(&self) -> &[ScoreRow] {
        &self.report.rows
    }

    pub fn failures(&self) -> &[MetricFailure] {
        &self.report.failures
    }

    pub fn report(&self) -> &EvaluationReport {
        &self.report
    }

    /// Write the results table and return its absolute path.
    pub fn save_to_csv(&self) -> Result<PathBuf> {
        ResultWriter::new(&self.output_path)
            .with_columns(self.registry.fields())
            .write(&self.report.rows)
    }
}

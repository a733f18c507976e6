use serde::{Deserialize, Serialize};

use super::corpus::ResolvedReference;
use super::ids::MetricId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricInput {
    pub predicted: String,
    pub references: Vec<String>,
}

impl MetricInput {
    pub fn new(predicted: impl Into<String>, references: Vec<String>) -> Self {
        Self {
            predicted: predicted.into(),
            references,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Scalar(f64),
    /// Named sub-scores, in the order the scorer declares its fields
    Components(Vec<(String, f64)>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub value: ScoreValue,
    pub metadata: serde_json::Value,
}

impl ScoreResult {
    pub fn scalar(score: f64, metadata: serde_json::Value) -> Self {
        Self {
            value: ScoreValue::Scalar(score),
            metadata,
        }
    }

    pub fn components(components: Vec<(String, f64)>, metadata: serde_json::Value) -> Self {
        Self {
            value: ScoreValue::Components(components),
            metadata,
        }
    }

    /// Column/value pairs this result contributes to a row.
    pub fn columns(&self, metric: MetricId) -> Vec<(String, f64)> {
        match &self.value {
            ScoreValue::Scalar(score) => vec![(metric.column(None), *score)],
            ScoreValue::Components(parts) => parts
                .iter()
                .map(|(key, score)| (metric.column(Some(key.as_str())), *score))
                .collect(),
        }
    }
}

/// One output record per corpus position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub index: usize,
    pub sentence_references: String,
    pub sentence_predictions: String,
    /// Metric columns in registration order; `None` marks a failed metric
    pub scores: Vec<(String, Option<f64>)>,
}

impl ScoreRow {
    pub fn new(index: usize, reference: &ResolvedReference, prediction: &str) -> Self {
        Self {
            index,
            sentence_references: reference.display.clone(),
            sentence_predictions: prediction.to_string(),
            scores: Vec::new(),
        }
    }

    /// Set a metric column, replacing an earlier value for the same column.
    pub fn set(&mut self, column: impl Into<String>, value: Option<f64>) {
        let column = column.into();
        match self.scores.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.scores.push((column, value)),
        }
    }

    /// `None` when the column is absent, `Some(None)` when it was nulled.
    pub fn get(&self, column: &str) -> Option<Option<f64>> {
        self.scores
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| *value)
    }

    pub fn metric_columns(&self) -> impl Iterator<Item = &str> {
        self.scores.iter().map(|(name, _)| name.as_str())
    }
}

/// A (metric, row) computation that failed and was nulled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricFailure {
    pub metric: MetricId,
    pub row: usize,
    pub message: String,
}

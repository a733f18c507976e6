use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use transeval_core::{
    BleuConfig, EvalError, MetricId, MetricInput, Result, ScoreResult, Scorer,
};

use super::{ngram_counts, require_references};
use crate::tokenize::tokenize_13a;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMethod {
    None,
    /// Add one to both numerator and denominator of every order
    Add1,
}

/// Sentence BLEU with its intermediate statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BleuScore {
    pub bleu: f64,
    pub precisions: Vec<f64>,
    pub brevity_penalty: f64,
    pub length_ratio: f64,
    pub translation_length: usize,
    pub reference_length: usize,
}

#[derive(Debug, Clone)]
pub struct BleuCalculator {
    pub max_n: usize,
    pub smoothing: SmoothingMethod,
    pub lowercase: bool,
}

impl BleuCalculator {
    pub fn new(max_n: usize) -> Self {
        Self {
            max_n,
            smoothing: SmoothingMethod::None,
            lowercase: false,
        }
    }

    pub fn from_config(config: &BleuConfig) -> Self {
        let smoothing = if config.smooth {
            SmoothingMethod::Add1
        } else {
            SmoothingMethod::None
        };
        Self::new(config.max_order)
            .with_smoothing(smoothing)
            .with_lowercase(config.lowercase)
    }

    pub fn with_smoothing(mut self, smoothing: SmoothingMethod) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        if self.lowercase {
            tokenize_13a(&text.to_lowercase())
        } else {
            tokenize_13a(text)
        }
    }

    /// Per-n-gram maximum count over all references
    fn max_reference_counts<'a>(
        &self,
        references: &'a [Vec<String>],
        n: usize,
    ) -> HashMap<&'a [String], usize> {
        let mut merged: HashMap<&[String], usize> = HashMap::new();
        for reference in references {
            for (ngram, count) in ngram_counts(reference, n) {
                let slot = merged.entry(ngram).or_insert(0);
                *slot = (*slot).max(count);
            }
        }
        merged
    }

    /// Calculate precision for a given n
    fn modified_precision(
        &self,
        predicted: &[String],
        references: &[Vec<String>],
        n: usize,
    ) -> f64 {
        let pred_counts = ngram_counts(predicted, n);
        let ref_counts = self.max_reference_counts(references, n);

        let clipped_count: usize = pred_counts
            .iter()
            .map(|(ngram, pred_count)| (*pred_count).min(*ref_counts.get(ngram).unwrap_or(&0)))
            .sum();
        let total_count = predicted.len().saturating_sub(n - 1);

        match self.smoothing {
            SmoothingMethod::Add1 => (clipped_count as f64 + 1.0) / (total_count as f64 + 1.0),
            SmoothingMethod::None if total_count > 0 => clipped_count as f64 / total_count as f64,
            SmoothingMethod::None => 0.0,
        }
    }

    /// Calculate brevity penalty
    fn brevity_penalty(&self, length_ratio: f64) -> f64 {
        if length_ratio > 1.0 {
            1.0
        } else {
            (1.0 - 1.0 / length_ratio).exp()
        }
    }

    /// Calculate BLEU of one prediction against one or more references
    pub fn calculate_bleu(&self, predicted: &str, references: &[String]) -> Result<BleuScore> {
        let pred_tokens = self.tokenize(predicted);
        if pred_tokens.is_empty() {
            return Err(EvalError::metric(
                MetricId::Bleu.as_str(),
                "prediction has no tokens, length ratio is undefined",
            ));
        }

        let ref_tokens: Vec<Vec<String>> = references.iter().map(|r| self.tokenize(r)).collect();
        let reference_length = ref_tokens.iter().map(Vec::len).min().unwrap_or(0);
        let translation_length = pred_tokens.len();

        let precisions: Vec<f64> = (1..=self.max_n)
            .map(|n| self.modified_precision(&pred_tokens, &ref_tokens, n))
            .collect();

        // If any precision is 0, BLEU is 0
        let geometric_mean = if precisions.iter().all(|p| *p > 0.0) {
            (precisions.iter().map(|p| p.ln()).sum::<f64>() / self.max_n as f64).exp()
        } else {
            0.0
        };

        let length_ratio = if reference_length == 0 {
            f64::INFINITY
        } else {
            translation_length as f64 / reference_length as f64
        };
        let brevity_penalty = self.brevity_penalty(length_ratio);

        Ok(BleuScore {
            bleu: geometric_mean * brevity_penalty,
            precisions,
            brevity_penalty,
            length_ratio,
            translation_length,
            reference_length,
        })
    }
}

impl Default for BleuCalculator {
    fn default() -> Self {
        Self::new(4)
    }
}

#[async_trait]
impl Scorer for BleuCalculator {
    fn id(&self) -> MetricId {
        MetricId::Bleu
    }

    async fn compute(&self, input: &MetricInput) -> Result<ScoreResult> {
        require_references(self.id(), input)?;
        let score = self.calculate_bleu(&input.predicted, &input.references)?;

        Ok(ScoreResult::scalar(
            score.bleu,
            json!({
                "metric": "bleu",
                "max_n": self.max_n,
                "smoothing": self.smoothing,
                "precisions": score.precisions,
                "brevity_penalty": score.brevity_penalty,
                "translation_length": score.translation_length,
                "reference_length": score.reference_length,
            }),
        ))
    }
}

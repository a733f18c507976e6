use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use transeval_core::{MetricId, MetricInput, Result, RougeConfig, RougeType, ScoreResult, Scorer};

use super::{f_measure, ngram_counts, require_references};
use crate::tokenize::tokenize_alphanumeric;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RougeScore {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl RougeScore {
    fn from_counts(hits: usize, predicted_total: usize, reference_total: usize) -> Self {
        let precision = hits as f64 / predicted_total.max(1) as f64;
        let recall = hits as f64 / reference_total.max(1) as f64;
        Self {
            precision,
            recall,
            fmeasure: f_measure(precision, recall),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RougeCalculator {
    pub rouge_types: Vec<RougeType>,
}

impl RougeCalculator {
    pub fn new(rouge_types: Vec<RougeType>) -> Self {
        Self { rouge_types }
    }

    pub fn from_config(config: &RougeConfig) -> Self {
        Self::new(config.rouge_types.clone())
    }

    pub fn rouge_1() -> Self {
        Self::new(vec![RougeType::N(1)])
    }

    pub fn rouge_2() -> Self {
        Self::new(vec![RougeType::N(2)])
    }

    pub fn rouge_l() -> Self {
        Self::new(vec![RougeType::L])
    }

    /// Calculate ROUGE-N score
    fn rouge_n(&self, predicted: &[String], reference: &[String], n: usize) -> RougeScore {
        let pred_counts = ngram_counts(predicted, n);
        let ref_counts = ngram_counts(reference, n);

        let overlap: usize = ref_counts
            .iter()
            .filter_map(|(ngram, ref_count)| {
                pred_counts.get(ngram).map(|pred_count| (*pred_count).min(*ref_count))
            })
            .sum();

        RougeScore::from_counts(
            overlap,
            pred_counts.values().sum(),
            ref_counts.values().sum(),
        )
    }

    /// Dynamic-programming table of LCS lengths for every prefix pair
    fn lcs_table(text1: &[String], text2: &[String]) -> Vec<Vec<usize>> {
        let m = text1.len();
        let n = text2.len();
        let mut dp = vec![vec![0; n + 1]; m + 1];

        for i in 1..=m {
            for j in 1..=n {
                if text1[i - 1] == text2[j - 1] {
                    dp[i][j] = dp[i - 1][j - 1] + 1;
                } else {
                    dp[i][j] = dp[i - 1][j].max(dp[i][j - 1]);
                }
            }
        }

        dp
    }

    /// Positions in `reference` that take part in one LCS with `predicted`.
    /// Ties step back along the reference first.
    fn lcs_reference_positions(reference: &[String], predicted: &[String]) -> Vec<usize> {
        let dp = Self::lcs_table(reference, predicted);
        let (mut i, mut j) = (reference.len(), predicted.len());
        let mut positions = Vec::new();

        while i > 0 && j > 0 {
            if reference[i - 1] == predicted[j - 1] {
                positions.push(i - 1);
                i -= 1;
                j -= 1;
            } else if dp[i][j - 1] > dp[i - 1][j] {
                j -= 1;
            } else {
                i -= 1;
            }
        }

        positions.reverse();
        positions
    }

    /// Calculate ROUGE-L score (based on longest common subsequence)
    fn calculate_rouge_l(&self, predicted: &[String], reference: &[String]) -> RougeScore {
        if predicted.is_empty() || reference.is_empty() {
            return RougeScore::default();
        }

        let lcs_len = Self::lcs_table(reference, predicted)[reference.len()][predicted.len()];
        RougeScore::from_counts(lcs_len, predicted.len(), reference.len())
    }

    /// Summary-level ROUGE-L: union LCS of every reference sentence against
    /// all predicted sentences, with each token credited at most as often as
    /// it occurs on both sides.
    fn calculate_rouge_lsum(&self, predicted: &str, reference: &str) -> RougeScore {
        let pred_sentences = Self::sentences(predicted);
        let ref_sentences = Self::sentences(reference);

        let pred_total: usize = pred_sentences.iter().map(Vec::len).sum();
        let ref_total: usize = ref_sentences.iter().map(Vec::len).sum();
        if pred_total == 0 || ref_total == 0 {
            return RougeScore::default();
        }

        let mut pred_budget = Self::token_counts(&pred_sentences);
        let mut ref_budget = Self::token_counts(&ref_sentences);
        let mut hits = 0;

        for ref_sentence in &ref_sentences {
            let union: BTreeSet<usize> = pred_sentences
                .iter()
                .flat_map(|pred_sentence| Self::lcs_reference_positions(ref_sentence, pred_sentence))
                .collect();

            for position in union {
                let token = ref_sentence[position].as_str();
                let (Some(pred_left), Some(ref_left)) =
                    (pred_budget.get(token).copied(), ref_budget.get(token).copied())
                else {
                    continue;
                };
                if pred_left > 0 && ref_left > 0 {
                    hits += 1;
                    pred_budget.insert(token, pred_left - 1);
                    ref_budget.insert(token, ref_left - 1);
                }
            }
        }

        RougeScore::from_counts(hits, pred_total, ref_total)
    }

    fn sentences(text: &str) -> Vec<Vec<String>> {
        text.lines()
            .map(tokenize_alphanumeric)
            .filter(|tokens| !tokens.is_empty())
            .collect()
    }

    fn token_counts(sentences: &[Vec<String>]) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for token in sentences.iter().flatten() {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Score one ROUGE type against a single reference
    pub fn score_type(&self, rouge_type: RougeType, predicted: &str, reference: &str) -> RougeScore {
        match rouge_type {
            RougeType::N(n) => self.rouge_n(
                &tokenize_alphanumeric(predicted),
                &tokenize_alphanumeric(reference),
                n,
            ),
            RougeType::L => self.calculate_rouge_l(
                &tokenize_alphanumeric(predicted),
                &tokenize_alphanumeric(reference),
            ),
            RougeType::LSum => self.calculate_rouge_lsum(predicted, reference),
        }
    }

    /// Every configured type, each keeping the reference with the best
    /// F-measure
    pub fn calculate_rouge(
        &self,
        predicted: &str,
        references: &[String],
    ) -> Vec<(RougeType, RougeScore)> {
        self.rouge_types
            .iter()
            .map(|&rouge_type| {
                let best = references
                    .iter()
                    .map(|reference| self.score_type(rouge_type, predicted, reference))
                    .fold(None::<RougeScore>, |best, score| match best {
                        Some(current) if current.fmeasure >= score.fmeasure => Some(current),
                        _ => Some(score),
                    })
                    .unwrap_or_default();
                (rouge_type, best)
            })
            .collect()
    }
}

impl Default for RougeCalculator {
    fn default() -> Self {
        Self::from_config(&RougeConfig::default())
    }
}

#[async_trait]
impl Scorer for RougeCalculator {
    fn id(&self) -> MetricId {
        MetricId::Rouge
    }

    fn fields(&self) -> Vec<String> {
        self.rouge_types
            .iter()
            .map(|rouge_type| self.id().column(Some(rouge_type.key().as_str())))
            .collect()
    }

    async fn compute(&self, input: &MetricInput) -> Result<ScoreResult> {
        require_references(self.id(), input)?;
        let scores = self.calculate_rouge(&input.predicted, &input.references);

        let details: serde_json::Map<String, serde_json::Value> = scores
            .iter()
            .map(|(rouge_type, score)| (rouge_type.key(), json!(score)))
            .collect();

        Ok(ScoreResult::components(
            scores
                .iter()
                .map(|(rouge_type, score)| (rouge_type.key(), score.fmeasure))
                .collect(),
            json!({
                "metric": "rouge",
                "scores": details,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_lcs_reference_positions() {
        let positions =
            RougeCalculator::lcs_reference_positions(&tokens("a b c d e"), &tokens("a c e"));
        assert_eq!(positions, vec![0, 2, 4]);
    }

    #[test]
    fn test_lcs_positions_tie_prefers_earlier_reference_token() {
        let positions = RougeCalculator::lcs_reference_positions(&tokens("a b"), &tokens("b a"));
        assert_eq!(positions, vec![0]);
    }

    #[test]
    fn test_lcs_positions_empty() {
        assert!(RougeCalculator::lcs_reference_positions(&tokens("a b"), &[]).is_empty());
    }
}

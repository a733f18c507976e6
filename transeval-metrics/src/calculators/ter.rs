use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use transeval_core::{MetricId, MetricInput, Result, ScoreResult, Scorer, TerConfig};

use super::require_references;
use crate::tokenize::tokenize_whitespace;

/// Edit statistics of one prediction against its references
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerScore {
    /// Edits normalised by the average reference length, times 100
    pub score: f64,
    /// Fewest edits needed against any single reference
    pub num_edits: usize,
    pub ref_length: f64,
}

/// Translation edit rate with greedy block shifts.
#[derive(Debug, Clone)]
pub struct TerCalculator {
    pub case_sensitive: bool,
    pub max_shift_size: usize,
    pub max_shift_distance: usize,
}

impl TerCalculator {
    pub fn from_config(config: &TerConfig) -> Self {
        Self {
            case_sensitive: config.case_sensitive,
            max_shift_size: config.max_shift_size,
            max_shift_distance: config.max_shift_distance,
        }
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize_whitespace(text, !self.case_sensitive)
    }

    /// Word-level Levenshtein distance
    fn edit_distance(hypothesis: &[String], reference: &[String]) -> usize {
        let mut previous: Vec<usize> = (0..=reference.len()).collect();
        let mut current = vec![0; reference.len() + 1];

        for (i, hyp_word) in hypothesis.iter().enumerate() {
            current[0] = i + 1;
            for (j, ref_word) in reference.iter().enumerate() {
                let substitution = previous[j] + usize::from(hyp_word != ref_word);
                current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
            }
            std::mem::swap(&mut previous, &mut current);
        }

        previous[reference.len()]
    }

    /// Move `hypothesis[start..start + len]` so it begins at `dest` in the
    /// sequence left after removing it.
    fn apply_shift(hypothesis: &[String], start: usize, len: usize, dest: usize) -> Vec<String> {
        let mut remainder: Vec<String> = Vec::with_capacity(hypothesis.len());
        remainder.extend_from_slice(&hypothesis[..start]);
        remainder.extend_from_slice(&hypothesis[start + len..]);

        let mut shifted = Vec::with_capacity(hypothesis.len());
        shifted.extend_from_slice(&remainder[..dest]);
        shifted.extend_from_slice(&hypothesis[start..start + len]);
        shifted.extend_from_slice(&remainder[dest..]);
        shifted
    }

    /// The single phrase shift that lowers the edit distance the most, with
    /// the resulting hypothesis and distance.
    fn best_shift(
        &self,
        hypothesis: &[String],
        reference: &[String],
        distance: usize,
    ) -> Option<(Vec<String>, usize)> {
        let mut best: Option<(Vec<String>, usize)> = None;

        for start in 0..hypothesis.len() {
            let longest = self.max_shift_size.min(hypothesis.len() - start);
            for len in 1..=longest {
                let phrase = &hypothesis[start..start + len];

                // already in place
                if reference.get(start..start + len) == Some(phrase) {
                    continue;
                }

                let remaining = hypothesis.len() - len;
                for ref_start in 0..reference.len().saturating_sub(len - 1) {
                    if &reference[ref_start..ref_start + len] != phrase {
                        continue;
                    }

                    let dest = ref_start.min(remaining);
                    if dest == start || dest.abs_diff(start) > self.max_shift_distance {
                        continue;
                    }

                    let candidate = Self::apply_shift(hypothesis, start, len, dest);
                    let candidate_distance = Self::edit_distance(&candidate, reference);
                    let current_best = best.as_ref().map_or(distance, |(_, d)| *d);
                    if candidate_distance < current_best {
                        best = Some((candidate, candidate_distance));
                    }
                }
            }
        }

        best
    }

    /// Shifts plus remaining word edits needed to turn the hypothesis into
    /// the reference
    pub fn count_edits(&self, hypothesis: &[String], reference: &[String]) -> usize {
        let mut current = hypothesis.to_vec();
        let mut distance = Self::edit_distance(&current, reference);
        let mut shifts = 0;

        while let Some((shifted, shifted_distance)) = self.best_shift(&current, reference, distance) {
            current = shifted;
            distance = shifted_distance;
            shifts += 1;
        }

        shifts + distance
    }

    /// TER of one prediction against one or more references
    pub fn calculate_ter(&self, predicted: &str, references: &[String]) -> TerScore {
        let hypothesis = self.tokenize(predicted);
        let reference_tokens: Vec<Vec<String>> =
            references.iter().map(|r| self.tokenize(r)).collect();

        let num_edits = reference_tokens
            .iter()
            .map(|reference| self.count_edits(&hypothesis, reference))
            .min()
            .unwrap_or(0);

        let ref_length = if reference_tokens.is_empty() {
            0.0
        } else {
            reference_tokens.iter().map(Vec::len).sum::<usize>() as f64
                / reference_tokens.len() as f64
        };

        let ratio = if ref_length > 0.0 {
            num_edits as f64 / ref_length
        } else if num_edits > 0 {
            1.0
        } else {
            0.0
        };

        TerScore {
            score: ratio * 100.0,
            num_edits,
            ref_length,
        }
    }
}

impl Default for TerCalculator {
    fn default() -> Self {
        Self::from_config(&TerConfig::default())
    }
}

#[async_trait]
impl Scorer for TerCalculator {
    fn id(&self) -> MetricId {
        MetricId::Ter
    }

    async fn compute(&self, input: &MetricInput) -> Result<ScoreResult> {
        require_references(self.id(), input)?;
        let score = self.calculate_ter(&input.predicted, &input.references);

        tracing::trace!(num_edits = score.num_edits, ref_length = score.ref_length, "ter computed");

        Ok(ScoreResult::scalar(
            score.score,
            json!({
                "metric": "ter",
                "num_edits": score.num_edits,
                "ref_length": score.ref_length,
                "case_sensitive": self.case_sensitive,
            }),
        ))
    }
}

use async_trait::async_trait;
use rust_stemmers::{Algorithm, Stemmer};
use serde_json::json;
use std::sync::OnceLock;
use transeval_core::{MeteorConfig, MetricId, MetricInput, Result, ScoreResult, Scorer};

use super::require_references;
use crate::tokenize::tokenize_13a;

/// METEOR with exact and stem alignment.
///
/// Words are lowercased and aligned greedily from the end of both
/// sentences, first by surface form and then, for the words still unmatched,
/// by English stem. The score combines a recall-weighted harmonic mean with a
/// fragmentation penalty that grows with the number of aligned chunks.
#[derive(Debug, Clone)]
pub struct MeteorCalculator {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub stemming: bool,
}

fn english_stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

impl MeteorCalculator {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            alpha,
            beta,
            gamma,
            stemming: true,
        }
    }

    pub fn from_config(config: &MeteorConfig) -> Self {
        Self::new(config.alpha, config.beta, config.gamma).with_stemming(config.stemming)
    }

    pub fn with_stemming(mut self, stemming: bool) -> Self {
        self.stemming = stemming;
        self
    }

    fn tokenize(text: &str) -> Vec<String> {
        tokenize_13a(&text.to_lowercase())
    }

    /// Pair equal words scanning both sides from the end. Matched entries are
    /// removed from `hyp` and `refs`.
    fn match_words(hyp: &mut Vec<(usize, String)>, refs: &mut Vec<(usize, String)>) -> Vec<(usize, usize)> {
        let mut matches = Vec::new();

        for i in (0..hyp.len()).rev() {
            if let Some(j) = (0..refs.len()).rev().find(|&j| refs[j].1 == hyp[i].1) {
                matches.push((hyp[i].0, refs[j].0));
                hyp.remove(i);
                refs.remove(j);
            }
        }

        matches
    }

    fn stems(words: Vec<(usize, String)>) -> Vec<(usize, String)> {
        let stemmer = english_stemmer();
        words
            .into_iter()
            .map(|(idx, word)| (idx, stemmer.stem(&word).into_owned()))
            .collect()
    }

    /// Align words, returning `(hypothesis_idx, reference_idx)` pairs sorted
    /// by hypothesis position.
    fn align(&self, hypothesis: &[String], reference: &[String]) -> Vec<(usize, usize)> {
        let mut hyp: Vec<(usize, String)> = hypothesis.iter().cloned().enumerate().collect();
        let mut refs: Vec<(usize, String)> = reference.iter().cloned().enumerate().collect();

        let mut matches = Self::match_words(&mut hyp, &mut refs);
        if self.stemming && !hyp.is_empty() && !refs.is_empty() {
            matches.extend(Self::match_words(&mut Self::stems(hyp), &mut Self::stems(refs)));
        }

        matches.sort_unstable_by_key(|&(hyp_idx, _)| hyp_idx);
        matches
    }

    /// Number of runs of alignments adjacent in both sentences
    fn count_chunks(matches: &[(usize, usize)]) -> usize {
        if matches.is_empty() {
            return 0;
        }
        1 + matches
            .windows(2)
            .filter(|pair| !(pair[1].0 == pair[0].0 + 1 && pair[1].1 == pair[0].1 + 1))
            .count()
    }

    /// METEOR against a single reference
    pub fn single_meteor(&self, predicted: &str, reference: &str) -> f64 {
        let hypothesis = Self::tokenize(predicted);
        let reference = Self::tokenize(reference);

        let matches = self.align(&hypothesis, &reference);
        let matches_count = matches.len();
        if matches_count == 0 {
            return 0.0;
        }

        let precision = matches_count as f64 / hypothesis.len() as f64;
        let recall = matches_count as f64 / reference.len() as f64;
        let fmean = precision * recall / (self.alpha * precision + (1.0 - self.alpha) * recall);

        let fragmentation = Self::count_chunks(&matches) as f64 / matches_count as f64;
        let penalty = self.gamma * fragmentation.powf(self.beta);

        (1.0 - penalty) * fmean
    }

    /// Best METEOR over all references
    pub fn calculate_meteor(&self, predicted: &str, references: &[String]) -> f64 {
        references
            .iter()
            .map(|reference| self.single_meteor(predicted, reference))
            .fold(0.0, f64::max)
    }
}

impl Default for MeteorCalculator {
    fn default() -> Self {
        Self::from_config(&MeteorConfig::default())
    }
}

#[async_trait]
impl Scorer for MeteorCalculator {
    fn id(&self) -> MetricId {
        MetricId::Meteor
    }

    async fn compute(&self, input: &MetricInput) -> Result<ScoreResult> {
        require_references(self.id(), input)?;
        let score = self.calculate_meteor(&input.predicted, &input.references);

        Ok(ScoreResult::scalar(
            score,
            json!({
                "metric": "meteor",
                "alpha": self.alpha,
                "beta": self.beta,
                "gamma": self.gamma,
                "stemming": self.stemming,
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
    fn test_align_prefers_later_positions() {
        let matches = MeteorCalculator::default().align(&tokens("the cat the"), &tokens("the dog"));
        assert_eq!(matches, vec![(2, 0)]);
    }

    #[test]
    fn test_align_stems_only_unmatched_words() {
        let calculator = MeteorCalculator::default();
        let matches = calculator.align(&tokens("dogs dog"), &tokens("dog"));
        assert_eq!(matches, vec![(1, 0)]);

        let matches = calculator.align(&tokens("dogs barked"), &tokens("dog barking"));
        assert_eq!(matches, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_count_chunks() {
        assert_eq!(MeteorCalculator::count_chunks(&[]), 0);
        assert_eq!(MeteorCalculator::count_chunks(&[(0, 0), (1, 1), (2, 2)]), 1);
        assert_eq!(MeteorCalculator::count_chunks(&[(0, 2), (1, 0), (2, 1)]), 2);
        assert_eq!(MeteorCalculator::count_chunks(&[(0, 3), (2, 4)]), 2);
    }
}

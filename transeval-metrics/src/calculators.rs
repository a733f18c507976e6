pub mod bleu;
pub mod meteor;
pub mod ter;
pub mod rouge;

pub use bleu::*;
pub use meteor::*;
pub use ter::*;
pub use rouge::*;

use std::collections::HashMap;
use transeval_core::{EvalError, MetricId, MetricInput, Result};

/// Count every n-gram of order `n` in a token sequence.
pub(crate) fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Harmonic mean of precision and recall, zero when both are zero.
pub(crate) fn f_measure(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

pub(crate) fn require_references(metric: MetricId, input: &MetricInput) -> Result<()> {
    if input.references.is_empty() {
        return Err(EvalError::metric(
            metric.as_str(),
            "no reference sentences supplied",
        ));
    }
    Ok(())
}

use crate::domain::{Corpus, Reference, ValidationMode};
use crate::error::{EvalError, Result};

/// Structural checks run once on a corpus before any scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputValidator {
    mode: ValidationMode,
}

impl InputValidator {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn validate(&self, corpus: &Corpus) -> Result<()> {
        self.check_lengths(corpus.predictions(), corpus.references())?;

        if self.mode == ValidationMode::Strict {
            Self::check_reference_counts(corpus.references())?;
        }

        Ok(())
    }

    fn check_lengths(&self, predictions: &[String], references: &[Reference]) -> Result<()> {
        if predictions.len() != references.len() {
            return Err(EvalError::InvalidInput(format!(
                "Predictions and references must have the same length ({} != {}).",
                predictions.len(),
                references.len()
            )));
        }
        Ok(())
    }

    fn check_reference_counts(references: &[Reference]) -> Result<()> {
        let Some(expected) = references.first().map(Reference::len) else {
            return Ok(());
        };

        if let Some((idx, reference)) = references
            .iter()
            .enumerate()
            .find(|(_, reference)| reference.len() != expected)
        {
            return Err(EvalError::InvalidInput(format!(
                "Each reference list must have the same number of sentences \
                 (row 0 has {}, row {} has {}).",
                expected,
                idx,
                reference.len()
            )));
        }

        Ok(())
    }
}

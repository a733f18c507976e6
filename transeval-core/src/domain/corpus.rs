use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EvalError, Result};

/// Separator used when several references are rendered into one cell.
pub const REFERENCE_DELIMITER: &str = " ||| ";

/// Gold translation(s) for one prediction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Reference {
    Single(String),
    Multiple(Vec<String>),
}

impl Reference {
    /// Number of reference sentences carried by this entry.
    pub fn len(&self) -> usize {
        match self {
            Reference::Single(_) => 1,
            Reference::Multiple(refs) => refs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve into the display string and the candidate list scorers consume.
    pub fn resolve(&self) -> ResolvedReference {
        match self {
            Reference::Single(text) => ResolvedReference {
                display: text.clone(),
                candidates: vec![text.clone()],
            },
            Reference::Multiple(refs) => ResolvedReference {
                display: refs.join(REFERENCE_DELIMITER),
                candidates: refs.clone(),
            },
        }
    }
}

impl From<&str> for Reference {
    fn from(value: &str) -> Self {
        Reference::Single(value.to_string())
    }
}

impl From<String> for Reference {
    fn from(value: String) -> Self {
        Reference::Single(value)
    }
}

impl From<Vec<String>> for Reference {
    fn from(value: Vec<String>) -> Self {
        Reference::Multiple(value)
    }
}

impl From<Vec<&str>> for Reference {
    fn from(value: Vec<&str>) -> Self {
        Reference::Multiple(value.into_iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// Human-readable rendering for the results table
    pub display: String,
    /// Reference sentences handed to the scorers
    pub candidates: Vec<String>,
}

/// Aligned predictions and references for one evaluation run.
///
/// Construction does not check alignment; run the corpus through
/// [`InputValidator`](crate::validation::InputValidator) before scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Corpus {
    predictions: Vec<String>,
    references: Vec<Reference>,
}

impl Corpus {
    pub fn new(predictions: Vec<String>, references: Vec<Reference>) -> Self {
        Self {
            predictions,
            references,
        }
    }

    /// Decode a corpus document of the form
    /// `{"predictions": [...], "references": [...]}` where every reference
    /// is a string or an array of strings.
    pub fn from_json_str(document: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(document)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            EvalError::InvalidInput("Corpus document must be a JSON object.".to_string())
        })?;

        let (Some(Value::Array(predictions)), Some(Value::Array(references))) =
            (object.get("predictions"), object.get("references"))
        else {
            return Err(EvalError::InvalidInput(
                "Predictions and references should be lists.".to_string(),
            ));
        };

        let predictions = predictions
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    EvalError::InvalidInput(format!("Prediction {} is not a string.", idx))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let references = references
            .iter()
            .enumerate()
            .map(|(idx, item)| decode_reference(idx, item))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(predictions, references))
    }

    pub fn predictions(&self) -> &[String] {
        &self.predictions
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Aligned `(index, prediction, reference)` triples in input order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &Reference)> {
        self.predictions
            .iter()
            .zip(self.references.iter())
            .enumerate()
            .map(|(idx, (pred, reference))| (idx, pred.as_str(), reference))
    }
}

fn decode_reference(idx: usize, item: &Value) -> Result<Reference> {
    match item {
        Value::String(text) => Ok(Reference::Single(text.clone())),
        Value::Array(items) => items
            .iter()
            .map(|inner| {
                inner.as_str().map(str::to_string).ok_or_else(|| {
                    EvalError::InvalidInput(format!(
                        "Reference {} contains a non-string entry.",
                        idx
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Reference::Multiple),
        _ => Err(EvalError::InvalidInput(format!(
            "Reference {} must be a string or a list of strings.",
            idx
        ))),
    }
}

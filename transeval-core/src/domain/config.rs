use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::EvalError;

// ===== Input Validation =====

/// How strictly the reference side of a corpus is checked before scoring
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Every row must carry the same number of reference sentences.
    Strict,
    /// Rows may carry any number of references.
    #[default]
    Lenient,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

// ===== BLEU =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct BleuConfig {
    #[validate(range(min = 1, max = 9))]
    pub max_order: usize,
    /// Add-one smoothing on every n-gram order
    pub smooth: bool,
    pub lowercase: bool,
}

impl Default for BleuConfig {
    fn default() -> Self {
        Self {
            max_order: 4,
            smooth: false,
            lowercase: false,
        }
    }
}

// ===== METEOR =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct MeteorConfig {
    /// Relative weight of precision against recall
    #[validate(range(min = 0.0, max = 1.0))]
    pub alpha: f64,
    /// Shape of the fragmentation penalty
    #[validate(range(min = 0.0))]
    pub beta: f64,
    /// Upper bound of the fragmentation penalty
    #[validate(range(min = 0.0, max = 1.0))]
    pub gamma: f64,
    /// Align words left unmatched by surface form on their English stems
    pub stemming: bool,
}

impl Default for MeteorConfig {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            beta: 3.0,
            gamma: 0.5,
            stemming: true,
        }
    }
}

// ===== TER =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct TerConfig {
    pub case_sensitive: bool,
    #[validate(range(min = 1))]
    pub max_shift_size: usize,
    pub max_shift_distance: usize,
}

impl Default for TerConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            max_shift_size: 10,
            max_shift_distance: 50,
        }
    }
}

// ===== ROUGE =====

/// A ROUGE flavour, written the way it appears in column names
/// (`rouge1`, `rouge2`, `rougeL`, `rougeLsum`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RougeType {
    /// n-gram overlap of the given order
    N(usize),
    /// Longest common subsequence over the whole text
    L,
    /// Union LCS over newline-separated sentences
    LSum,
}

impl RougeType {
    pub fn key(&self) -> String {
        match self {
            RougeType::N(n) => format!("rouge{}", n),
            RougeType::L => "rougeL".to_string(),
            RougeType::LSum => "rougeLsum".to_string(),
        }
    }
}

impl fmt::Display for RougeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for RougeType {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rougeL" => Ok(RougeType::L),
            "rougeLsum" => Ok(RougeType::LSum),
            other => other
                .strip_prefix("rouge")
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| (1..=9).contains(n))
                .map(RougeType::N)
                .ok_or_else(|| EvalError::Config(format!("Unknown ROUGE type: {}", other))),
        }
    }
}

impl TryFrom<String> for RougeType {
    type Error = EvalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RougeType> for String {
    fn from(value: RougeType) -> Self {
        value.key()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct RougeConfig {
    #[validate(length(min = 1))]
    pub rouge_types: Vec<RougeType>,
}

impl Default for RougeConfig {
    fn default() -> Self {
        Self {
            rouge_types: vec![RougeType::N(1), RougeType::N(2), RougeType::L, RougeType::LSum],
        }
    }
}

// ===== All Metrics =====

/// Per-metric tuning, one section per backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct MetricsConfig {
    #[validate(nested)]
    pub bleu: BleuConfig,
    #[validate(nested)]
    pub meteor: MeteorConfig,
    #[validate(nested)]
    pub ter: TerConfig,
    #[validate(nested)]
    pub rouge: RougeConfig,
}

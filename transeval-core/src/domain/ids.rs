use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EvalError;

/// Prefix shared by every metric column in the results table.
pub const METRIC_COLUMN_PREFIX: &str = "Metric_";

/// Identifier of a registered metric backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MetricId {
    Bleu,
    Meteor,
    Ter,
    Rouge,
}

impl MetricId {
    /// Every metric, in the default registration order.
    pub const ALL: [MetricId; 4] = [
        MetricId::Bleu,
        MetricId::Meteor,
        MetricId::Ter,
        MetricId::Rouge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricId::Bleu => "bleu",
            MetricId::Meteor => "meteor",
            MetricId::Ter => "ter",
            MetricId::Rouge => "rouge",
        }
    }

    /// Column name for this metric, or for one of its sub-scores.
    pub fn column(&self, subkey: Option<&str>) -> String {
        match subkey {
            Some(key) => format!("{}{}_{}", METRIC_COLUMN_PREFIX, self.as_str(), key),
            None => format!("{}{}", METRIC_COLUMN_PREFIX, self.as_str()),
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricId {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bleu" => Ok(MetricId::Bleu),
            "meteor" => Ok(MetricId::Meteor),
            "ter" => Ok(MetricId::Ter),
            "rouge" => Ok(MetricId::Rouge),
            other => Err(EvalError::Config(format!("Unknown metric: {}", other))),
        }
    }
}

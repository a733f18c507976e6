use async_trait::async_trait;

use crate::domain::{MetricId, MetricInput, ScoreResult};
use crate::error::Result;

/// A metric backend scoring one prediction against its candidate references.
#[async_trait]
pub trait Scorer: Send + Sync {
    fn id(&self) -> MetricId;

    /// Output columns this scorer fills, in order. A failed computation
    /// nulls every one of them.
    fn fields(&self) -> Vec<String> {
        vec![self.id().column(None)]
    }

    async fn compute(&self, input: &MetricInput) -> Result<ScoreResult>;
}

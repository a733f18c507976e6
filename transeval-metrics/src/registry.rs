use std::sync::Arc;
use transeval_core::{EvalError, MetricId, MetricsConfig, Result, Scorer};

use crate::calculators::{BleuCalculator, MeteorCalculator, RougeCalculator, TerCalculator};

/// Ordered, immutable set of scorers used for one run.
#[derive(Clone)]
pub struct MetricRegistry {
    scorers: Vec<Arc<dyn Scorer>>,
}

impl MetricRegistry {
    pub fn builder() -> MetricRegistryBuilder {
        MetricRegistryBuilder::default()
    }

    /// BLEU, METEOR, TER and ROUGE in that order.
    pub fn standard(config: &MetricsConfig) -> Result<Self> {
        Self::from_ids(&MetricId::ALL, config)
    }

    /// Built-in scorers for `ids`, registered in the given order.
    pub fn from_ids(ids: &[MetricId], config: &MetricsConfig) -> Result<Self> {
        ids.iter()
            .fold(Self::builder(), |builder, id| {
                builder.register_arc(Self::built_in(*id, config))
            })
            .build()
    }

    fn built_in(id: MetricId, config: &MetricsConfig) -> Arc<dyn Scorer> {
        match id {
            MetricId::Bleu => Arc::new(BleuCalculator::from_config(&config.bleu)),
            MetricId::Meteor => Arc::new(MeteorCalculator::from_config(&config.meteor)),
            MetricId::Ter => Arc::new(TerCalculator::from_config(&config.ter)),
            MetricId::Rouge => Arc::new(RougeCalculator::from_config(&config.rouge)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Scorer>> {
        self.scorers.iter()
    }

    pub fn ids(&self) -> Vec<MetricId> {
        self.scorers.iter().map(|scorer| scorer.id()).collect()
    }

    /// Every metric column, in registration order.
    pub fn fields(&self) -> Vec<String> {
        self.scorers.iter().flat_map(|scorer| scorer.fields()).collect()
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("metrics", &self.ids())
            .finish()
    }
}

#[derive(Default)]
pub struct MetricRegistryBuilder {
    scorers: Vec<Arc<dyn Scorer>>,
}

impl MetricRegistryBuilder {
    pub fn register<S: Scorer + 'static>(self, scorer: S) -> Self {
        self.register_arc(Arc::new(scorer))
    }

    pub fn register_arc(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorers.push(scorer);
        self
    }

    pub fn build(self) -> Result<MetricRegistry> {
        if self.scorers.is_empty() {
            return Err(EvalError::Config(
                "At least one metric must be configured".to_string(),
            ));
        }

        let mut seen = Vec::with_capacity(self.scorers.len());
        for scorer in &self.scorers {
            let id = scorer.id();
            if seen.contains(&id) {
                return Err(EvalError::Config(format!("Metric registered twice: {}", id)));
            }
            seen.push(id);
        }

        tracing::debug!(metrics = ?seen, "metric registry built");

        Ok(MetricRegistry {
            scorers: self.scorers,
        })
    }
}

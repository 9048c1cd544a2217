use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::DEFAULT_SATURATION_FACTOR;

/// How a batch is drawn from the unassigned pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStrategy {
    /// Shuffle, then prefer instances with the most remaining quota.
    #[default]
    Random,
    /// Insertion order. Reproducible.
    Ordered,
}

/// Instance allocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// When false every user gets the whole catalog.
    pub enabled: bool,
    /// Independent labels wanted per instance.
    pub labels_per_instance: usize,
    /// Batch size granted to each annotator.
    pub instance_per_annotator: usize,
    /// Test questions injected into each batch.
    pub test_question_per_annotator: usize,
    pub sampling_strategy: SamplingStrategy,
    /// New users are refused once remaining quota drops to this fraction of a batch.
    pub saturation_factor: f64,
    /// Per-instance quota overrides. Zero excludes the instance.
    pub quota_overrides: BTreeMap<String, usize>,
    /// Seed for the sampling RNG. Entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_ASSIGNMENT_ENABLED,
            labels_per_instance: defaults::DEFAULT_LABELS_PER_INSTANCE,
            instance_per_annotator: defaults::DEFAULT_INSTANCE_PER_ANNOTATOR,
            test_question_per_annotator: defaults::DEFAULT_TEST_QUESTION_PER_ANNOTATOR,
            sampling_strategy: SamplingStrategy::default(),
            saturation_factor: DEFAULT_SATURATION_FACTOR,
            quota_overrides: BTreeMap::new(),
            seed: None,
        }
    }
}

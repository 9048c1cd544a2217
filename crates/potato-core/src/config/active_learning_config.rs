use serde::{Deserialize, Serialize};

use super::defaults;

/// Classifier family trained per schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    MultinomialNb,
    NearestCentroid,
}

/// Text featurizer feeding the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VectorizerKind {
    #[default]
    Count,
    HashingTfidf,
}

/// How conflicting annotations collapse into one training label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Pick one annotator's answer uniformly at random.
    #[default]
    Random,
    /// Most frequent answer, ties broken by first occurrence.
    Majority,
}

/// Active learning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveLearningConfig {
    pub enabled: bool,
    /// A pass is due every `update_rate` finished annotations.
    pub update_rate: usize,
    /// Schemas to train on. Empty means all.
    pub schemas: Vec<String>,
    pub classifier: ClassifierKind,
    pub vectorizer: VectorizerKind,
    pub resolution_strategy: ResolutionStrategy,
    /// Share of the unlabeled pool kept in random order (0 to 100).
    pub random_sample_percent: f64,
    /// Cap on classifier-ranked ids; the overflow is appended unranked.
    pub max_inferred_predictions: Option<usize>,
    /// Bucket count for the hashing vectorizer.
    pub hashing_dimensions: usize,
    pub seed: Option<u64>,
}

impl Default for ActiveLearningConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_AL_ENABLED,
            update_rate: defaults::DEFAULT_AL_UPDATE_RATE,
            schemas: Vec::new(),
            classifier: ClassifierKind::default(),
            vectorizer: VectorizerKind::default(),
            resolution_strategy: ResolutionStrategy::default(),
            random_sample_percent: defaults::DEFAULT_RANDOM_SAMPLE_PERCENT,
            max_inferred_predictions: None,
            hashing_dimensions: defaults::DEFAULT_HASHING_DIMENSIONS,
            seed: None,
        }
    }
}

//! Per-schema text classifiers and the factory mapping config enums to them.

mod centroid;
mod naive_bayes;
mod pipeline;

pub use centroid::NearestCentroid;
pub use naive_bayes::MultinomialNaiveBayes;
pub use pipeline::TextPipeline;

use potato_core::config::{ClassifierKind, VectorizerKind};
use potato_core::errors::LearningError;
use potato_core::traits::{IClassifier, IVectorizer};

use crate::vectorizer::{CountVectorizer, HashingTfidfVectorizer};

/// Unfitted pipeline for the configured classifier and vectorizer.
pub fn build_pipeline(
    classifier: ClassifierKind,
    vectorizer: VectorizerKind,
    hashing_dimensions: usize,
) -> TextPipeline {
    let vectorizer: Box<dyn IVectorizer> = match vectorizer {
        VectorizerKind::Count => Box::new(CountVectorizer::new()),
        VectorizerKind::HashingTfidf => Box::new(HashingTfidfVectorizer::new(hashing_dimensions)),
    };
    let classifier: Box<dyn IClassifier> = match classifier {
        ClassifierKind::MultinomialNb => Box::new(MultinomialNaiveBayes::new(1.0)),
        ClassifierKind::NearestCentroid => Box::new(NearestCentroid::new()),
    };
    TextPipeline::new(vectorizer, classifier)
}

/// Shared input checks. Returns the sorted distinct classes.
pub(crate) fn check_training_set(
    features: &[Vec<f64>],
    labels: &[String],
) -> Result<Vec<String>, LearningError> {
    if features.len() != labels.len() {
        return Err(LearningError::TrainingFailed {
            schema: String::new(),
            reason: format!("{} feature rows for {} labels", features.len(), labels.len()),
        });
    }
    let mut classes: Vec<String> = labels.to_vec();
    classes.sort();
    classes.dedup();
    if classes.len() < 2 {
        return Err(LearningError::InsufficientLabels {
            schema: String::new(),
            distinct: classes.len(),
        });
    }
    Ok(classes)
}

/// Numerically stable softmax.
pub(crate) fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        exps.into_iter().map(|e| e / sum).collect()
    } else {
        vec![1.0 / scores.len().max(1) as f64; scores.len()]
    }
}

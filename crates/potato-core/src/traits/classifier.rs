use crate::errors::LearningError;

/// Turns raw text into fixed-length feature vectors.
pub trait IVectorizer: Send + Sync {
    /// Learn the vocabulary (or weighting) from a training corpus.
    fn fit(&mut self, docs: &[&str]);

    fn transform(&self, doc: &str) -> Vec<f64>;

    fn dimensions(&self) -> usize;

    fn name(&self) -> &str;
}

/// A probabilistic text classifier over vectorized features.
pub trait IClassifier: Send + Sync {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[String]) -> Result<(), LearningError>;

    /// Class probabilities aligned with [`IClassifier::classes`].
    fn predict_proba(&self, features: &[f64]) -> Vec<f64>;

    fn classes(&self) -> &[String];

    fn name(&self) -> &str;
}

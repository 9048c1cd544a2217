use potato_core::errors::LearningError;
use potato_core::traits::IClassifier;

use super::{check_training_set, softmax};

/// Class means; probabilities are a softmax over negative squared distances.
#[derive(Debug, Clone, Default)]
pub struct NearestCentroid {
    classes: Vec<String>,
    centroids: Vec<Vec<f64>>,
}

impl NearestCentroid {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IClassifier for NearestCentroid {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[String]) -> Result<(), LearningError> {
        let classes = check_training_set(features, labels)?;
        let dims = features.first().map_or(0, Vec::len);
        let centroids = classes
            .iter()
            .map(|class| {
                let mut sum = vec![0.0; dims];
                let mut count = 0usize;
                for (row, label) in features.iter().zip(labels) {
                    if label == class {
                        count += 1;
                        for (s, x) in sum.iter_mut().zip(row) {
                            *s += x;
                        }
                    }
                }
                sum.iter().map(|s| s / count.max(1) as f64).collect()
            })
            .collect();
        self.classes = classes;
        self.centroids = centroids;
        Ok(())
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let scores: Vec<f64> = self
            .centroids
            .iter()
            .map(|c| {
                -c.iter()
                    .zip(features)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>()
            })
            .collect();
        softmax(&scores)
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn name(&self) -> &str {
        "nearest-centroid"
    }
}

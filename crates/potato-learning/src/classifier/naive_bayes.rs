use potato_core::errors::LearningError;
use potato_core::traits::IClassifier;

use super::{check_training_set, softmax};

/// Multinomial naive Bayes with additive smoothing. Expects non-negative
/// features (counts or tf-idf weights).
#[derive(Debug, Clone)]
pub struct MultinomialNaiveBayes {
    alpha: f64,
    classes: Vec<String>,
    log_priors: Vec<f64>,
    /// `[class][feature]` log likelihoods.
    log_likelihoods: Vec<Vec<f64>>,
}

impl MultinomialNaiveBayes {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            classes: Vec::new(),
            log_priors: Vec::new(),
            log_likelihoods: Vec::new(),
        }
    }
}

impl IClassifier for MultinomialNaiveBayes {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[String]) -> Result<(), LearningError> {
        let classes = check_training_set(features, labels)?;
        let dims = features.first().map_or(0, Vec::len);
        let n = labels.len() as f64;

        let mut log_priors = Vec::with_capacity(classes.len());
        let mut log_likelihoods = Vec::with_capacity(classes.len());
        for class in &classes {
            let mut totals = vec![0.0; dims];
            let mut docs = 0usize;
            for (row, label) in features.iter().zip(labels) {
                if label == class {
                    docs += 1;
                    for (t, x) in totals.iter_mut().zip(row) {
                        *t += x.max(0.0);
                    }
                }
            }
            let denom: f64 = totals.iter().sum::<f64>() + self.alpha * dims as f64;
            log_priors.push((docs as f64 / n).ln());
            log_likelihoods.push(
                totals
                    .iter()
                    .map(|t| {
                        if denom > 0.0 {
                            ((t + self.alpha) / denom).ln()
                        } else {
                            0.0
                        }
                    })
                    .collect(),
            );
        }

        self.classes = classes;
        self.log_priors = log_priors;
        self.log_likelihoods = log_likelihoods;
        Ok(())
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let scores: Vec<f64> = self
            .log_priors
            .iter()
            .zip(&self.log_likelihoods)
            .map(|(prior, ll)| {
                prior
                    + ll.iter()
                        .zip(features)
                        .map(|(l, x)| l * x.max(0.0))
                        .sum::<f64>()
            })
            .collect();
        softmax(&scores)
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn name(&self) -> &str {
        "multinomial-nb"
    }
}

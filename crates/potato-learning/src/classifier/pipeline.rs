use potato_core::errors::LearningError;
use potato_core::traits::{IClassifier, IVectorizer};

/// Vectorizer followed by classifier, trained for one schema.
pub struct TextPipeline {
    vectorizer: Box<dyn IVectorizer>,
    classifier: Box<dyn IClassifier>,
}

impl TextPipeline {
    pub fn new(vectorizer: Box<dyn IVectorizer>, classifier: Box<dyn IClassifier>) -> Self {
        Self {
            vectorizer,
            classifier,
        }
    }

    /// Fit both stages. Errors carry `schema`.
    pub fn fit(&mut self, schema: &str, texts: &[&str], labels: &[String]) -> Result<(), LearningError> {
        self.vectorizer.fit(texts);
        let features: Vec<Vec<f64>> = texts.iter().map(|t| self.vectorizer.transform(t)).collect();
        self.classifier
            .fit(&features, labels)
            .map_err(|e| match e {
                LearningError::TrainingFailed { reason, .. } => LearningError::TrainingFailed {
                    schema: schema.to_string(),
                    reason,
                },
                LearningError::InsufficientLabels { distinct, .. } => {
                    LearningError::InsufficientLabels {
                        schema: schema.to_string(),
                        distinct,
                    }
                }
                other => other,
            })
    }

    pub fn predict_proba(&self, text: &str) -> Vec<f64> {
        self.classifier.predict_proba(&self.vectorizer.transform(text))
    }

    /// Highest class probability for `text`.
    pub fn confidence(&self, text: &str) -> f64 {
        self.predict_proba(text)
            .into_iter()
            .fold(0.0, f64::max)
    }

    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    pub fn describe(&self) -> String {
        format!("{}+{}", self.vectorizer.name(), self.classifier.name())
    }
}

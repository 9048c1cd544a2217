use std::collections::BTreeMap;

use potato_core::traits::IVectorizer;

use super::tokenize;

/// Bag of words over the vocabulary seen by [`IVectorizer::fit`].
/// Unknown terms are ignored.
#[derive(Debug, Clone, Default)]
pub struct CountVectorizer {
    vocabulary: BTreeMap<String, usize>,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IVectorizer for CountVectorizer {
    fn fit(&mut self, docs: &[&str]) {
        let mut terms: Vec<String> = docs.iter().flat_map(|d| tokenize(d)).collect();
        terms.sort();
        terms.dedup();
        self.vocabulary = terms.into_iter().enumerate().map(|(i, t)| (t, i)).collect();
    }

    fn transform(&self, doc: &str) -> Vec<f64> {
        let mut counts = vec![0.0; self.vocabulary.len()];
        for term in tokenize(doc) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                counts[idx] += 1.0;
            }
        }
        counts
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    fn name(&self) -> &str {
        "count"
    }
}

use std::collections::HashMap;

use potato_core::traits::IVectorizer;

use super::tokenize;

/// Term frequencies hashed into fixed buckets with FNV-1a and weighted by
/// inverse document frequency learned at fit time, then L2 normalized.
#[derive(Debug, Clone)]
pub struct HashingTfidfVectorizer {
    dimensions: usize,
    idf: Vec<f64>,
}

impl HashingTfidfVectorizer {
    pub fn new(dimensions: usize) -> Self {
        let dimensions = dimensions.max(1);
        Self {
            dimensions,
            idf: vec![1.0; dimensions],
        }
    }

    fn bucket(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % dims as u64) as usize
    }
}

impl IVectorizer for HashingTfidfVectorizer {
    fn fit(&mut self, docs: &[&str]) {
        let mut df = vec![0usize; self.dimensions];
        for doc in docs {
            let mut seen: Vec<usize> = tokenize(doc)
                .iter()
                .map(|t| Self::bucket(t, self.dimensions))
                .collect();
            seen.sort_unstable();
            seen.dedup();
            for b in seen {
                df[b] += 1;
            }
        }
        // Smoothed idf: ln((1 + n) / (1 + df)) + 1.
        let n = docs.len() as f64;
        self.idf = df
            .into_iter()
            .map(|d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();
    }

    fn transform(&self, doc: &str) -> Vec<f64> {
        let tokens = tokenize(doc);
        let mut vec = vec![0.0; self.dimensions];
        if tokens.is_empty() {
            return vec;
        }

        let mut tf: HashMap<usize, f64> = HashMap::new();
        for tok in &tokens {
            *tf.entry(Self::bucket(tok, self.dimensions)).or_default() += 1.0;
        }
        let total = tokens.len() as f64;
        for (bucket, count) in tf {
            vec[bucket] = count / total * self.idf[bucket];
        }

        let norm: f64 = vec.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > f64::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing-tfidf"
    }
}

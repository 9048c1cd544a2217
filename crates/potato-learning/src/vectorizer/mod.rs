//! Text featurizers.

mod count;
mod hashing;

pub use count::CountVectorizer;
pub use hashing::HashingTfidfVectorizer;

/// Lowercased alphanumeric terms of at least two characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|s| s.chars().count() >= 2)
        .map(|s| s.to_lowercase())
        .collect()
}

//! Per-annotator label order for schemas with option randomization.

use potato_core::models::{AnnotationSchema, SchemaType};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seed derived from the user id, stable across restarts.
fn user_seed(user_id: &str) -> u64 {
    let digest = blake3::hash(user_id.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

/// Declared labels, shuffled per user for multirate schemas with
/// `option_randomization`.
pub fn option_order(user_id: &str, schema: &AnnotationSchema) -> Vec<String> {
    let mut labels = schema.label_names();
    if schema.option_randomization && schema.annotation_type == SchemaType::Multirate {
        let mut rng = StdRng::seed_from_u64(user_seed(user_id));
        labels.shuffle(&mut rng);
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multirate(randomize: bool) -> AnnotationSchema {
        let labels: Vec<String> = (0..8).map(|i| format!("aspect_{i}")).collect();
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        let mut schema = AnnotationSchema::new("aspects", SchemaType::Multirate, &refs);
        schema.option_randomization = randomize;
        schema
    }

    #[test]
    fn order_is_stable_per_user() {
        let schema = multirate(true);
        assert_eq!(option_order("alice", &schema), option_order("alice", &schema));
    }

    #[test]
    fn order_is_a_permutation_of_the_labels() {
        let schema = multirate(true);
        let mut shuffled = option_order("bob", &schema);
        shuffled.sort();
        let mut declared = schema.label_names();
        declared.sort();
        assert_eq!(shuffled, declared);
    }

    #[test]
    fn declared_order_without_randomization() {
        let schema = multirate(false);
        assert_eq!(option_order("alice", &schema), schema.label_names());
    }

    #[test]
    fn radio_schemas_are_never_shuffled() {
        let mut schema = AnnotationSchema::new("s", SchemaType::Radio, &["a", "b", "c", "d"]);
        schema.option_randomization = true;
        assert_eq!(option_order("alice", &schema), schema.label_names());
    }
}

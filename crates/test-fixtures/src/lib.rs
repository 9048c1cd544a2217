//! Builders shared by the integration tests of every crate: small catalogs,
//! ready-made configs, label helpers and seeded RNGs.

use potato_catalog::InstanceCatalog;
use potato_core::config::{PageSpec, PotatoConfig};
use potato_core::models::{AnnotationSchema, Instance, InstanceKind, LabelAnnotation, SchemaType};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{Map, Value};

/// An instance whose payload holds `id` and `text`.
pub fn instance(id: &str, text: &str, kind: InstanceKind) -> Instance {
    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.into()));
    payload.insert("text".into(), Value::String(text.into()));
    Instance {
        id: id.into(),
        payload,
        displayed_text: text.into(),
        kind,
    }
}

pub fn item(id: &str, text: &str) -> Instance {
    instance(id, text, InstanceKind::Item)
}

/// `doc_0 .. doc_{n-1}` real items.
pub fn item_ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("doc_{i}")).collect()
}

/// Catalog of `n` real items with distinct texts.
pub fn catalog_of(n: usize) -> InstanceCatalog {
    catalog_from(
        item_ids(n)
            .iter()
            .map(|id| item(id, &format!("text of {id}")))
            .collect(),
    )
}

/// Catalog from prepared instances.
///
/// # Panics
/// Panics on duplicate ids.
pub fn catalog_from(instances: Vec<Instance>) -> InstanceCatalog {
    InstanceCatalog::from_instances(instances).expect("fixture ids must be unique")
}

/// Config with one radio schema `sentiment` (positive/negative/neutral).
pub fn sentiment_config() -> PotatoConfig {
    let mut config = PotatoConfig::default();
    config.annotation_schemes = vec![AnnotationSchema::new(
        "sentiment",
        SchemaType::Radio,
        &["positive", "negative", "neutral"],
    )];
    config.assignment.seed = Some(7);
    config.active_learning.seed = Some(7);
    config
}

/// Page specs from ids.
pub fn pages(ids: &[&str]) -> Vec<PageSpec> {
    ids.iter()
        .map(|id| PageSpec {
            id: id.to_string(),
            text: None,
        })
        .collect()
}

/// `[("sentiment", "positive")]` -> `{sentiment: {positive: "true"}}`.
pub fn labels(choices: &[(&str, &str)]) -> LabelAnnotation {
    let mut la = LabelAnnotation::new();
    for (schema, label) in choices {
        la.insert(schema, label, "true");
    }
    la
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

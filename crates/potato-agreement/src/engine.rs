//! Turns annotator label tables into reliability units per schema.

use std::collections::{BTreeMap, BTreeSet};

use potato_core::models::{AnnotationSchema, LabelAnnotation, ResolvedValue, SchemaType};
use tracing::debug;

use crate::alpha::{krippendorff_alpha, Metric};
use crate::value::AgreementValue;

/// One annotator's labels, instance id to annotation.
pub type RaterLabels = BTreeMap<String, LabelAnnotation>;

/// Krippendorff's alpha of `raters` on `schema`.
///
/// Items are the union of ids any rater answered for the schema; a rater
/// without an answer leaves the cell empty. Not computable with fewer than
/// two raters, for types without a metric, or when no item was answered by
/// at least two of them.
pub fn agreement(raters: &[&RaterLabels], schema: &AnnotationSchema) -> AgreementValue {
    if raters.len() < 2 {
        return AgreementValue::not_computable(format!(
            "agreement needs at least 2 annotators, got {}",
            raters.len()
        ));
    }
    let schema_type = schema.annotation_type;
    if !schema_type.supports_agreement() {
        return AgreementValue::not_computable(format!(
            "no agreement metric for {schema_type:?} schema '{}'",
            schema.name
        ));
    }

    let resolved: Vec<BTreeMap<&str, ResolvedValue>> = raters
        .iter()
        .map(|table| {
            table
                .iter()
                .filter_map(|(id, la)| Some((id.as_str(), la.resolve(&schema.name, schema_type)?)))
                .collect()
        })
        .collect();
    let items: BTreeSet<&str> = resolved.iter().flat_map(|r| r.keys().copied()).collect();
    let shared = items
        .iter()
        .any(|id| resolved.iter().filter(|r| r.contains_key(id)).count() >= 2);
    if !shared {
        return AgreementValue::not_computable(format!(
            "annotators share no answered instance for '{}'",
            schema.name
        ));
    }
    debug!(schema = %schema.name, raters = raters.len(), items = items.len(), "computing agreement");

    match schema_type {
        SchemaType::Radio => {
            let mut vocabulary: Vec<String> = schema.label_names();
            let units = units_of(&items, &resolved, |value| match value {
                ResolvedValue::Category(label) => Some(code_of(&mut vocabulary, label)),
                _ => None,
            });
            scalar(&units, Metric::Nominal)
        }
        SchemaType::Likert => {
            let units = units_of(&items, &resolved, |value| match value {
                ResolvedValue::Ordinal(n) => Some(*n as f64),
                _ => None,
            });
            scalar(&units, Metric::Interval)
        }
        _ => per_label(schema, &items, &resolved),
    }
}

fn scalar(units: &[Vec<f64>], metric: Metric) -> AgreementValue {
    match krippendorff_alpha(units, metric) {
        Some(alpha) => AgreementValue::Scalar { alpha },
        None => AgreementValue::not_computable("no pairable ratings"),
    }
}

/// Multiselect: a binary nominal alpha for every declared label.
fn per_label(
    schema: &AnnotationSchema,
    items: &BTreeSet<&str>,
    resolved: &[BTreeMap<&str, ResolvedValue>],
) -> AgreementValue {
    let mut alphas = BTreeMap::new();
    for label in schema.label_names() {
        let units = units_of(items, resolved, |value| match value {
            ResolvedValue::Categories(set) => Some(if set.contains(&label) { 1.0 } else { 0.0 }),
            _ => None,
        });
        if let Some(alpha) = krippendorff_alpha(&units, Metric::Nominal) {
            alphas.insert(label, alpha);
        }
    }
    if alphas.is_empty() {
        return AgreementValue::not_computable("no pairable ratings");
    }
    AgreementValue::PerLabel { alphas }
}

fn units_of<F>(
    items: &BTreeSet<&str>,
    resolved: &[BTreeMap<&str, ResolvedValue>],
    mut code: F,
) -> Vec<Vec<f64>>
where
    F: FnMut(&ResolvedValue) -> Option<f64>,
{
    items
        .iter()
        .map(|id| {
            resolved
                .iter()
                .filter_map(|rater| rater.get(id).and_then(&mut code))
                .collect()
        })
        .collect()
}

/// Index of `label`, appending labels missing from the schema.
fn code_of(vocabulary: &mut Vec<String>, label: &str) -> f64 {
    let pos = match vocabulary.iter().position(|l| l == label) {
        Some(pos) => pos,
        None => {
            vocabulary.push(label.to_string());
            vocabulary.len() - 1
        }
    };
    pos as f64
}

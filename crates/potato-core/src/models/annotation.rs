use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{BEHAVIOR_KEY_PREFIX, FORM_KEY_SEPARATOR, TEXT_BOX_LABEL};
use crate::models::SchemaType;

/// Label name to raw submitted value, for one schema.
pub type SchemaAnnotation = BTreeMap<String, String>;

/// Free-form behavioral metrics recorded alongside an annotation.
pub type BehaviorData = BTreeMap<String, Value>;

/// All schema answers of one user on one instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelAnnotation(BTreeMap<String, SchemaAnnotation>);

impl LabelAnnotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse submitted form fields. Keys look like `schema:::label`; empty
    /// values and keys without the separator are skipped.
    pub fn from_form<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut out = Self::new();
        for (key, value) in fields {
            if value.is_empty() {
                continue;
            }
            if let Some((schema, label)) = key.split_once(FORM_KEY_SEPARATOR) {
                out.insert(schema, label, value);
            }
        }
        out
    }

    pub fn insert(&mut self, schema: &str, label: &str, value: &str) {
        self.0
            .entry(schema.to_string())
            .or_default()
            .insert(label.to_string(), value.to_string());
    }

    pub fn schema(&self, name: &str) -> Option<&SchemaAnnotation> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaAnnotation)> {
        self.0.iter()
    }

    /// True when no schema carries a non-empty value.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|s| s.values().all(|v| v.is_empty()))
    }

    /// Drop empty values and schemas left with nothing.
    pub fn normalized(mut self) -> Self {
        for answers in self.0.values_mut() {
            answers.retain(|_, v| !v.is_empty());
        }
        self.0.retain(|_, answers| !answers.is_empty());
        self
    }

    /// Typed value for one schema.
    pub fn resolve(&self, schema: &str, schema_type: SchemaType) -> Option<ResolvedValue> {
        ResolvedValue::resolve(schema_type, self.schema(schema)?)
    }
}

/// Extract `behavior_*` form fields, prefix stripped.
pub fn behavior_from_form<'a, I>(fields: I) -> BehaviorData
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    fields
        .into_iter()
        .filter_map(|(k, v)| {
            k.strip_prefix(BEHAVIOR_KEY_PREFIX)
                .map(|name| (name.to_string(), Value::String(v.to_string())))
        })
        .collect()
}

/// A highlighted span over the instance text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanAnnotation {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub label: String,
}

/// A schema answer converted to its typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResolvedValue {
    /// Radio: the selected label key.
    Category(String),
    /// Likert: trailing numeric suffix of the selected label key.
    Ordinal(i64),
    /// Multiselect: every selected label key.
    Categories(BTreeSet<String>),
    /// Number: parsed `text_box` value.
    Number(f64),
    /// Textbox: raw `text_box` value.
    Text(String),
}

impl ResolvedValue {
    /// Convert raw answers by schema type. `None` when nothing usable was
    /// submitted or the type has no scalar value (multirate, span).
    pub fn resolve(schema_type: SchemaType, answers: &SchemaAnnotation) -> Option<Self> {
        let mut selected = answers
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.as_str());
        match schema_type {
            SchemaType::Radio => selected.next().map(|k| Self::Category(k.to_string())),
            SchemaType::Likert => selected.next().and_then(trailing_number).map(Self::Ordinal),
            SchemaType::Multiselect => {
                let set: BTreeSet<String> = selected.map(str::to_string).collect();
                (!set.is_empty()).then_some(Self::Categories(set))
            }
            SchemaType::Number => answers
                .get(TEXT_BOX_LABEL)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(Self::Number),
            SchemaType::Textbox => answers
                .get(TEXT_BOX_LABEL)
                .filter(|v| !v.is_empty())
                .map(|v| Self::Text(v.clone())),
            SchemaType::Multirate | SchemaType::Span => None,
        }
    }

    /// Stable string form, used for label lookup and answer mapping.
    pub fn as_key(&self) -> String {
        match self {
            Self::Category(s) | Self::Text(s) => s.clone(),
            Self::Ordinal(n) => n.to_string(),
            Self::Categories(set) => set.iter().cloned().collect::<Vec<_>>().join(","),
            Self::Number(x) => x.to_string(),
        }
    }
}

/// `scale_4` -> 4.
fn trailing_number(key: &str) -> Option<i64> {
    let digits_start = key
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    key[digits_start..].parse().ok()
}

use serde::{Deserialize, Serialize};

use crate::constants::LIKERT_LABEL_PREFIX;

/// Annotation question type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    Radio,
    Likert,
    Multiselect,
    Number,
    Textbox,
    Multirate,
    Span,
}

impl SchemaType {
    /// Whether Krippendorff's alpha is defined for this type.
    pub fn supports_agreement(self) -> bool {
        matches!(self, Self::Radio | Self::Likert | Self::Multiselect)
    }
}

/// A label entry: either a bare name or a name with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        tooltip: Option<String>,
        #[serde(default)]
        key_value: Option<String>,
    },
}

impl LabelSpec {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(n) => n,
            Self::Detailed { name, .. } => name,
        }
    }
}

/// How model suggestions are surfaced to the annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LabelSuggestions {
    #[default]
    None,
    Highlight,
    Prefill,
}

/// One annotation question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSchema {
    pub name: String,
    pub annotation_type: SchemaType,
    #[serde(default)]
    pub labels: Vec<LabelSpec>,
    #[serde(default)]
    pub description: String,
    /// Likert scale size when no explicit labels are given.
    #[serde(default)]
    pub size: Option<usize>,
    /// Shuffle label order per user (multirate).
    #[serde(default)]
    pub option_randomization: bool,
    #[serde(default)]
    pub label_suggestions: LabelSuggestions,
}

impl AnnotationSchema {
    pub fn new(name: impl Into<String>, annotation_type: SchemaType, labels: &[&str]) -> Self {
        Self {
            name: name.into(),
            annotation_type,
            labels: labels.iter().map(|l| LabelSpec::Name(l.to_string())).collect(),
            description: String::new(),
            size: None,
            option_randomization: false,
            label_suggestions: LabelSuggestions::None,
        }
    }

    /// Label keys in declaration order. Likert scales without explicit labels
    /// expand to `scale_1..=scale_n`.
    pub fn label_names(&self) -> Vec<String> {
        if self.labels.is_empty() && self.annotation_type == SchemaType::Likert {
            let n = self.size.unwrap_or(0);
            return (1..=n).map(|i| format!("{LIKERT_LABEL_PREFIX}{i}")).collect();
        }
        self.labels.iter().map(|l| l.name().to_string()).collect()
    }
}

//! Expansion of test question templates into one instance per choice.

use potato_core::constants::{TEST_QUESTION_CHOICE_PLACEHOLDER, TEST_QUESTION_MARKER};
use potato_core::errors::ConfigError;
use serde_json::{Map, Value};

use crate::loader::record_id;

/// Expand `{"id", "text", "choices"}` into records with ids
/// `<id>_testing_<choice>` and the placeholder replaced by the choice.
pub fn expand_template(
    template: &Map<String, Value>,
    id_key: &str,
    text_key: &str,
) -> Result<Vec<Map<String, Value>>, ConfigError> {
    let base_id = record_id(template, id_key)?;
    let text = template
        .get(text_key)
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::MissingField {
            field: text_key.to_string(),
        })?;
    let choices = template
        .get("choices")
        .and_then(Value::as_array)
        .ok_or_else(|| ConfigError::MissingField {
            field: "choices".to_string(),
        })?;

    let mut out = Vec::with_capacity(choices.len());
    for choice in choices {
        let choice = match choice {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let mut record = template.clone();
        record.remove("choices");
        record.insert(
            id_key.to_string(),
            Value::String(format!("{base_id}_{TEST_QUESTION_MARKER}_{choice}")),
        );
        record.insert(
            text_key.to_string(),
            Value::String(text.replace(TEST_QUESTION_CHOICE_PLACEHOLDER, &choice)),
        );
        out.push(record);
    }
    Ok(out)
}

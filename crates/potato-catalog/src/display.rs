//! Derivation of `displayed_text` from the raw text field.

use potato_core::config::{DisplayConfig, ListPrefix, TextRandomization};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::Value;

/// Render a text value for display.
///
/// Strings pass through unless `list_as_text` is on and they hold a JSON
/// list or map. Lists become prefixed lines; maps become `key: value`
/// sections, optionally shuffled by key or by value.
pub fn displayed_text(raw: &Value, config: &DisplayConfig, rng: &mut StdRng) -> String {
    if !config.list_as_text {
        return plain(raw);
    }
    let unfolded;
    let value = match raw {
        Value::String(s) if s.trim_start().starts_with(['[', '{']) => {
            match serde_json::from_str::<Value>(s) {
                Ok(v) => {
                    unfolded = v;
                    &unfolded
                }
                Err(_) => raw,
            }
        }
        other => other,
    };

    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}{}", prefix(config.prefix, i), plain(item)))
            .collect::<Vec<_>>()
            .join(&config.separator),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            let mut values: Vec<&Value> = map.values().collect();
            match config.randomization {
                TextRandomization::Key => keys.shuffle(rng),
                TextRandomization::Value => values.shuffle(rng),
                TextRandomization::None => {}
            }
            let sections: Vec<String> = match config.randomization {
                TextRandomization::Key => keys
                    .iter()
                    .map(|k| format!("{k}: {}", plain(&map[k.as_str()])))
                    .collect(),
                _ => keys
                    .iter()
                    .zip(values.iter())
                    .map(|(k, v)| format!("{k}: {}", plain(v)))
                    .collect(),
            };
            sections.join(&config.separator)
        }
        other => plain(other),
    }
}

fn plain(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn prefix(kind: ListPrefix, i: usize) -> String {
    match kind {
        ListPrefix::None => String::new(),
        ListPrefix::Number => format!("{}. ", i + 1),
        ListPrefix::Alphabet => {
            let letter = (b'A' + (i % 26) as u8) as char;
            format!("{letter}. ")
        }
    }
}

use serde::{Deserialize, Serialize};

use super::defaults;

/// Prefix put in front of each list element when lists render as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListPrefix {
    #[default]
    None,
    Alphabet,
    Number,
}

/// Shuffling applied to map-valued texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextRandomization {
    #[default]
    None,
    Key,
    Value,
}

/// How instance text is turned into `displayed_text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub list_as_text: bool,
    pub prefix: ListPrefix,
    pub randomization: TextRandomization,
    pub separator: String,
    pub seed: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            list_as_text: defaults::DEFAULT_LIST_AS_TEXT,
            prefix: ListPrefix::default(),
            randomization: TextRandomization::default(),
            separator: defaults::DEFAULT_LINE_SEPARATOR.to_string(),
            seed: 0,
        }
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// One synthetic page (survey item, instructions, consent form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Synthetic pages placed around the real work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    pub pre_annotation_pages: Vec<PageSpec>,
    pub post_annotation_pages: Vec<PageSpec>,
    pub prestudy_passed_pages: Vec<PageSpec>,
    pub prestudy_failed_pages: Vec<PageSpec>,
    /// JSON Lines files of `{"id", "text", "choices"}` test question templates.
    pub test_question_files: Vec<String>,
}

/// Consent gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentConfig {
    pub enabled: bool,
    /// Substring identifying the consent item among instance ids.
    pub instance_pattern: String,
    /// Schema holding the consent answer.
    pub question_key: String,
    /// Label that means "agreed".
    pub agree_label: String,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_CONSENT_ENABLED,
            instance_pattern: defaults::DEFAULT_CONSENT_PATTERN.to_string(),
            question_key: defaults::DEFAULT_CONSENT_QUESTION_KEY.to_string(),
            agree_label: defaults::DEFAULT_CONSENT_AGREE_LABEL.to_string(),
        }
    }
}

/// Prestudy gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrestudyConfig {
    pub enabled: bool,
    /// Schema whose answer is scored.
    pub question_key: String,
    /// Maps a converted answer to the value compared with ground truth.
    pub answer_mapping: BTreeMap<String, String>,
    /// Payload field of each prestudy instance holding the expected answer.
    pub groundtruth_key: String,
    /// Fraction of correct answers needed to pass.
    pub minimum_score: f64,
}

impl Default for PrestudyConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_PRESTUDY_ENABLED,
            question_key: String::new(),
            answer_mapping: BTreeMap::new(),
            groundtruth_key: defaults::DEFAULT_GROUNDTRUTH_KEY.to_string(),
            minimum_score: defaults::DEFAULT_PRESTUDY_MINIMUM_SCORE,
        }
    }
}

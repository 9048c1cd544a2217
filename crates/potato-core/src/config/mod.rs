//! Campaign configuration.
//!
//! Every section is optional in TOML and falls back to [`defaults`].
//!
//! ```
//! use potato_core::PotatoConfig;
//!
//! let config = PotatoConfig::from_toml(
//!     r#"
//! [[annotation_schemes]]
//! name = "sentiment"
//! annotation_type = "radio"
//! labels = ["positive", "negative"]
//! "#,
//! )
//! .unwrap();
//! assert_eq!(config.assignment.labels_per_instance, 3);
//! ```

mod active_learning_config;
mod assignment_config;
pub mod defaults;
mod display_config;
mod pages_config;
mod storage_config;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use active_learning_config::{
    ActiveLearningConfig, ClassifierKind, ResolutionStrategy, VectorizerKind,
};
pub use assignment_config::{AssignmentConfig, SamplingStrategy};
pub use display_config::{DisplayConfig, ListPrefix, TextRandomization};
pub use pages_config::{ConsentConfig, PageSpec, PagesConfig, PrestudyConfig};
pub use storage_config::{ObservabilityConfig, OutputConfig, StorageBackend, StorageConfig};

use crate::errors::ConfigError;
use crate::models::{AnnotationSchema, SchemaType};

/// Which payload fields carry the id and the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemPropertiesConfig {
    pub id_key: String,
    pub text_key: String,
}

impl Default for ItemPropertiesConfig {
    fn default() -> Self {
        Self {
            id_key: defaults::DEFAULT_ID_KEY.to_string(),
            text_key: defaults::DEFAULT_TEXT_KEY.to_string(),
        }
    }
}

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PotatoConfig {
    pub item_properties: ItemPropertiesConfig,
    /// Input data files (`.json` or `.jsonl`).
    pub data_files: Vec<String>,
    pub annotation_schemes: Vec<AnnotationSchema>,
    pub assignment: AssignmentConfig,
    pub pages: PagesConfig,
    pub consent: ConsentConfig,
    pub prestudy: PrestudyConfig,
    pub active_learning: ActiveLearningConfig,
    pub display: DisplayConfig,
    pub output: OutputConfig,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
}

impl PotatoConfig {
    /// Parse from a TOML string. Missing fields use defaults.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a schema by name.
    pub fn schema(&self, name: &str) -> Option<&AnnotationSchema> {
        self.annotation_schemes.iter().find(|s| s.name == name)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.annotation_schemes.is_empty() {
            return Err(ConfigError::NoSchemas);
        }

        let mut seen = HashSet::new();
        for schema in &self.annotation_schemes {
            if !seen.insert(schema.name.as_str()) {
                return Err(ConfigError::DuplicateSchema {
                    name: schema.name.clone(),
                });
            }
            let needs_labels = matches!(
                schema.annotation_type,
                SchemaType::Radio | SchemaType::Multiselect | SchemaType::Multirate
            );
            let likert_empty =
                schema.annotation_type == SchemaType::Likert && schema.label_names().is_empty();
            if (needs_labels && schema.labels.is_empty()) || likert_empty {
                return Err(ConfigError::InvalidValue {
                    field: format!("annotation_schemes.{}.labels", schema.name),
                    reason: "schema needs at least one label".to_string(),
                });
            }
        }

        for name in &self.active_learning.schemas {
            if self.schema(name).is_none() {
                return Err(ConfigError::UnknownSchema { name: name.clone() });
            }
        }
        if self.active_learning.update_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "active_learning.update_rate".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        let pct = self.active_learning.random_sample_percent;
        if !(0.0..=100.0).contains(&pct) {
            return Err(ConfigError::InvalidValue {
                field: "active_learning.random_sample_percent".to_string(),
                reason: format!("{pct} is outside 0..=100"),
            });
        }

        if self.prestudy.enabled && self.prestudy.question_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "prestudy.question_key".to_string(),
            });
        }
        if self.prestudy.enabled && self.schema(&self.prestudy.question_key).is_none() {
            return Err(ConfigError::UnknownSchema {
                name: self.prestudy.question_key.clone(),
            });
        }

        match self.output.format.to_ascii_lowercase().as_str() {
            "json" | "jsonl" | "csv" | "tsv" => {}
            other => {
                return Err(ConfigError::UnsupportedFormat {
                    format: other.to_string(),
                })
            }
        }

        if !(0.0..=1.0).contains(&self.assignment.saturation_factor) {
            return Err(ConfigError::InvalidValue {
                field: "assignment.saturation_factor".to_string(),
                reason: "must be within 0..=1".to_string(),
            });
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

use super::defaults;

/// Where snapshots live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Snapshot persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub db_path: String,
    /// Save the user snapshot after every changed submission.
    pub persist_on_submit: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            db_path: defaults::DEFAULT_DB_FILENAME.to_string(),
            persist_on_submit: defaults::DEFAULT_PERSIST_ON_SUBMIT,
        }
    }
}

/// Annotation export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `json` or `jsonl`.
    pub format: String,
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: defaults::DEFAULT_OUTPUT_FORMAT.to_string(),
            path: defaults::DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Fallback filter when `POTATO_LOG` is unset.
    pub log_level: String,
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            json: defaults::DEFAULT_JSON_LOGS,
        }
    }
}

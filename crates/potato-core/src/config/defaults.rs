// Single source of truth for all default values.

// --- Item properties ---
pub const DEFAULT_ID_KEY: &str = "id";
pub const DEFAULT_TEXT_KEY: &str = "text";

// --- Assignment ---
pub const DEFAULT_ASSIGNMENT_ENABLED: bool = true;
pub const DEFAULT_LABELS_PER_INSTANCE: usize = 3;
pub const DEFAULT_INSTANCE_PER_ANNOTATOR: usize = 10;
pub const DEFAULT_TEST_QUESTION_PER_ANNOTATOR: usize = 0;

// --- Consent ---
pub const DEFAULT_CONSENT_ENABLED: bool = false;
pub const DEFAULT_CONSENT_PATTERN: &str = "consent";
pub const DEFAULT_CONSENT_QUESTION_KEY: &str =
    "I want to participate in this research and continue with the study.";
pub const DEFAULT_CONSENT_AGREE_LABEL: &str = "Yes";

// --- Prestudy ---
pub const DEFAULT_PRESTUDY_ENABLED: bool = false;
pub const DEFAULT_GROUNDTRUTH_KEY: &str = "gold_label";
pub const DEFAULT_PRESTUDY_MINIMUM_SCORE: f64 = 0.8;

// --- Active learning ---
pub const DEFAULT_AL_ENABLED: bool = false;
pub const DEFAULT_AL_UPDATE_RATE: usize = 5;
pub const DEFAULT_RANDOM_SAMPLE_PERCENT: f64 = 50.0;
pub const DEFAULT_HASHING_DIMENSIONS: usize = 1024;

// --- Display ---
pub const DEFAULT_LIST_AS_TEXT: bool = false;
pub const DEFAULT_LINE_SEPARATOR: &str = "<br>";

// --- Output ---
pub const DEFAULT_OUTPUT_FORMAT: &str = "jsonl";
pub const DEFAULT_OUTPUT_PATH: &str = "annotation_output";

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "potato.db";
pub const DEFAULT_PERSIST_ON_SUBMIT: bool = true;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;

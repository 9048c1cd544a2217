/// Potato engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Separator between schema name and label name in submitted form keys.
pub const FORM_KEY_SEPARATOR: &str = ":::";

/// Prefix marking behavioral fields in a submitted form.
pub const BEHAVIOR_KEY_PREFIX: &str = "behavior_";

/// Label key holding free-text values for number and textbox schemas.
pub const TEXT_BOX_LABEL: &str = "text_box";

/// Prefix of generated likert label keys (`scale_1`, `scale_2`, ...).
pub const LIKERT_LABEL_PREFIX: &str = "scale_";

/// Sentinel training label for an instance with no answer on a schema.
pub const NO_LABEL: &str = "DUMMY:NONE";

/// Marker in an instance id that identifies a test question.
pub const TEST_QUESTION_MARKER: &str = "testing";

/// Marker in an instance id that identifies a prestudy question.
pub const PRESTUDY_MARKER: &str = "prestudy";

/// Placeholder replaced by each choice when expanding test questions.
pub const TEST_QUESTION_CHOICE_PLACEHOLDER: &str = "[test_question_choice]";

/// Fraction of one annotator's batch below which the campaign stops admitting users.
pub const DEFAULT_SATURATION_FACTOR: f64 = 0.7;

/// Behavior field carrying the client-side timer string.
pub const TIME_STRING_FIELD: &str = "time_string";

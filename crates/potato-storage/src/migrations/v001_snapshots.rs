//! V001: user and registry snapshot tables.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS user_states (
    user_id TEXT PRIMARY KEY,
    state_json TEXT NOT NULL,
    updated_at TEXT NOT NULL
) STRICT;

-- Single-row table; id is always 1.
CREATE TABLE IF NOT EXISTS registry_snapshot (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    state_json TEXT NOT NULL,
    updated_at TEXT NOT NULL
) STRICT;
"#;

//! V002: append-only log of snapshot writes and deletions.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS snapshot_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    subject TEXT NOT NULL,
    operation TEXT NOT NULL,
    recorded_at TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_snapshot_log_subject
    ON snapshot_log(subject);
"#;

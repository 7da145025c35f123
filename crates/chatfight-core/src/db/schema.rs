//! Canonical SQLite schema for the counting engine.
//!
//! One wide counter table keyed by the full
//! (scope, window kind, bucket key, entity) tuple plus a profile
//! table for display names:
//! - `counters` holds every live bucket; rollover is a keying
//!   concern, so old buckets are never rewritten, only ignored
//! - `profiles` is the best-effort display-name cache

/// Migration v1: counter and profile tables.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS counters (
    scope TEXT NOT NULL,
    window_kind TEXT NOT NULL CHECK (window_kind IN ('overall', 'day', 'week')),
    bucket_key TEXT NOT NULL,
    entity_kind TEXT NOT NULL CHECK (entity_kind IN ('user', 'group', 'total')),
    entity_id INTEGER NOT NULL,
    value INTEGER NOT NULL DEFAULT 0 CHECK (value >= 0),
    PRIMARY KEY (scope, window_kind, bucket_key, entity_kind, entity_id)
);

CREATE TABLE IF NOT EXISTS profiles (
    user_id INTEGER PRIMARY KEY,
    display_name TEXT NOT NULL CHECK (length(trim(display_name)) > 0),
    updated_at_us INTEGER NOT NULL
);
";

/// Migration v2: covering index for the top-K read path, matching
/// the `ORDER BY value DESC, entity_id ASC` ranking order.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_counters_rank
    ON counters(scope, window_kind, bucket_key, entity_kind, value DESC, entity_id ASC);
";

//! SQL schema for the kplan SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS items (
    item_id      TEXT PRIMARY KEY,
    owner_id     TEXT NOT NULL,
    text         TEXT NOT NULL,
    url          TEXT,
    status       TEXT NOT NULL DEFAULT 'pending',  -- 'pending' | 'ready_for_review' | 'tagged'
    user_tag     TEXT,                             -- 'learn' | 'repurpose'
    enrichment   TEXT,                             -- JSON EnrichmentRecord or NULL
    collected_at TEXT NOT NULL                     -- RFC 3339 UTC, fixed width
);

CREATE INDEX IF NOT EXISTS items_owner_idx ON items(owner_id, collected_at);

PRAGMA user_version = 1;
";

//! SQL schema for the WhatsOrder SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per stored document, whatever its tier.
CREATE TABLE IF NOT EXISTS documents (
    path       TEXT PRIMARY KEY,  -- users/{uid}/forms/{id} | publicForms/{id} | forms/{id}
    tier       TEXT NOT NULL,     -- 'user_scoped' | 'public_scoped' | 'legacy_flat'
    namespace  TEXT,              -- owner uid; user_scoped only
    form_id    TEXT NOT NULL,
    body_json  TEXT NOT NULL,     -- FormDocument, camelCase JSON
    CHECK ((tier = 'user_scoped') = (namespace IS NOT NULL))
);

-- Which namespace holds a user-scoped form.
CREATE TABLE IF NOT EXISTS form_owners (
    form_id TEXT PRIMARY KEY,
    owner   TEXT NOT NULL
);

-- User-scoped forms by slug. Slugs are not unique.
CREATE TABLE IF NOT EXISTS form_slugs (
    owner      TEXT NOT NULL,
    form_id    TEXT NOT NULL,
    slug       TEXT NOT NULL,
    created_at TEXT NOT NULL,     -- RFC 3339 UTC, fixed width; sorts as text
    PRIMARY KEY (owner, form_id)
);

CREATE INDEX IF NOT EXISTS documents_namespace_idx ON documents(namespace);
CREATE INDEX IF NOT EXISTS form_slugs_slug_idx     ON form_slugs(slug, created_at);

PRAGMA user_version = 1;
";

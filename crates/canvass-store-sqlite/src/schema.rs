//! SQL schema for the Canvass SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id    TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL,
    role       TEXT NOT NULL    -- 'admin' | 'editor' | 'viewer'
);

CREATE TABLE IF NOT EXISTS contacts (
    contact_id       TEXT PRIMARY KEY,
    display_id       INTEGER NOT NULL UNIQUE,  -- system-assigned, never reused
    first_name       TEXT NOT NULL,
    middle_name      TEXT,
    last_name        TEXT NOT NULL,
    full_name        TEXT NOT NULL,
    date_of_birth    TEXT,            -- ISO 8601 date
    street           TEXT,
    city             TEXT,
    state            TEXT,
    zip              TEXT,
    precinct         TEXT,
    district         TEXT,
    party            TEXT,            -- affiliation code, e.g. 'D'
    supporter_status TEXT NOT NULL DEFAULT 'unknown',
    volunteer_status TEXT NOT NULL DEFAULT 'none',
    notes            TEXT,
    updated_at       TEXT NOT NULL    -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS contact_aliases (
    alias_id   TEXT PRIMARY KEY,
    contact_id TEXT NOT NULL REFERENCES contacts(contact_id),
    alias      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contact_phones (
    phone_id   TEXT PRIMARY KEY,
    contact_id TEXT NOT NULL REFERENCES contacts(contact_id),
    number     TEXT NOT NULL,
    kind       TEXT NOT NULL,       -- 'mobile' | 'home' | 'work' | 'other'
    is_primary INTEGER NOT NULL DEFAULT 0,
    provenance TEXT NOT NULL        -- 'manual' | 'baseline'
);

CREATE TABLE IF NOT EXISTS contact_emails (
    email_id   TEXT PRIMARY KEY,
    contact_id TEXT NOT NULL REFERENCES contacts(contact_id),
    address    TEXT NOT NULL,
    kind       TEXT NOT NULL,       -- 'personal' | 'work' | 'other'
    is_primary INTEGER NOT NULL DEFAULT 0,
    provenance TEXT NOT NULL        -- 'manual' | 'baseline'
);

-- The audit log is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS audit_log (
    entry_id   TEXT PRIMARY KEY,
    contact_id TEXT NOT NULL REFERENCES contacts(contact_id),
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    field      TEXT NOT NULL,       -- column name, or 'phone' | 'email' | 'alias'
    action     TEXT NOT NULL,       -- 'create' | 'update' | 'delete'
    old_value  TEXT,
    new_value  TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS contacts_last_name_idx  ON contacts(last_name);
CREATE INDEX IF NOT EXISTS contacts_city_idx       ON contacts(city);
CREATE INDEX IF NOT EXISTS contacts_updated_idx    ON contacts(updated_at);
CREATE INDEX IF NOT EXISTS aliases_contact_idx     ON contact_aliases(contact_id);
CREATE INDEX IF NOT EXISTS phones_contact_idx      ON contact_phones(contact_id);
CREATE INDEX IF NOT EXISTS emails_contact_idx      ON contact_emails(contact_id);
CREATE INDEX IF NOT EXISTS audit_contact_idx       ON audit_log(contact_id);
CREATE INDEX IF NOT EXISTS audit_field_idx         ON audit_log(contact_id, field);

PRAGMA user_version = 1;
";

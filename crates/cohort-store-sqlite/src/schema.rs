//! SQL schema for the cohort SQLite store.
//!
//! Column order matches `cohort_core::schema`; reads and inserts rely on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    id                 TEXT PRIMARY KEY,
    first_name         TEXT NOT NULL,
    last_name          TEXT NOT NULL,
    email              TEXT,
    phone              TEXT,
    linkedin_url       TEXT,
    major              TEXT,
    job_search_status  TEXT NOT NULL,
    gpa                REAL,
    graduation_year    INTEGER,
    interests          TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    target_industries  TEXT NOT NULL DEFAULT '[]',
    target_roles       TEXT NOT NULL DEFAULT '[]',
    is_active          INTEGER NOT NULL DEFAULT 0,
    needs_sponsorship  INTEGER NOT NULL DEFAULT 0,
    created_at         TEXT NOT NULL,                -- RFC 3339, microseconds, Z
    updated_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    id          TEXT PRIMARY KEY,
    person_id   TEXT NOT NULL REFERENCES people(id),
    content     TEXT NOT NULL,
    type        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS interactions (
    id                TEXT PRIMARY KEY,
    person_id         TEXT NOT NULL REFERENCES people(id),
    scheduled_at      TEXT NOT NULL,
    duration_minutes  INTEGER,
    type              TEXT NOT NULL,
    status            TEXT NOT NULL,
    attended          INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS notes_person_idx        ON notes(person_id);
CREATE INDEX IF NOT EXISTS interactions_person_idx ON interactions(person_id);

PRAGMA user_version = 1;
";

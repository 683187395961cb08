//! SQL schema for the Karir SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,             -- argon2 PHC string
    role          TEXT NOT NULL CHECK (role IN ('admin', 'user')),
    created_at    TEXT NOT NULL
);

-- Bearer sessions. Only the SHA-256 digest of a token is stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    issued_at  TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

-- user_id is the ownership anchor; at most one profile per user.
CREATE TABLE IF NOT EXISTS alumni (
    alumni_id       TEXT PRIMARY KEY,
    student_number  TEXT NOT NULL UNIQUE,
    name            TEXT NOT NULL,
    major           TEXT NOT NULL,
    entry_year      INTEGER NOT NULL,
    graduation_year INTEGER NOT NULL,
    email           TEXT NOT NULL,
    phone           TEXT NOT NULL,
    address         TEXT,
    user_id         TEXT UNIQUE REFERENCES users(user_id),
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

-- deleted_at is the lifecycle marker: NULL = active, timestamp = trashed.
CREATE TABLE IF NOT EXISTS employment (
    employment_id TEXT PRIMARY KEY,
    alumni_id     TEXT NOT NULL REFERENCES alumni(alumni_id),
    company       TEXT NOT NULL,
    position      TEXT NOT NULL,
    industry      TEXT NOT NULL,
    location      TEXT NOT NULL,
    salary_range  TEXT,
    start_date    TEXT NOT NULL,             -- YYYY-MM-DD
    end_date      TEXT,                      -- NULL = ongoing
    status        TEXT NOT NULL,             -- 'active' | 'resigned' | 'contract_ended'
    description   TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    deleted_at    TEXT,
    CHECK (deleted_at IS NULL OR deleted_at >= created_at)
);

CREATE TRIGGER IF NOT EXISTS employment_alumni_immutable
BEFORE UPDATE OF alumni_id ON employment
WHEN NEW.alumni_id IS NOT OLD.alumni_id
BEGIN
    SELECT RAISE(ABORT, 'employment.alumni_id is immutable');
END;

CREATE INDEX IF NOT EXISTS employment_alumni_idx  ON employment(alumni_id);
CREATE INDEX IF NOT EXISTS employment_deleted_idx ON employment(deleted_at);
CREATE INDEX IF NOT EXISTS employment_company_idx ON employment(company);
CREATE INDEX IF NOT EXISTS sessions_expiry_idx    ON sessions(expires_at);

PRAGMA user_version = 1;
";

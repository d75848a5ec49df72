//! SQL schema for the Devlink SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    avatar        TEXT NOT NULL,
    created_at    TEXT NOT NULL    -- RFC 3339 UTC, fixed width
);

-- One profile document per user.
CREATE TABLE IF NOT EXISTS profiles (
    user_id    TEXT PRIMARY KEY REFERENCES users(user_id) ON DELETE CASCADE,
    doc        TEXT NOT NULL,      -- JSON-encoded Profile
    updated_at TEXT NOT NULL
);

-- Posts outlive nothing but their own deletion; likes and comments are
-- embedded in the document.
CREATE TABLE IF NOT EXISTS posts (
    post_id    TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    doc        TEXT NOT NULL       -- JSON-encoded Post
);

CREATE INDEX IF NOT EXISTS posts_user_idx    ON posts(user_id);
CREATE INDEX IF NOT EXISTS posts_created_idx ON posts(created_at);

PRAGMA user_version = 1;
";

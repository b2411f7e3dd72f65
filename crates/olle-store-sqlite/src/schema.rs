//! SQL schema for the account settings store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id                       TEXT PRIMARY KEY,
    nickname                         TEXT NOT NULL UNIQUE,
    email                            TEXT NOT NULL UNIQUE,
    password                         TEXT NOT NULL,
    joined_at                        TEXT NOT NULL,   -- RFC 3339 UTC
    bio                              TEXT,
    url                              TEXT,
    occupation                       TEXT,
    location                         TEXT,
    profile_image                    TEXT,
    study_create_by_email            INTEGER NOT NULL DEFAULT 0,
    study_create_by_web              INTEGER NOT NULL DEFAULT 1,
    study_enrollment_result_by_email INTEGER NOT NULL DEFAULT 0,
    study_enrollment_result_by_web   INTEGER NOT NULL DEFAULT 1,
    study_update_by_email            INTEGER NOT NULL DEFAULT 0,
    study_update_by_web              INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id TEXT PRIMARY KEY,
    title  TEXT NOT NULL UNIQUE
);

-- Reference data; seeded, never created by the association flow.
CREATE TABLE IF NOT EXISTS zones (
    zone_id            TEXT PRIMARY KEY,
    city               TEXT NOT NULL,
    local_name_of_city TEXT NOT NULL,
    province           TEXT NOT NULL,
    UNIQUE (city, province)
);

CREATE TABLE IF NOT EXISTS account_tags (
    account_id TEXT NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    tag_id     TEXT NOT NULL REFERENCES tags(tag_id)         ON DELETE CASCADE,
    PRIMARY KEY (account_id, tag_id)
);

CREATE TABLE IF NOT EXISTS account_zones (
    account_id TEXT NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    zone_id    TEXT NOT NULL REFERENCES zones(zone_id)       ON DELETE CASCADE,
    PRIMARY KEY (account_id, zone_id)
);

PRAGMA user_version = 1;
";

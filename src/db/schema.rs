//! SQL DDL for initializing the credential storage.
//!
//! Both dialects create the same four tables:
//! - `"user"`: surrogate id only
//! - `client`: pre-provisioned client applications and their shared secret
//! - `credentials`: one linked platform account per row
//! - `userbase`: user/client membership, one row per link attempt
//!
//! `credentials` is unique on (platform_name, platform_id) so one external
//! account never maps to two users, and on (user_id, platform_name) so a
//! token lookup by user and platform is unambiguous.

/// SQLite schema. Foreign keys are enforced by the connect options.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS "user" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS client (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL DEFAULT '',
    secret BLOB NULL
);

CREATE TABLE IF NOT EXISTS credentials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES "user"(id),
    platform_name TEXT NOT NULL,
    platform_id TEXT NOT NULL,
    connection_string TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(platform_name, platform_id),
    UNIQUE(user_id, platform_name)
);

CREATE TABLE IF NOT EXISTS userbase (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES "user"(id),
    client_id INTEGER NOT NULL REFERENCES client(id),
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_userbase_user_id ON userbase(user_id);
"#;

/// PostgreSQL schema.
pub const POSTGRES_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS "user" (
    id BIGSERIAL PRIMARY KEY,
    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS client (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    secret BYTEA NULL
);

CREATE TABLE IF NOT EXISTS credentials (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL REFERENCES "user"(id),
    platform_name TEXT NOT NULL,
    platform_id TEXT NOT NULL,
    connection_string TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(platform_name, platform_id),
    UNIQUE(user_id, platform_name)
);

CREATE TABLE IF NOT EXISTS userbase (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL REFERENCES "user"(id),
    client_id BIGINT NOT NULL REFERENCES client(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_userbase_user_id ON userbase(user_id);
"#;

/// Split a bundled DDL script into individual statements.
///
/// sqlx prepares one statement per query, so scripts are executed piecewise.
pub(crate) fn statements(script: &str) -> impl Iterator<Item = &str> {
    script.split(';').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_dialects_define_the_same_statement_count() {
        assert_eq!(
            statements(SQLITE_INIT).count(),
            statements(POSTGRES_INIT).count()
        );
        assert_eq!(statements(SQLITE_INIT).count(), 5);
    }
}

//! `SQLite`-backed credential and session storage.
//!
//! Users and sessions live in `data/auth.db` by default (override with
//! `SAFE_STEPS_AUTH_DB`). Uses `switchy_database` for all database
//! operations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use switchy_database_connection::init_sqlite_rusqlite;

use crate::{AuthError, CredentialStore, Session, UserRecord};

/// Default path for the auth database.
pub const DEFAULT_DB_PATH: &str = "data/auth.db";

/// Environment variable overriding [`DEFAULT_DB_PATH`].
pub const DB_PATH_ENV: &str = "SAFE_STEPS_AUTH_DB";

/// Returns the auth database path from [`DB_PATH_ENV`], falling back to
/// [`DEFAULT_DB_PATH`].
#[must_use]
pub fn db_path_from_env() -> PathBuf {
    std::env::var(DB_PATH_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from)
}

/// [`CredentialStore`] over a `switchy_database` connection.
pub struct SqliteCredentialStore {
    db: Box<dyn Database>,
}

impl SqliteCredentialStore {
    /// Opens (or creates) the auth `SQLite` database and ensures the schema
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the database cannot be opened or schema
    /// creation fails.
    pub async fn open(path: &Path) -> Result<Self, AuthError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AuthError::Database(e.to_string()))?;
        }

        let db = init_sqlite_rusqlite(Some(path)).map_err(|e| AuthError::Database(e.to_string()))?;

        Self::with_database(db).await
    }

    /// Wraps an existing connection, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Database`] if schema creation fails.
    pub async fn with_database(db: Box<dyn Database>) -> Result<Self, AuthError> {
        ensure_schema(db.as_ref()).await?;
        Ok(Self { db })
    }
}

/// Creates all tables if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), AuthError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS users (
            username       TEXT PRIMARY KEY,
            password_hash  TEXT NOT NULL,
            created_at     TEXT NOT NULL
        )",
    )
    .await
    .map_err(|e| AuthError::Database(e.to_string()))?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS sessions (
            token       TEXT PRIMARY KEY,
            username    TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            expires_at  TEXT NOT NULL
        )",
    )
    .await
    .map_err(|e| AuthError::Database(e.to_string()))?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_sessions_username
         ON sessions (username)",
    )
    .await
    .map_err(|e| AuthError::Database(e.to_string()))?;

    // Enable foreign key enforcement (SQLite has it off by default)
    db.exec_raw("PRAGMA foreign_keys = ON")
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

    Ok(())
}

/// Formats a timestamp as fixed-width UTC RFC 3339 so stored values sort
/// chronologically as text.
fn stored_time(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Whether a database error message reports a `UNIQUE`/`PRIMARY KEY`
/// constraint violation.
fn is_unique_violation(message: &str) -> bool {
    message.contains("UNIQUE constraint failed") || message.contains("PRIMARY KEY constraint")
}

fn parse_stored_time(value: &str) -> Result<DateTime<Utc>, AuthError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AuthError::Database(format!("Invalid stored timestamp '{value}': {e}")))
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_user(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT username, password_hash, created_at FROM users WHERE username = $1",
                &[DatabaseValue::String(username.to_string())],
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let created_at: String = row.to_value("created_at").unwrap_or_default();

        Ok(Some(UserRecord {
            username: row.to_value("username").unwrap_or_default(),
            password_hash: row.to_value("password_hash").unwrap_or_default(),
            created_at: parse_stored_time(&created_at)?,
        }))
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<(), AuthError> {
        if self.find_user(&user.username).await?.is_some() {
            return Err(AuthError::UserExists {
                username: user.username.clone(),
            });
        }

        self.db
            .exec_raw_params(
                "INSERT INTO users (username, password_hash, created_at)
                 VALUES ($1, $2, $3)",
                &[
                    DatabaseValue::String(user.username.clone()),
                    DatabaseValue::String(user.password_hash.clone()),
                    DatabaseValue::String(stored_time(user.created_at)),
                ],
            )
            .await
            .map_err(|e| {
                let message = e.to_string();
                if is_unique_violation(&message) {
                    AuthError::UserExists {
                        username: user.username.clone(),
                    }
                } else {
                    AuthError::Database(message)
                }
            })?;

        Ok(())
    }

    async fn insert_session(&self, session: &Session) -> Result<(), AuthError> {
        self.db
            .exec_raw_params(
                "INSERT INTO sessions (token, username, expires_at)
                 VALUES ($1, $2, $3)",
                &[
                    DatabaseValue::String(session.token.clone()),
                    DatabaseValue::String(session.username.clone()),
                    DatabaseValue::String(stored_time(session.expires_at)),
                ],
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, AuthError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT token, username, expires_at FROM sessions WHERE token = $1",
                &[DatabaseValue::String(token.to_string())],
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let expires_at: String = row.to_value("expires_at").unwrap_or_default();

        Ok(Some(Session {
            token: row.to_value("token").unwrap_or_default(),
            username: row.to_value("username").unwrap_or_default(),
            expires_at: parse_stored_time(&expires_at)?,
        }))
    }

    async fn delete_session(&self, token: &str) -> Result<bool, AuthError> {
        let deleted = self
            .db
            .exec_raw_params(
                "DELETE FROM sessions WHERE token = $1",
                &[DatabaseValue::String(token.to_string())],
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(deleted > 0)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        self.db
            .exec_raw_params(
                "DELETE FROM sessions WHERE expires_at <= $1",
                &[DatabaseValue::String(stored_time(now))],
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    struct TempDb(PathBuf);

    impl TempDb {
        fn new() -> Self {
            Self(std::env::temp_dir().join(format!(
                "safe_steps_auth_test_{}.db",
                uuid::Uuid::new_v4()
            )))
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn user(username: &str) -> UserRecord {
        UserRecord {
            username: username.to_string(),
            password_hash: "$argon2id$v=19$stub".to_string(),
            created_at: DateTime::parse_from_rfc3339("2025-10-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[tokio::test]
    async fn stores_and_finds_users() {
        let path = TempDb::new();
        let store = SqliteCredentialStore::open(&path.0).await.unwrap();

        store.insert_user(&user("jan.kowalski")).await.unwrap();

        let found = store.find_user("jan.kowalski").await.unwrap().unwrap();
        assert_eq!(found, user("jan.kowalski"));
        assert!(store.find_user("anna.nowak").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let path = TempDb::new();
        let store = SqliteCredentialStore::open(&path.0).await.unwrap();

        store.insert_user(&user("jan.kowalski")).await.unwrap();
        assert!(matches!(
            store.insert_user(&user("jan.kowalski")).await,
            Err(AuthError::UserExists { username }) if username == "jan.kowalski"
        ));
    }

    #[tokio::test]
    async fn sessions_round_trip_and_delete() {
        let path = TempDb::new();
        let store = SqliteCredentialStore::open(&path.0).await.unwrap();
        store.insert_user(&user("jan.kowalski")).await.unwrap();

        let session = Session {
            token: "abc".to_string(),
            username: "jan.kowalski".to_string(),
            expires_at: user("x").created_at + Duration::days(30),
        };
        store.insert_session(&session).await.unwrap();

        assert_eq!(store.find_session("abc").await.unwrap(), Some(session));
        assert!(store.delete_session("abc").await.unwrap());
        assert!(!store.delete_session("abc").await.unwrap());
        assert_eq!(store.find_session("abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_registration_of_one_name_yields_user_exists() {
        let path = TempDb::new();
        let store = SqliteCredentialStore::open(&path.0).await.unwrap();

        let user_a = user("jan.kowalski");
        let user_b = user("jan.kowalski");
        let (first, second) = tokio::join!(store.insert_user(&user_a), store.insert_user(&user_b),);

        let mut results = [first, second];
        results.sort_by_key(Result::is_err);
        assert!(results[0].is_ok());
        assert!(matches!(
            &results[1],
            Err(AuthError::UserExists { username }) if username == "jan.kowalski"
        ));
    }

    #[test]
    fn recognizes_unique_violations() {
        assert!(is_unique_violation("UNIQUE constraint failed: users.username"));
        assert!(is_unique_violation(
            "SqliteError: UNIQUE constraint failed: sessions.token"
        ));
        assert!(!is_unique_violation("FOREIGN KEY constraint failed"));
        assert!(!is_unique_violation("database is locked"));
    }

    #[tokio::test]
    async fn purges_only_expired_sessions() {
        let path = TempDb::new();
        let store = SqliteCredentialStore::open(&path.0).await.unwrap();
        store.insert_user(&user("jan.kowalski")).await.unwrap();

        let now = user("x").created_at;
        for (token, expires_at) in [
            ("stale", now - Duration::days(1)),
            ("boundary", now),
            ("live", now + Duration::milliseconds(1)),
        ] {
            store
                .insert_session(&Session {
                    token: token.to_string(),
                    username: "jan.kowalski".to_string(),
                    expires_at,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.delete_expired_sessions(now).await.unwrap(), 2);
        assert_eq!(store.find_session("stale").await.unwrap(), None);
        assert_eq!(store.find_session("boundary").await.unwrap(), None);
        assert!(store.find_session("live").await.unwrap().is_some());
        assert_eq!(store.delete_expired_sessions(now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reopening_keeps_data() {
        let path = TempDb::new();
        {
            let store = SqliteCredentialStore::open(&path.0).await.unwrap();
            store.insert_user(&user("jan.kowalski")).await.unwrap();
        }
        let store = SqliteCredentialStore::open(&path.0).await.unwrap();
        assert!(store.find_user("jan.kowalski").await.unwrap().is_some());
    }
}

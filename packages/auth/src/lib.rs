#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Credentials identity provider for `SafeSteps`.
//!
//! The server only depends on the [`IdentityProvider`] trait. The
//! provided implementation, [`CredentialsProvider`], checks a
//! username/password against a [`CredentialStore`] and issues opaque
//! session tokens that expire after [`SESSION_LIFETIME_DAYS`] days.
//! [`store::SqliteCredentialStore`] persists users and sessions in
//! `SQLite`.

pub mod password;
pub mod store;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long a session stays valid after sign-in.
pub const SESSION_LIFETIME_DAYS: i64 = 30;

/// Errors from identity operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password; both are reported identically.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Registration for a username that is already taken.
    #[error("User '{username}' already exists")]
    UserExists {
        /// The rejected username.
        username: String,
    },

    /// Registration with a malformed username.
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Registration with a password that does not meet the policy.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Hashing a password failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),
}

/// A username/password pair as submitted by the sign-in form.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Username (e.g. `jan.kowalski`).
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque token carried by the session cookie.
    #[serde(skip_serializing)]
    pub token: String,
    /// Who the session belongs to.
    pub username: String,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is past its expiry at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique username.
    pub username: String,
    /// Argon2id PHC hash of the password.
    pub password_hash: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Resolves credentials into sessions and manages their lifecycle.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies credentials and opens a new session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the credentials do not
    /// match a user, or a storage error.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// Looks up a live session by token. Expired sessions are `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] on storage failure.
    async fn session(&self, token: &str) -> Result<Option<Session>, AuthError>;

    /// Ends a session. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] on storage failure.
    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;
}

/// Persistence for users and sessions.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetches a user by username.
    async fn find_user(&self, username: &str) -> Result<Option<UserRecord>, AuthError>;

    /// Inserts a new user; fails with [`AuthError::UserExists`] on a
    /// duplicate username.
    async fn insert_user(&self, user: &UserRecord) -> Result<(), AuthError>;

    /// Persists a new session.
    async fn insert_session(&self, session: &Session) -> Result<(), AuthError>;

    /// Fetches a session by token, expired or not.
    async fn find_session(&self, token: &str) -> Result<Option<Session>, AuthError>;

    /// Removes a session; returns whether one was removed.
    async fn delete_session(&self, token: &str) -> Result<bool, AuthError>;

    /// Removes every session that expired at or before `now`; returns how
    /// many were removed.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}

/// [`IdentityProvider`] that checks username/password pairs against a
/// [`CredentialStore`].
pub struct CredentialsProvider<S> {
    store: S,
}

impl<S: CredentialStore> CredentialsProvider<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new user after validating the username and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidUsername`], [`AuthError::WeakPassword`],
    /// [`AuthError::UserExists`] or a storage/hashing error.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        password::validate_username(username)?;
        password::validate_password(password)?;

        let user = UserRecord {
            username: username.to_string(),
            password_hash: password::hash_password(password)?,
            created_at: Utc::now(),
        };
        self.store.insert_user(&user).await?;

        log::info!("Registered user {username}");
        Ok(())
    }
}

#[async_trait]
impl<S: CredentialStore> IdentityProvider for CredentialsProvider<S> {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let Some(user) = self.store.find_user(credentials.username.trim()).await? else {
            log::debug!("Sign-in for unknown user {:?}", credentials.username);
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(&credentials.password, &user.password_hash) {
            log::debug!("Wrong password for {}", user.username);
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let purged = self.store.delete_expired_sessions(now).await?;
        if purged > 0 {
            log::debug!("Purged {purged} expired session(s)");
        }

        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            username: user.username,
            expires_at: now + Duration::days(SESSION_LIFETIME_DAYS),
        };
        self.store.insert_session(&session).await?;

        log::info!("User {} signed in", session.username);
        Ok(session)
    }

    async fn session(&self, token: &str) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.store.find_session(token).await? else {
            return Ok(None);
        };

        if session.is_expired_at(Utc::now()) {
            self.store.delete_session(token).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        if self.store.delete_session(token).await? {
            log::debug!("Session ended");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        users: Mutex<BTreeMap<String, UserRecord>>,
        sessions: Mutex<BTreeMap<String, Session>>,
    }

    #[async_trait]
    impl CredentialStore for MemoryStore {
        async fn find_user(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
            Ok(self.users.lock().unwrap().get(username).cloned())
        }

        async fn insert_user(&self, user: &UserRecord) -> Result<(), AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&user.username) {
                return Err(AuthError::UserExists {
                    username: user.username.clone(),
                });
            }
            users.insert(user.username.clone(), user.clone());
            Ok(())
        }

        async fn insert_session(&self, session: &Session) -> Result<(), AuthError> {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.token.clone(), session.clone());
            Ok(())
        }

        async fn find_session(&self, token: &str) -> Result<Option<Session>, AuthError> {
            Ok(self.sessions.lock().unwrap().get(token).cloned())
        }

        async fn delete_session(&self, token: &str) -> Result<bool, AuthError> {
            Ok(self.sessions.lock().unwrap().remove(token).is_some())
        }

        async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
            let mut sessions = self.sessions.lock().unwrap();
            let before = sessions.len();
            sessions.retain(|_, session| !session.is_expired_at(now));
            Ok((before - sessions.len()) as u64)
        }
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    async fn provider_with_user() -> CredentialsProvider<MemoryStore> {
        let provider = CredentialsProvider::new(MemoryStore::default());
        provider
            .register("jan.kowalski", "tajne-haslo-123")
            .await
            .unwrap();
        provider
    }

    #[tokio::test]
    async fn signs_in_with_correct_password() {
        let provider = provider_with_user().await;
        let session = provider
            .sign_in(&credentials("jan.kowalski", "tajne-haslo-123"))
            .await
            .unwrap();

        assert_eq!(session.username, "jan.kowalski");
        assert!(session.expires_at > Utc::now() + Duration::days(SESSION_LIFETIME_DAYS - 1));

        let found = provider.session(&session.token).await.unwrap();
        assert_eq!(found, Some(session));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let provider = provider_with_user().await;

        let wrong = provider
            .sign_in(&credentials("jan.kowalski", "zle-haslo-123"))
            .await
            .unwrap_err();
        let unknown = provider
            .sign_in(&credentials("anna.nowak", "tajne-haslo-123"))
            .await
            .unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let provider = provider_with_user().await;
        let err = provider
            .register("jan.kowalski", "inne-haslo-456")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserExists { .. }));
    }

    #[tokio::test]
    async fn registration_validates_input() {
        let provider = CredentialsProvider::new(MemoryStore::default());
        assert!(matches!(
            provider.register("x", "tajne-haslo-123").await,
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(matches!(
            provider.register("jan.kowalski", "krotkie").await,
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[tokio::test]
    async fn sign_out_ends_session() {
        let provider = provider_with_user().await;
        let session = provider
            .sign_in(&credentials("jan.kowalski", "tajne-haslo-123"))
            .await
            .unwrap();

        provider.sign_out(&session.token).await.unwrap();
        assert_eq!(provider.session(&session.token).await.unwrap(), None);

        // Signing out twice is harmless.
        provider.sign_out(&session.token).await.unwrap();
    }

    #[tokio::test]
    async fn expired_session_is_absent_and_removed() {
        let provider = provider_with_user().await;
        let expired = Session {
            token: "expired-token".to_string(),
            username: "jan.kowalski".to_string(),
            expires_at: Utc::now() - Duration::minutes(1),
        };
        provider.store.insert_session(&expired).await.unwrap();

        assert_eq!(provider.session("expired-token").await.unwrap(), None);
        assert_eq!(
            provider.store.find_session("expired-token").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn sign_in_purges_expired_sessions() {
        let provider = provider_with_user().await;
        for (token, offset) in [("stale-1", -60), ("stale-2", -1), ("live", 60)] {
            provider
                .store
                .insert_session(&Session {
                    token: token.to_string(),
                    username: "jan.kowalski".to_string(),
                    expires_at: Utc::now() + Duration::minutes(offset),
                })
                .await
                .unwrap();
        }

        let session = provider
            .sign_in(&credentials("jan.kowalski", "tajne-haslo-123"))
            .await
            .unwrap();

        let sessions = provider.store.sessions.lock().unwrap();
        assert!(!sessions.contains_key("stale-1"));
        assert!(!sessions.contains_key("stale-2"));
        assert!(sessions.contains_key("live"));
        assert!(sessions.contains_key(&session.token));
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_sessions_alone() {
        let provider = provider_with_user().await;
        provider
            .store
            .insert_session(&Session {
                token: "stale".to_string(),
                username: "jan.kowalski".to_string(),
                expires_at: Utc::now() - Duration::minutes(1),
            })
            .await
            .unwrap();

        provider
            .sign_in(&credentials("jan.kowalski", "zle-haslo-123"))
            .await
            .unwrap_err();

        assert!(provider.store.find_session("stale").await.unwrap().is_some());
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let debug = format!("{:?}", credentials("jan.kowalski", "tajne-haslo-123"));
        assert!(debug.contains("jan.kowalski"));
        assert!(!debug.contains("tajne-haslo-123"));
    }

    #[test]
    fn session_serialization_omits_token() {
        let session = Session {
            token: "secret".to_string(),
            username: "jan.kowalski".to_string(),
            expires_at: Utc::now(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("expiresAt"));
    }
}

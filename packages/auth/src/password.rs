//! Password hashing and credential validation.
//!
//! Passwords are stored as Argon2id hashes in PHC string format.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::AuthError;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum accepted username length, in characters.
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Hashes a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns [`AuthError::PasswordHash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// A malformed stored hash verifies as `false`.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("Stored password hash is malformed: {e}");
            false
        }
    }
}

/// Checks a username for registration.
///
/// Usernames are 3 to [`MAX_USERNAME_LENGTH`] characters of ASCII letters,
/// digits, `.`, `_` or `-` (e.g. `jan.kowalski`).
///
/// # Errors
///
/// Returns [`AuthError::InvalidUsername`] explaining the violation.
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    let len = username.chars().count();
    if len < 3 {
        return Err(AuthError::InvalidUsername(
            "Username must be at least 3 characters long".to_string(),
        ));
    }
    if len > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidUsername(format!(
            "Username must be at most {MAX_USERNAME_LENGTH} characters long"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(AuthError::InvalidUsername(
            "Username may only contain letters, digits, '.', '_' and '-'".to_string(),
        ));
    }
    Ok(())
}

/// Checks a password for registration.
///
/// # Errors
///
/// Returns [`AuthError::WeakPassword`] if the password is shorter than
/// [`MIN_PASSWORD_LENGTH`] or entirely whitespace.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    if password.trim().is_empty() {
        return Err(AuthError::WeakPassword(
            "Password cannot be only whitespace".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("bezpieczne-haslo").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("bezpieczne-haslo", &hash));
        assert!(!verify_password("inne-haslo", &hash));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("bezpieczne-haslo").unwrap();
        let b = hash_password("bezpieczne-haslo").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_does_not_verify() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn accepts_typical_username() {
        assert!(validate_username("jan.kowalski").is_ok());
        assert!(validate_username("anna_nowak-2").is_ok());
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(validate_username("jk").is_err());
        assert!(validate_username("jan kowalski").is_err());
        assert!(validate_username("żaneta").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn password_length_is_enforced() {
        assert!(matches!(
            validate_password("krótkie"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("wystarczająco").is_ok());
        assert!(validate_password("         ").is_err());
    }
}

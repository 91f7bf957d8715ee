//! The `add-user` command.

use dialoguer::{Input, Password};
use safe_steps_auth::store::{SqliteCredentialStore, db_path_from_env};
use safe_steps_auth::{CredentialsProvider, password::MIN_PASSWORD_LENGTH};

/// Prompts for a password (twice) and registers `username`, prompting for
/// the username too when it is not given.
///
/// # Errors
///
/// Returns an error if a prompt fails, the credentials are rejected, the
/// user already exists, or the auth database is unavailable.
pub async fn add_user(username: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let username = match username {
        Some(username) => username,
        None => Input::new()
            .with_prompt("Username")
            .with_initial_text("jan.kowalski")
            .interact_text()?,
    };

    let password = Password::new()
        .with_prompt(format!("Password (min. {MIN_PASSWORD_LENGTH} characters)"))
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    let db_path = db_path_from_env();
    let store = SqliteCredentialStore::open(&db_path).await?;
    CredentialsProvider::new(store)
        .register(username.trim(), &password)
        .await?;

    println!("Added user {} to {}", username.trim(), db_path.display());
    Ok(())
}

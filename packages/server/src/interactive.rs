//! Interactive mode for the server.
//!
//! Prompts for the bind address, port and incidents file before starting
//! the server.

use dialoguer::{Confirm, Input};
use safe_steps_zones::DATA_ENV;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks for a bind address, port and optional incidents file, exports
/// them as `BIND_ADDR`, `PORT` and `SAFE_STEPS_DATA`, and delegates to
/// [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("SafeSteps Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default("8080".to_string())
        .validate_with(|input: &String| {
            input
                .parse::<u16>()
                .map(|_| ())
                .map_err(|_| "Port must be a number between 0 and 65535")
        })
        .interact_text()
        .unwrap_or_else(|_| "8080".to_string());

    let data_path: String = Input::new()
        .with_prompt("Incidents JSON (empty for bundled data)")
        .default(std::env::var(DATA_ENV).unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
        if data_path.trim().is_empty() {
            std::env::remove_var(DATA_ENV);
        } else {
            std::env::set_var(DATA_ENV, data_path.trim());
        }
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for `SafeSteps`.
//!
//! With a subcommand, runs it directly; without one, lets the user pick
//! a tool interactively.
//!
//! Uses `indicatif-log-bridge` (via [`safe_steps_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod resolve;
mod users;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialoguer::Select;

#[derive(Parser)]
#[command(name = "safe_steps", about = "SafeSteps danger map toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode the incident records and print the resulting danger zones
    Resolve {
        /// Incidents JSON to read (defaults to `SAFE_STEPS_DATA`, then the bundled data)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Write the zones to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Add a user who can sign in
    AddUser {
        /// Username (e.g., "jan.kowalski")
        username: String,
    },
    /// Start the HTTP server
    Serve,
}

/// Top-level tool selection for interactive mode.
enum Tool {
    Resolve,
    AddUser,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[Self::Resolve, Self::AddUser, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Resolve => "Resolve danger zones",
            Self::AddUser => "Add user",
            Self::Server => "Start server",
        }
    }
}

/// Runs a server future on actix-web's runtime.
///
/// The server uses actix-web's runtime, so it runs in a blocking task to
/// avoid nesting tokio runtimes.
async fn serve<F, Fut>(start: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = std::io::Result<()>>,
{
    tokio::task::spawn_blocking(move || actix_web::rt::System::new().block_on(start()))
        .await??;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = safe_steps_cli_utils::init_logger();
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        match command {
            Commands::Resolve { data, output } => {
                resolve::run(&multi, data.as_deref(), output.as_deref()).await?;
            }
            Commands::AddUser { username } => users::add_user(Some(username)).await?,
            Commands::Serve => serve(safe_steps_server::run_server).await?,
        }
        return Ok(());
    }

    println!("SafeSteps");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Resolve => resolve::interactive(&multi).await?,
        Tool::AddUser => users::add_user(None).await?,
        Tool::Server => serve(safe_steps_server::interactive::run).await?,
    }

    Ok(())
}

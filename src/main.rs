//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `library_versioning` library that handles:
//! - Environment variable loading (.env file)
//! - Command-line argument parsing
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use library_versioning::cli::Cli;
use library_versioning::commands::execute;
use library_versioning::initialization::init_logger_with;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file (if it exists), so
    // SPVM_CLIENT_ID and SPVM_ACCESS_TOKEN need not be exported by hand.
    // Try the current directory first, then next to the executable.
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    let log_level = cli.log_level.clone();
    let log_format = cli.log_format.clone();
    if let Err(e) =
        init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")
    {
        eprintln!("library_versioning error: {e:#}");
        return ExitCode::FAILURE;
    }

    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("library_versioning error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

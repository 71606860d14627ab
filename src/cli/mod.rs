//! Command-line interface.

pub mod output;
pub mod report;
pub mod sync;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::constants::{API_URL_ENV, DEFAULT_API_URL, DEFAULT_CONFIG_FILE, TOKEN_ENV};

/// Secretsync - Declarative GitHub Actions secrets.
#[derive(Parser)]
#[command(
    name = "secretsync",
    about = "Declarative GitHub Actions secrets for repositories, environments and organizations",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Reconcile remote secrets with the configuration
    Sync {
        /// Configuration file (repeatable, loaded in order)
        #[arg(short = 'f', long = "file", default_value = DEFAULT_CONFIG_FILE)]
        files: Vec<PathBuf>,
        /// Show the plan without applying it
        #[arg(long, visible_alias = "dry")]
        dry_run: bool,
        /// API token
        #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
        token: Option<String>,
        /// API base URL
        #[arg(long, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
        api_url: String,
    },

    /// Check the configuration offline
    Validate {
        /// Configuration file (repeatable, loaded in order)
        #[arg(short = 'f', long = "file", default_value = DEFAULT_CONFIG_FILE)]
        files: Vec<PathBuf>,
    },
}

/// Execute a CLI command.
pub fn execute(command: Command) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Sync {
            files,
            dry_run,
            token,
            api_url,
        } => sync::execute(&files, dry_run, token, &api_url),
        Validate { files } => validate::execute(&files),
    }
}

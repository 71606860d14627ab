//! Secretsync - Declarative GitHub Actions secrets.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use secretsync::cli::output;
use secretsync::cli::{execute, Cli};
use secretsync::core::constants::LOG_ENV;
use secretsync::error::{ConfigError, Error};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("secretsync=debug")
        } else {
            EnvFilter::new("secretsync=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command) {
        let suggestion = match &e {
            Error::Config(ConfigError::MissingToken) => {
                Some("set GITHUB_API_TOKEN or pass --token")
            }
            Error::Config(ConfigError::ReadFile { .. }) => {
                Some("create secrets.yml or pass --file")
            }
            Error::UnsafeDeletion { .. } => {
                Some("nothing was applied; declare or stop using these secrets, then run again")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

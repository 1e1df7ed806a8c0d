//! autoevs - configuration resolution and credential encryption for collectors.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autoevs::cli::output;
use autoevs::cli::{execute, Cli};
use autoevs::error::{ConfigError, Error, SeedError, ToolError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("AUTOEVS_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("autoevs=debug")
        } else {
            EnvFilter::new("autoevs=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .init();

    if let Err(e) = execute(cli) {
        output::error(&e.to_string());
        if let Some(hint) = hint(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

/// Suggested next step for common failures.
fn hint(e: &Error) -> Option<&'static str> {
    match e {
        Error::Seed(SeedError::Missing { .. }) => Some("run: autoevs seed generate"),
        Error::Seed(SeedError::AlreadyExists { .. }) => Some("run: autoevs seed generate --force"),
        Error::Config(ConfigError::Decryption { source, .. }) => match &**source {
            Error::Seed(SeedError::Missing { .. }) => Some("run: autoevs seed generate"),
            _ => Some("check that the seed matches the one used to encrypt this environment"),
        },
        Error::Config(ConfigError::NoDefaultInstance { .. }) => {
            Some("pass an instance name or set default_instance in the component file")
        }
        Error::Config(ConfigError::NotFound { .. }) => Some("check --env and config_dir in autoevs.toml"),
        Error::Tool(ToolError::Unlocatable { .. }) => {
            Some("rewrite the value as a single-line scalar, or encrypt it with: autoevs encrypt-value")
        }
        _ => None,
    }
}

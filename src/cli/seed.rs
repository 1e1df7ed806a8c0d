//! Seed commands.
//!
//! `seed generate` writes a fresh seed file for the environment;
//! `seed status` reports where the seed would be loaded from.

use tracing::info;

use crate::cli::output;
use crate::core::cipher::CryptoContext;
use crate::core::settings::Settings;
use crate::core::store::{env_var_name, EnvVars, SeedStore};
use crate::error::Result;

/// Generate a seed file for the active environment.
pub fn generate(settings: &Settings, force: bool, print: bool) -> Result<()> {
    let environment = settings.environment.as_str();
    info!(environment, force, "generating seed");

    let files = settings.seed_files()?;
    let (seed, path) = files.generate(environment, force)?;
    let context = CryptoContext::new(environment, &seed)?;

    output::success(&format!("generated seed for environment '{}'", environment));
    output::kv("path", output::path(path.display()));
    output::kv("fingerprint", context.fingerprint());

    if EnvVars::new().has_specific(environment) {
        output::warn(&format!(
            "{} is set and takes precedence over this file",
            env_var_name(environment)
        ));
    }

    if print {
        println!("{}", seed.encode().as_str());
    } else {
        output::hint("keep this file out of version control and back it up securely");
    }

    Ok(())
}

/// Report the seed source and fingerprint for the active environment.
///
/// Fails with `SeedError::Missing` when no seed is available, so scripts can
/// test the exit status.
pub fn status(settings: &Settings) -> Result<()> {
    let environment = settings.environment.as_str();
    let store = settings.seed_store()?;

    output::section("Seed");
    output::kv("environment", environment);
    output::kv("source", store.location(environment));

    let seed = store.load_seed(environment)?;
    let context = CryptoContext::new(environment, &seed)?;
    output::kv("fingerprint", context.fingerprint());
    output::kv("length", format!("{} bytes", seed.len()));

    Ok(())
}

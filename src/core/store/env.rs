//! Environment-variable seed storage.
//!
//! Reads `AUTOEVS_CRYPTO_SEED_<ENV>` and falls back to the single
//! `AUTOEVS_CRYPTO_SEED` variable used by older deployments.

use std::collections::HashMap;

use tracing::debug;

use super::{env_var_name, Seed, SeedStore};
use crate::core::constants::SEED_ENV_VAR;
use crate::error::{Result, SeedError};

type Lookup = Box<dyn Fn(&str) -> Option<String>>;

/// Seed storage backed by process environment variables.
pub struct EnvVars {
    lookup: Lookup,
}

impl EnvVars {
    /// Read from the real process environment.
    pub fn new() -> Self {
        Self {
            lookup: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Read from a fixed map instead of the process environment.
    pub fn from_map(vars: HashMap<String, String>) -> Self {
        Self {
            lookup: Box::new(move |name| vars.get(name).cloned()),
        }
    }

    /// True when `AUTOEVS_CRYPTO_SEED_<ENV>` is set.
    pub fn has_specific(&self, environment: &str) -> bool {
        self.get(env_var_name(environment)).is_some()
    }

    /// True when the legacy `AUTOEVS_CRYPTO_SEED` is set.
    pub fn has_legacy(&self) -> bool {
        self.get(SEED_ENV_VAR.to_string()).is_some()
    }

    fn get(&self, name: String) -> Option<(String, String)> {
        (self.lookup)(&name)
            .filter(|v| !v.trim().is_empty())
            .map(|v| (name, v))
    }

    /// Find the variable holding the seed for `environment`, with its value.
    fn find(&self, environment: &str) -> Option<(String, String)> {
        self.get(env_var_name(environment))
            .or_else(|| self.get(SEED_ENV_VAR.to_string()))
    }
}

impl Default for EnvVars {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedStore for EnvVars {
    fn load_seed(&self, environment: &str) -> Result<Seed> {
        let (name, value) = self.find(environment).ok_or_else(|| SeedError::Missing {
            environment: environment.to_string(),
        })?;
        debug!(environment, variable = %name, "loading seed from environment");
        let value = zeroize::Zeroizing::new(value);
        Seed::parse(environment, &value)
    }

    fn has_seed(&self, environment: &str) -> bool {
        self.find(environment).is_some()
    }

    fn location(&self, environment: &str) -> String {
        match self.find(environment) {
            Some((name, _)) => format!("${}", name),
            None => format!("${}", env_var_name(environment)),
        }
    }
}

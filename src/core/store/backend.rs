//! Backend selection logic for seed storage.
//!
//! Lookup order for an environment:
//!
//! 1. `AUTOEVS_CRYPTO_SEED_<ENV>`, so containers and CI can inject seeds
//!    without touching disk
//! 2. `<seed_dir>/<env>.seed`
//! 3. the legacy `AUTOEVS_CRYPTO_SEED`, shared by every environment
//!
//! A leftover legacy variable never shadows a per-environment seed file.

use tracing::debug;

use super::{EnvVars, Filesystem, Seed, SeedStore};
use crate::error::Result;

/// Default backend: environment variables and seed files under `seed_dir`.
pub fn default_backend(fs: Filesystem) -> Box<dyn SeedStore> {
    Box::new(EnvThenFilesystem {
        env: EnvVars::new(),
        fs,
    })
}

/// Chained store over environment variables and seed files.
pub struct EnvThenFilesystem {
    pub env: EnvVars,
    pub fs: Filesystem,
}

/// Which backend answers for an environment.
enum Source {
    Env,
    File,
}

impl EnvThenFilesystem {
    fn source(&self, environment: &str) -> Source {
        if self.env.has_specific(environment) {
            Source::Env
        } else if self.fs.has_seed(environment) {
            Source::File
        } else if self.env.has_legacy() {
            Source::Env
        } else {
            Source::File
        }
    }
}

impl SeedStore for EnvThenFilesystem {
    fn load_seed(&self, environment: &str) -> Result<Seed> {
        match self.source(environment) {
            Source::Env => self.env.load_seed(environment),
            Source::File => {
                debug!(environment, "no seed variable for this environment, using seed file");
                self.fs.load_seed(environment)
            }
        }
    }

    fn has_seed(&self, environment: &str) -> bool {
        self.env.has_seed(environment) || self.fs.has_seed(environment)
    }

    fn location(&self, environment: &str) -> String {
        match self.source(environment) {
            Source::Env => self.env.location(environment),
            Source::File => self.fs.location(environment),
        }
    }
}

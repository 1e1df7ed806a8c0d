//! Filesystem-based seed storage implementation.
//!
//! Manages seed generation and retrieval from a per-environment file
//! (`<seed_dir>/<env>.seed`, default `~/.autoevs/seeds`).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{Seed, SeedStore};
use crate::core::constants::{SEED_DIR, SEED_EXTENSION};
use crate::core::validation;
use crate::error::{Result, SeedError};

/// Filesystem-based seed storage.
#[derive(Debug, Clone)]
pub struct Filesystem {
    dir: PathBuf,
}

impl Filesystem {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default seed directory (`~/.autoevs/seeds`).
    ///
    /// # Errors
    ///
    /// Returns `SeedError::NoHomeDir` if the home directory is unknown.
    pub fn default_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(SeedError::NoHomeDir)?;
        Ok(home.join(SEED_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the seed file for an environment.
    pub fn seed_path(&self, environment: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", environment, SEED_EXTENSION))
    }

    /// Generate and persist a fresh seed for an environment.
    ///
    /// The seed directory is created with 0700 and the file written with
    /// 0600 on Unix. An existing seed is only replaced when `force` is set.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::AlreadyExists` if a seed exists and `force` is
    /// false, or `SeedError::WriteFailed` on I/O failure.
    pub fn generate(&self, environment: &str, force: bool) -> Result<(Seed, PathBuf)> {
        let path = self.seed_path(environment);
        if path.exists() && !force {
            return Err(SeedError::AlreadyExists {
                environment: environment.to_string(),
                path,
            }
            .into());
        }
        if path.exists() {
            warn!(environment, path = %path.display(), "overwriting existing seed");
        }

        fs::create_dir_all(&self.dir).map_err(SeedError::WriteFailed)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o700))
                .map_err(SeedError::WriteFailed)?;
        }

        let seed = Seed::generate();
        let contents = zeroize::Zeroizing::new(format!(
            "# autoevs seed for environment '{}'\n\
             # generated {} by {}\n\
             # never commit this file or copy it into the configuration tree\n\
             {}\n",
            environment,
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            whoami::username(),
            seed.encode().as_str()
        ));
        write_private(&path, contents.as_bytes()).map_err(SeedError::WriteFailed)?;

        info!(environment, path = %path.display(), "seed generated");
        Ok((seed, path))
    }
}

/// Write `contents` to `path`, readable by the owner only.
///
/// The file is created with 0600 so the seed is never visible with looser
/// permissions; an existing file is narrowed to 0600 as well.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let mut file = fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .mode(0o600)
            .open(path)?;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        file.write_all(contents)?;
        file.flush()?;
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents)?;
    }

    Ok(())
}

impl SeedStore for Filesystem {
    fn load_seed(&self, environment: &str) -> Result<Seed> {
        let path = self.seed_path(environment);
        if !path.exists() {
            return Err(SeedError::Missing {
                environment: environment.to_string(),
            }
            .into());
        }

        if let Some(mode) = validation::loose_permissions(&path) {
            warn!(
                path = %path.display(),
                mode = %format!("{:o}", mode),
                "seed file is readable by other users; run chmod 600"
            );
        }

        debug!(environment, path = %path.display(), "loading seed file");
        let contents = zeroize::Zeroizing::new(
            fs::read_to_string(&path).map_err(SeedError::ReadFailed)?,
        );
        let material = contents
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'))
            .ok_or_else(|| {
                SeedError::InvalidFormat(format!("{} contains no seed", path.display()))
            })?;

        Seed::parse(environment, material)
    }

    fn has_seed(&self, environment: &str) -> bool {
        self.seed_path(environment).exists()
    }

    fn location(&self, environment: &str) -> String {
        self.seed_path(environment).display().to_string()
    }
}

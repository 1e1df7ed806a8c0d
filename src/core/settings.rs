//! Tool settings.
//!
//! Reads the optional `autoevs.toml` and applies environment variable
//! overrides on top of it:
//!
//! ```toml
//! [autoevs]
//! config_dir = "config"
//! seed_dir = "/etc/autoevs/seeds"
//! environment = "prod"
//!
//! [fields]
//! extend_defaults = true
//! include = ["apikey"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::core::constants::{
    CONFIG_DIR_VAR, DEFAULT_CONFIG_DIR, DEFAULT_ENVIRONMENT, ENV_VAR, SEED_DIR_VAR,
    SETTINGS_FILE, SETTINGS_VAR,
};
use crate::core::detect::{FieldDetector, FieldRules};
use crate::core::store::{default_backend, Filesystem, SeedStore};
use crate::core::validation::validate_environment;
use crate::error::{ConfigError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default)]
    autoevs: Section,
    #[serde(default)]
    fields: FieldRules,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Section {
    config_dir: Option<PathBuf>,
    seed_dir: Option<PathBuf>,
    environment: Option<String>,
}

/// Resolved tool settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Root of the `<env>/<component>.yaml` tree.
    pub config_dir: PathBuf,
    /// Seed directory; `None` means `~/.autoevs/seeds`.
    pub seed_dir: Option<PathBuf>,
    /// Active environment.
    pub environment: String,
    /// Field detection rules.
    pub fields: FieldRules,
    /// Settings file the values came from, if any.
    pub source: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            seed_dir: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            fields: FieldRules::default(),
            source: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, `$AUTOEVS_SETTINGS` or `./autoevs.toml`,
    /// then apply environment variable overrides.
    ///
    /// A missing `./autoevs.toml` is not an error; a missing file that was
    /// named explicitly is.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Settings` if the file cannot be read or parsed,
    /// or `ConfigError::InvalidName` for a malformed environment name.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Like [`Settings::load`], reading variables through `lookup`.
    pub fn load_with(path: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match var(SETTINGS_VAR) {
                Some(p) => (PathBuf::from(p), true),
                None => (PathBuf::from(SETTINGS_FILE), false),
            },
        };

        let mut settings = if path.is_file() {
            Self::from_file(&path)?
        } else if required {
            return Err(ConfigError::Settings {
                path,
                reason: "file not found".to_string(),
            }
            .into());
        } else {
            debug!(path = %path.display(), "no settings file, using defaults");
            Self::default()
        };

        if let Some(dir) = var(CONFIG_DIR_VAR) {
            settings.config_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var(SEED_DIR_VAR) {
            settings.seed_dir = Some(PathBuf::from(dir));
        }
        if let Some(env) = var(ENV_VAR) {
            settings.environment = env;
        }
        validate_environment(&settings.environment)?;

        Ok(settings)
    }

    /// Parse a settings file without applying overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading settings");
        let settings_error = |reason: String| ConfigError::Settings {
            path: path.to_path_buf(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| settings_error(e.to_string()))?;
        let file: SettingsFile =
            toml::from_str(&contents).map_err(|e| settings_error(e.to_string()))?;

        let defaults = Self::default();
        Ok(Self {
            config_dir: file.autoevs.config_dir.unwrap_or(defaults.config_dir),
            seed_dir: file.autoevs.seed_dir,
            environment: file.autoevs.environment.unwrap_or(defaults.environment),
            fields: file.fields,
            source: Some(path.to_path_buf()),
        })
    }

    /// Replace the environment when one is given (command-line `--env`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidName` for a malformed name.
    pub fn with_environment(mut self, environment: Option<String>) -> Result<Self> {
        if let Some(env) = environment {
            validate_environment(&env)?;
            self.environment = env;
        }
        Ok(self)
    }

    /// Directory holding the component files of `environment`.
    pub fn environment_dir(&self, environment: &str) -> PathBuf {
        self.config_dir.join(environment)
    }

    /// Filesystem seed backend for the configured seed directory.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::NoHomeDir` when no seed directory is configured
    /// and the home directory cannot be determined.
    pub fn seed_files(&self) -> Result<Filesystem> {
        let dir = match &self.seed_dir {
            Some(dir) => dir.clone(),
            None => Filesystem::default_dir()?,
        };
        Ok(Filesystem::new(dir))
    }

    /// Default seed backend: environment variables, then seed files.
    pub fn seed_store(&self) -> Result<Box<dyn SeedStore>> {
        Ok(default_backend(self.seed_files()?))
    }

    /// Field detector built from the `[fields]` rules.
    pub fn detector(&self) -> FieldDetector {
        FieldDetector::from_rules(&self.fields)
    }
}

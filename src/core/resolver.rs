//! Configuration resolution.
//!
//! Turns `(environment, component, instance)` into a merged, decrypted
//! mapping. Crypto contexts are created lazily, once per environment, the
//! first time an envelope is met; configurations without envelopes never
//! touch the seed store.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::core::cipher::{Cipher, CryptoContext};
use crate::core::constants::MASK;
use crate::core::detect::FieldDetector;
use crate::core::document::ConfigDocument;
use crate::core::settings::Settings;
use crate::core::store::SeedStore;
use crate::core::types::{ComponentName, Environment, InstanceName};
use crate::core::validation::{validate_component, validate_environment};
use crate::core::walk;
use crate::error::{ConfigError, Result};

/// What to do when a sensitive value cannot be decrypted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecryptMode {
    /// Fail the whole call.
    #[default]
    Strict,
    /// Log a warning and keep the envelope text. For display and diagnostics only.
    Tolerant,
}

/// Fully merged and decrypted configuration of one instance.
#[derive(Clone, PartialEq)]
pub struct ResolvedConfig {
    environment: Environment,
    component: ComponentName,
    instance: InstanceName,
    source: PathBuf,
    values: Mapping,
}

impl ResolvedConfig {
    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Selected instance, `common` for components without instances.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// File the configuration was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn values(&self) -> &Mapping {
        &self.values
    }

    pub fn into_values(self) -> Mapping {
        self.values
    }

    /// Look up a value by dotted path (`hive.metastore.port`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.values.get(first)?;
        for segment in segments {
            current = current.as_mapping()?.get(segment)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(Value::as_u64)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Deserialize the values into a typed collector configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidStructure` if the values do not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_yaml::from_value(Value::Mapping(self.values.clone())).map_err(|e| {
            ConfigError::InvalidStructure {
                path: self.source.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Copy of the values with every sensitive string replaced by a mask.
    pub fn masked(&self, detector: &FieldDetector) -> Mapping {
        let mut values = self.values.clone();
        let _ = walk::visit_strings_mut(&mut values, &mut |key, _path, value| {
            if detector.is_sensitive(key) {
                *value = MASK.to_string();
            }
            Ok(())
        });
        values
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("environment", &self.environment)
            .field("component", &self.component)
            .field("instance", &self.instance)
            .field("source", &self.source)
            .field("keys", &self.values.len())
            .finish()
    }
}

type CacheKey = (Environment, ComponentName, Option<InstanceName>);

/// Resolves component configurations and caches the results.
pub struct ConfigResolver {
    config_dir: PathBuf,
    detector: FieldDetector,
    seeds: Box<dyn SeedStore>,
    contexts: HashMap<Environment, CryptoContext>,
    cache: HashMap<CacheKey, ResolvedConfig>,
    mode: DecryptMode,
}

impl ConfigResolver {
    /// Create a resolver over `config_dir`.
    pub fn new(config_dir: impl Into<PathBuf>, detector: FieldDetector, seeds: Box<dyn SeedStore>) -> Self {
        Self {
            config_dir: config_dir.into(),
            detector,
            seeds,
            contexts: HashMap::new(),
            cache: HashMap::new(),
            mode: DecryptMode::Strict,
        }
    }

    /// Create a resolver from tool settings.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::NoHomeDir` if the default seed directory cannot be located.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            settings.config_dir.clone(),
            settings.detector(),
            settings.seed_store()?,
        ))
    }

    /// Set the decryption failure policy.
    pub fn with_mode(mut self, mode: DecryptMode) -> Self {
        self.mode = mode;
        self
    }

    /// Install a crypto context up front instead of loading it from the seed store.
    pub fn with_context(mut self, context: CryptoContext) -> Self {
        self.contexts.insert(context.environment().to_string(), context);
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn detector(&self) -> &FieldDetector {
        &self.detector
    }

    pub fn mode(&self) -> DecryptMode {
        self.mode
    }

    /// Path of a component file; `.yaml` preferred, `.yml` accepted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidName` for malformed names and
    /// `ConfigError::NotFound` when neither file exists.
    pub fn component_path(&self, environment: &str, component: &str) -> Result<PathBuf> {
        validate_environment(environment)?;
        validate_component(component)?;

        let dir = self.config_dir.join(environment);
        let yaml = dir.join(format!("{}.yaml", component));
        if yaml.is_file() {
            return Ok(yaml);
        }
        let yml = dir.join(format!("{}.yml", component));
        if yml.is_file() {
            return Ok(yml);
        }

        Err(ConfigError::NotFound {
            environment: environment.to_string(),
            component: component.to_string(),
            path: yaml,
        }
        .into())
    }

    /// Load the raw (still encrypted) document of a component.
    pub fn load_document(&self, environment: &str, component: &str) -> Result<ConfigDocument> {
        let path = self.component_path(environment, component)?;
        ConfigDocument::load(&path)
    }

    /// Component names configured for `environment`, sorted.
    ///
    /// A missing environment directory yields an empty list.
    pub fn components(&self, environment: &str) -> Result<Vec<ComponentName>> {
        validate_environment(environment)?;
        let dir = self.config_dir.join(environment);
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "environment directory missing");
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_yaml = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            );
            if !is_yaml || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_component(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Instance names of a component, in document order.
    pub fn instances(&self, environment: &str, component: &str) -> Result<Vec<InstanceName>> {
        let document = self.load_document(environment, component)?;
        Ok(document
            .instance_names()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Resolve one instance of a component.
    ///
    /// Without an explicit instance the document's `default_instance` is
    /// used, then its only instance. Results are cached for the lifetime of
    /// the resolver.
    ///
    /// # Errors
    ///
    /// Fails on a missing or malformed file, an unknown or ambiguous
    /// instance, and (in strict mode) any sensitive value that cannot be
    /// decrypted. Nothing is returned partially.
    pub fn resolve(&mut self, environment: &str, component: &str, instance: Option<&str>) -> Result<ResolvedConfig> {
        let key: CacheKey = (
            environment.to_string(),
            component.to_string(),
            instance.map(str::to_string),
        );
        if let Some(hit) = self.cache.get(&key) {
            debug!(environment, component, instance = hit.instance(), "config cache hit");
            return Ok(hit.clone());
        }

        debug!(environment, component, requested = ?instance, "resolving config");
        let path = self.component_path(environment, component)?;
        let document = ConfigDocument::load(&path)?;
        let (selected, mut values) = document.effective(component, instance)?;

        let decrypted = self.decrypt_values(environment, component, &selected, &mut values)?;
        info!(
            environment,
            component,
            instance = %selected,
            decrypted,
            "config resolved"
        );

        let resolved = ResolvedConfig {
            environment: environment.to_string(),
            component: component.to_string(),
            instance: selected.clone(),
            source: path,
            values,
        };

        // The synthetic `common` name of an instance-less document is not
        // selectable, so it never becomes a cache key.
        if document.instance(&selected).is_some() {
            self.cache.insert(
                (environment.to_string(), component.to_string(), Some(selected)),
                resolved.clone(),
            );
        }
        self.cache.insert(key, resolved.clone());
        Ok(resolved)
    }

    /// Resolve every instance of a component.
    ///
    /// Components without instances yield a single `common` result.
    pub fn resolve_all(&mut self, environment: &str, component: &str) -> Result<Vec<ResolvedConfig>> {
        let names = self.instances(environment, component)?;
        if names.is_empty() {
            return Ok(vec![self.resolve(environment, component, None)?]);
        }
        names
            .iter()
            .map(|name| self.resolve(environment, component, Some(name)))
            .collect()
    }

    /// Drop every cached result. Crypto contexts are kept.
    pub fn clear_cache(&mut self) {
        debug!(entries = self.cache.len(), "clearing config cache");
        self.cache.clear();
    }

    /// Number of cached entries.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Decrypt sensitive envelopes in place; returns how many were decrypted.
    fn decrypt_values(
        &mut self,
        environment: &str,
        component: &str,
        instance: &str,
        values: &mut Mapping,
    ) -> Result<usize> {
        let Self {
            detector,
            seeds,
            contexts,
            mode,
            ..
        } = self;
        let mut decrypted = 0;

        walk::visit_strings_mut(values, &mut |key, path, value| {
            if !detector.should_decrypt(key, value) {
                return Ok(());
            }

            let plaintext = context_for(contexts, &**seeds, environment)
                .and_then(|ctx| ctx.decrypt_str(value));

            match plaintext {
                Ok(plaintext) => {
                    *value = plaintext.as_str().to_string();
                    decrypted += 1;
                    Ok(())
                }
                Err(e) if *mode == DecryptMode::Tolerant => {
                    warn!(component, instance, key = path, error = %e, "leaving value encrypted");
                    Ok(())
                }
                Err(e) => Err(ConfigError::Decryption {
                    component: component.to_string(),
                    instance: instance.to_string(),
                    key: path.to_string(),
                    source: Box::new(e),
                }
                .into()),
            }
        })?;

        Ok(decrypted)
    }
}

impl fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("config_dir", &self.config_dir)
            .field("mode", &self.mode)
            .field("contexts", &self.contexts.keys().collect::<Vec<_>>())
            .field("cached", &self.cache.len())
            .finish()
    }
}

/// Crypto context of `environment`, loading its seed on first use.
fn context_for<'a>(
    contexts: &'a mut HashMap<Environment, CryptoContext>,
    seeds: &dyn SeedStore,
    environment: &str,
) -> Result<&'a CryptoContext> {
    if !contexts.contains_key(environment) {
        let seed = seeds.load_seed(environment)?;
        let context = CryptoContext::new(environment, &seed)?;
        info!(
            environment,
            source = %seeds.location(environment),
            fingerprint = %context.fingerprint(),
            "crypto context loaded"
        );
        contexts.insert(environment.to_string(), context);
    }
    Ok(&contexts[environment])
}

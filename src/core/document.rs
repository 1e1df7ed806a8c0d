//! Component configuration documents.
//!
//! One YAML file per (environment, component):
//!
//! ```yaml
//! default_instance: primary
//! common:
//!   port: 10000
//! instances:
//!   primary:
//!     host: hive-1
//!   backup:
//!     host: hive-2
//! ```
//!
//! A file with neither `common` nor `instances` is read as a single
//! implicit instance holding the whole document.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::core::constants::{COMMON_INSTANCE, COMMON_KEY, DEFAULT_INSTANCE_KEY, INSTANCES_KEY};
use crate::core::merge::merge;
use crate::core::types::InstanceName;
use crate::core::walk::key_name;
use crate::error::{ConfigError, Result};

/// Parsed component document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    path: PathBuf,
    common: Mapping,
    instances: Vec<(InstanceName, Mapping)>,
    default_instance: Option<InstanceName>,
}

impl ConfigDocument {
    /// Read and parse a document from disk.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for invalid YAML and
    /// `ConfigError::InvalidStructure` when the reserved keys hold the wrong types.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config document");
        let text = std::fs::read_to_string(path)?;
        Self::parse(path, &text)
    }

    /// Parse document text. `path` is only used in error messages.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut root = match root {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            _ => return Err(invalid(path, "top level must be a mapping")),
        };

        let default_instance = match root.remove(DEFAULT_INSTANCE_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => return Err(invalid(path, "default_instance must be a string")),
        };

        let has_layers = root.contains_key(COMMON_KEY) || root.contains_key(INSTANCES_KEY);
        let (common, instances) = if has_layers {
            let common = match root.remove(COMMON_KEY) {
                None | Some(Value::Null) => Mapping::new(),
                Some(Value::Mapping(m)) => m,
                Some(_) => return Err(invalid(path, "common must be a mapping")),
            };
            let instances = match root.remove(INSTANCES_KEY) {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Mapping(m)) => parse_instances(path, m)?,
                Some(_) => return Err(invalid(path, "instances must be a mapping")),
            };
            (common, instances)
        } else {
            (root, Vec::new())
        };

        Ok(Self {
            path: path.to_path_buf(),
            common,
            instances,
            default_instance,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn common(&self) -> &Mapping {
        &self.common
    }

    pub fn default_instance(&self) -> Option<&str> {
        self.default_instance.as_deref()
    }

    /// Instance names in document order.
    pub fn instance_names(&self) -> Vec<&str> {
        self.instances.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Raw (unmerged) block of one instance.
    pub fn instance(&self, name: &str) -> Option<&Mapping> {
        self.instances
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, block)| block)
    }

    /// Decide which instance a request refers to.
    ///
    /// Explicit name, else `default_instance`, else the only instance.
    /// A document without instances resolves to [`COMMON_INSTANCE`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InstanceNotFound` for unknown names and
    /// `ConfigError::NoDefaultInstance` when the choice is ambiguous.
    pub fn select_instance(&self, component: &str, requested: Option<&str>) -> Result<InstanceName> {
        let not_found = |name: &str| ConfigError::InstanceNotFound {
            component: component.to_string(),
            instance: name.to_string(),
        };

        if let Some(name) = requested {
            return match self.instance(name) {
                Some(_) => Ok(name.to_string()),
                None => Err(not_found(name).into()),
            };
        }

        if let Some(name) = self.default_instance() {
            return match self.instance(name) {
                Some(_) => Ok(name.to_string()),
                None => Err(not_found(name).into()),
            };
        }

        match self.instances.as_slice() {
            [] => Ok(COMMON_INSTANCE.to_string()),
            [(only, _)] => Ok(only.clone()),
            many => Err(ConfigError::NoDefaultInstance {
                component: component.to_string(),
                instances: many.iter().map(|(n, _)| n.clone()).collect(),
            }
            .into()),
        }
    }

    /// Effective (merged, still encrypted) configuration of an instance.
    ///
    /// Returns the selected instance name alongside the merged mapping.
    pub fn effective(&self, component: &str, requested: Option<&str>) -> Result<(InstanceName, Mapping)> {
        let name = self.select_instance(component, requested)?;
        let merged = match self.instance(&name) {
            Some(block) => merge(&self.common, block),
            None => self.common.clone(),
        };
        Ok((name, merged))
    }
}

fn parse_instances(path: &Path, block: Mapping) -> Result<Vec<(InstanceName, Mapping)>> {
    let mut instances = Vec::with_capacity(block.len());
    for (key, value) in block {
        let name = key_name(&key).ok_or_else(|| invalid(path, "instance names must be scalars"))?;
        let body = match value {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            _ => {
                return Err(invalid(path, &format!("instance '{}' must be a mapping", name)));
            }
        };
        instances.push((name, body));
    }
    Ok(instances)
}

fn invalid(path: &Path, reason: &str) -> crate::error::Error {
    ConfigError::InvalidStructure {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
    .into()
}

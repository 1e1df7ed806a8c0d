//! Sensitive field detection.
//!
//! Decides from a key name alone whether its value is a credential. The
//! rules are plain data ([`FieldRules`]) so operators can extend them from
//! `autoevs.toml`; [`FieldDetector::is_sensitive`] is a pure function over
//! that data.
//!
//! Precedence, first match wins:
//!
//! 1. keys starting with `_` are metadata, never sensitive
//! 2. exclude list (exact name, or `_<entry>` suffix)
//! 3. exact list
//! 4. include substrings
//! 5. suffixes
//!
//! Exclude always beats include: `password_length` is not a secret.

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use crate::core::cipher::is_envelope;
use crate::core::types::FieldPath;
use crate::core::walk;

const DEFAULT_EXCLUDE: &[&str] = &[
    "password_policy",
    "password_length",
    "password_complexity",
    "password_min_length",
    "password_max_length",
    "password_rules",
    "password_file",
    "key_id",
    "key_type",
    "key_path",
    "public_key",
    "ssh_key_path",
    "keystore_file",
    "truststore_file",
    "token_type",
    "token_expiry",
    "secret_type",
    "secret_path",
];

const DEFAULT_EXACT: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "key",
    "token",
    "metastore_password",
    "admin_password",
    "root_password",
    "mysql_password",
    "hive_password",
    "ambari_password",
];

const DEFAULT_INCLUDE: &[&str] = &["password", "passwd", "secret", "token", "credential"];

const DEFAULT_SUFFIXES: &[&str] = &["key"];

/// Operator-supplied detection rules (`[fields]` in `autoevs.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRules {
    /// Add these lists to the built-in ones instead of replacing them.
    pub extend_defaults: bool,
    /// Names that are never sensitive.
    pub exclude: Vec<String>,
    /// Names that are always sensitive.
    pub exact: Vec<String>,
    /// Substrings marking a name as sensitive.
    pub include: Vec<String>,
    /// Endings marking a name as sensitive.
    pub suffixes: Vec<String>,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            extend_defaults: true,
            exclude: Vec::new(),
            exact: Vec::new(),
            include: Vec::new(),
            suffixes: Vec::new(),
        }
    }
}

impl FieldRules {
    /// The built-in rule set.
    pub fn builtin() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            extend_defaults: false,
            exclude: owned(DEFAULT_EXCLUDE),
            exact: owned(DEFAULT_EXACT),
            include: owned(DEFAULT_INCLUDE),
            suffixes: owned(DEFAULT_SUFFIXES),
        }
    }

    /// True when no list holds any entry.
    pub fn is_empty(&self) -> bool {
        self.exclude.is_empty()
            && self.exact.is_empty()
            && self.include.is_empty()
            && self.suffixes.is_empty()
    }

    /// Rules that match exactly the given field names and nothing else.
    pub fn only(fields: &[String]) -> Self {
        Self {
            extend_defaults: false,
            exact: fields.to_vec(),
            ..Self::default()
        }
    }
}

/// Classifies configuration keys as sensitive or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDetector {
    exclude: Vec<String>,
    exact: Vec<String>,
    include: Vec<String>,
    suffixes: Vec<String>,
}

impl FieldDetector {
    /// Detector with the built-in rules.
    pub fn new() -> Self {
        Self::from_rules(&FieldRules::builtin())
    }

    /// Build a detector from operator rules.
    ///
    /// Empty rules fall back to the built-ins. With `extend_defaults` the
    /// operator lists are appended to the built-ins, otherwise they replace them.
    pub fn from_rules(rules: &FieldRules) -> Self {
        let builtin = FieldRules::builtin();
        if rules.is_empty() {
            return Self::compile(&builtin, None);
        }
        if rules.extend_defaults {
            Self::compile(&builtin, Some(rules))
        } else {
            Self::compile(rules, None)
        }
    }

    fn compile(base: &FieldRules, extra: Option<&FieldRules>) -> Self {
        let none = FieldRules::default();
        let extra = extra.unwrap_or(&none);
        Self {
            exclude: normalize(&base.exclude, &extra.exclude),
            exact: normalize(&base.exact, &extra.exact),
            include: normalize(&base.include, &extra.include),
            suffixes: normalize(&base.suffixes, &extra.suffixes),
        }
    }

    /// Decide whether `key` names a credential.
    pub fn is_sensitive(&self, key: &str) -> bool {
        if key.is_empty() || key.starts_with('_') {
            return false;
        }
        let key = key.to_ascii_lowercase();

        let excluded = self
            .exclude
            .iter()
            .any(|e| key == *e || key.ends_with(&format!("_{}", e)));
        if excluded {
            return false;
        }

        self.exact.iter().any(|e| key == *e)
            || self.include.iter().any(|e| key.contains(e.as_str()))
            || self.suffixes.iter().any(|e| key.ends_with(e.as_str()))
    }

    /// Sensitive key whose value carries the envelope prefix.
    pub fn should_decrypt(&self, key: &str, value: &str) -> bool {
        self.is_sensitive(key) && is_envelope(value)
    }

    /// Mark an additional name as always sensitive.
    pub fn add_sensitive(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        if !self.exact.contains(&name) {
            self.exact.push(name);
        }
    }

    /// Mark an additional name as never sensitive.
    pub fn add_excluded(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        if !self.exclude.contains(&name) {
            self.exclude.push(name);
        }
    }

    /// Paths of every sensitive field holding an envelope.
    pub fn scan(&self, mapping: &Mapping) -> Vec<FieldPath> {
        walk::string_fields(mapping)
            .into_iter()
            .filter(|f| self.should_decrypt(&f.key, f.value))
            .map(|f| f.path)
            .collect()
    }
}

impl Default for FieldDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-case, trim and de-duplicate two rule lists into one.
fn normalize(base: &[String], extra: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in base.iter().chain(extra) {
        let entry = entry.trim().to_ascii_lowercase();
        if !entry.is_empty() && !out.contains(&entry) {
            out.push(entry);
        }
    }
    out
}

//! In-place encryption of configuration files.
//!
//! Finds sensitive plaintext values in a YAML file and replaces them with
//! envelopes, touching only the value text on each affected line. Running
//! it twice is a no-op the second time.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::core::cipher::{is_envelope, Cipher, CryptoContext, Envelope};
use crate::core::detect::{FieldDetector, FieldRules};
use crate::core::settings::Settings;
use crate::core::types::FieldPath;
use crate::core::walk;
use crate::core::yaml_edit::{self, Span};
use crate::error::{ConfigError, Error, Result, ToolError};

/// What happened to a sensitive field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Plaintext replaced by an envelope.
    Encrypted,
    /// Plaintext that a real run would encrypt.
    WouldEncrypt,
    /// Value already held an envelope; left untouched.
    AlreadyEncrypted,
    /// Plaintext the operator chose to keep.
    Skipped,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Encrypted => "encrypted",
            Self::WouldEncrypt => "would encrypt",
            Self::AlreadyEncrypted => "already encrypted",
            Self::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// One sensitive field and what was done with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub path: FieldPath,
    pub action: Action,
}

/// Operator answer for one plaintext field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Encrypt,
    Skip,
    /// Stop without writing the current file or any later one.
    Quit,
}

/// Callback for [`EncryptionTool::encrypt_file_with`]: `(field path, plaintext length)`.
pub type Decide<'f> = dyn FnMut(&str, usize) -> Result<Decision> + 'f;

/// Outcome of encrypting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub changes: Vec<FieldChange>,
    /// Backup written before the file was replaced.
    pub backup: Option<PathBuf>,
}

impl FileReport {
    fn new(path: &Path, changes: Vec<FieldChange>) -> Self {
        Self {
            path: path.to_path_buf(),
            changes,
            backup: None,
        }
    }

    /// Number of fields with the given action.
    pub fn count(&self, action: Action) -> usize {
        self.changes.iter().filter(|c| c.action == action).count()
    }

    /// True if the file was (or in a dry run, would be) rewritten.
    pub fn modifies(&self) -> bool {
        self.changes
            .iter()
            .any(|c| matches!(c.action, Action::Encrypted | Action::WouldEncrypt))
    }
}

/// Encrypts sensitive values in configuration files.
#[derive(Debug)]
pub struct EncryptionTool {
    context: CryptoContext,
    detector: FieldDetector,
}

impl EncryptionTool {
    pub fn new(context: CryptoContext, detector: FieldDetector) -> Self {
        Self { context, detector }
    }

    /// Build a tool for `environment` from settings.
    ///
    /// `fields`, when given, replaces detection: exactly those key names
    /// are encrypted.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Missing` if the environment has no seed.
    pub fn from_settings(settings: &Settings, environment: &str, fields: Option<&[String]>) -> Result<Self> {
        let seeds = settings.seed_store()?;
        let seed = seeds.load_seed(environment)?;
        let context = CryptoContext::new(environment, &seed)?;
        info!(
            environment,
            source = %seeds.location(environment),
            fingerprint = %context.fingerprint(),
            "crypto context loaded"
        );

        let detector = match fields {
            Some(fields) if !fields.is_empty() => FieldDetector::from_rules(&FieldRules::only(fields)),
            _ => settings.detector(),
        };
        Ok(Self::new(context, detector))
    }

    pub fn context(&self) -> &CryptoContext {
        &self.context
    }

    pub fn detector(&self) -> &FieldDetector {
        &self.detector
    }

    /// Encrypt a single value.
    pub fn encrypt_value(&self, plaintext: &str) -> Result<Envelope> {
        self.context.encrypt(plaintext.as_bytes())
    }

    /// Encrypt every sensitive plaintext value in `path`.
    ///
    /// In a dry run nothing is written, but every value must still be
    /// rewritable for the run to succeed.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::FileNotFound`, `ToolError::EmptyDocument`,
    /// `ConfigError::Parse`, or `ToolError::Unlocatable` when a value cannot
    /// be rewritten on its line. The file is untouched on every error.
    pub fn encrypt_file(&self, path: &Path, dry_run: bool) -> Result<FileReport> {
        self.encrypt_file_with(path, dry_run, &mut |_, _| Ok(Decision::Encrypt))
    }

    /// Like [`encrypt_file`](Self::encrypt_file), asking `decide` about each
    /// plaintext field before it is encrypted.
    ///
    /// `decide` is only called once every field is known to be rewritable,
    /// and never in a dry run. Skipped fields keep their plaintext.
    ///
    /// # Errors
    ///
    /// As [`encrypt_file`](Self::encrypt_file), plus `ToolError::Cancelled`
    /// when `decide` answers [`Decision::Quit`]; the file is left as it was.
    pub fn encrypt_file_with(&self, path: &Path, dry_run: bool, decide: &mut Decide<'_>) -> Result<FileReport> {
        if !path.is_file() {
            return Err(ToolError::FileNotFound(path.to_path_buf()).into());
        }
        debug!(path = %path.display(), dry_run, "scanning config file");

        let text = fs::read_to_string(path)?;
        let mapping = parse_mapping(path, &text)?;

        let mut changes = Vec::new();
        // Index into `changes` and plaintext of every field to encrypt.
        let mut pending: Vec<(usize, Zeroizing<String>)> = Vec::new();
        for field in walk::string_fields(&mapping) {
            if !self.detector.is_sensitive(&field.key) {
                continue;
            }
            let action = if is_envelope(field.value) {
                Action::AlreadyEncrypted
            } else if field.value.is_empty() {
                debug!(key = %field.path, "skipping empty value");
                continue;
            } else {
                pending.push((changes.len(), Zeroizing::new(field.value.to_string())));
                if dry_run {
                    Action::WouldEncrypt
                } else {
                    Action::Encrypted
                }
            };
            changes.push(FieldChange {
                path: field.path,
                action,
            });
        }

        if pending.is_empty() {
            debug!(path = %path.display(), "nothing to encrypt");
            return Ok(FileReport::new(path, changes));
        }

        let spans = yaml_edit::locate(&text);
        if let Some((i, _)) = pending.iter().find(|(i, _)| !spans.contains_key(&changes[*i].path)) {
            return Err(ToolError::Unlocatable {
                path: path.to_path_buf(),
                key: changes[*i].path.clone(),
            }
            .into());
        }

        if dry_run {
            return Ok(FileReport::new(path, changes));
        }

        let mut replacements: Vec<(Span, String)> = Vec::with_capacity(pending.len());
        let mut sealed: HashMap<FieldPath, String> = HashMap::new();
        for (i, plaintext) in pending {
            let change = &mut changes[i];
            match decide(&change.path, plaintext.chars().count())? {
                Decision::Encrypt => {
                    let envelope = self.context.encrypt_str(&plaintext)?;
                    sealed.insert(change.path.clone(), envelope.clone());
                    replacements.push((spans[&change.path], envelope));
                }
                Decision::Skip => change.action = Action::Skipped,
                Decision::Quit => return Err(ToolError::Cancelled(path.to_path_buf()).into()),
            }
        }

        let mut report = FileReport::new(path, changes);
        if replacements.is_empty() {
            debug!(path = %path.display(), "every field skipped, file unchanged");
            return Ok(report);
        }

        let rewritten = yaml_edit::rewrite(&text, &replacements);
        verify(path, &mapping, &rewritten, &sealed)?;

        report.backup = Some(backup(path)?);
        write_replace(path, &rewritten)?;

        info!(
            path = %path.display(),
            encrypted = report.count(Action::Encrypted),
            skipped = report.count(Action::Skipped),
            unchanged = report.count(Action::AlreadyEncrypted),
            "config file encrypted"
        );
        Ok(report)
    }

    /// Encrypt every file under `paths`; directories expand to their YAML files.
    ///
    /// Every file is attempted; the result carries one entry per file.
    pub fn encrypt_paths(&self, paths: &[PathBuf], dry_run: bool) -> Result<Vec<(PathBuf, Result<FileReport>)>> {
        self.encrypt_paths_with(paths, dry_run, &mut |_, _| Ok(Decision::Encrypt))
    }

    /// Like [`encrypt_paths`](Self::encrypt_paths) with per-field decisions.
    ///
    /// A cancelled file ends the run: later files are not attempted and do
    /// not appear in the result.
    pub fn encrypt_paths_with(
        &self,
        paths: &[PathBuf],
        dry_run: bool,
        decide: &mut Decide<'_>,
    ) -> Result<Vec<(PathBuf, Result<FileReport>)>> {
        let files = expand_paths(paths)?;
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let result = self.encrypt_file_with(&file, dry_run, decide);
            let cancelled = matches!(result, Err(Error::Tool(ToolError::Cancelled(_))));
            if let Err(e) = &result {
                warn!(path = %file.display(), error = %e, "file not encrypted");
            }
            results.push((file, result));
            if cancelled {
                break;
            }
        }
        Ok(results)
    }
}

/// Expand directories to their `*.yaml` / `*.yml` files, sorted. Files pass through.
///
/// # Errors
///
/// Returns `ToolError::FileNotFound` for missing paths and `ToolError::NoFiles`
/// for a directory without YAML files.
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in fs::read_dir(path)? {
                let entry = entry?.path();
                let is_yaml = matches!(
                    entry.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml")
                );
                if is_yaml && entry.is_file() {
                    found.push(entry);
                }
            }
            if found.is_empty() {
                return Err(ToolError::NoFiles(path.clone()).into());
            }
            found.sort();
            files.extend(found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(ToolError::FileNotFound(path.clone()).into());
        }
    }
    Ok(files)
}

fn parse_mapping(path: &Path, text: &str) -> Result<Mapping> {
    let root: Value = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match root {
        Value::Mapping(m) => Ok(m),
        Value::Null => Err(ToolError::EmptyDocument(path.to_path_buf()).into()),
        _ => Err(ConfigError::InvalidStructure {
            path: path.to_path_buf(),
            reason: "top level must be a mapping".to_string(),
        }
        .into()),
    }
}

/// Check that the rewritten text parses to the original tree with only the
/// sealed fields changed.
fn verify(path: &Path, original: &Mapping, rewritten: &str, sealed: &HashMap<FieldPath, String>) -> Result<()> {
    let mut expected = original.clone();
    walk::visit_strings_mut(&mut expected, &mut |_key, field, value| {
        if let Some(envelope) = sealed.get(field) {
            *value = envelope.clone();
        }
        Ok(())
    })?;

    let actual = serde_yaml::from_str::<Value>(rewritten).ok();
    if actual.as_ref() == Some(&Value::Mapping(expected.clone())) {
        return Ok(());
    }

    let actual_fields: HashMap<FieldPath, String> = match actual.as_ref().and_then(Value::as_mapping) {
        Some(m) => walk::string_fields(m)
            .into_iter()
            .map(|f| (f.path, f.value.to_string()))
            .collect(),
        None => HashMap::new(),
    };
    let key = walk::string_fields(&expected)
        .into_iter()
        .find(|f| actual_fields.get(&f.path).map(String::as_str) != Some(f.value))
        .map(|f| f.path)
        .or_else(|| sealed.keys().min().cloned())
        .unwrap_or_default();

    Err(ToolError::Unlocatable {
        path: path.to_path_buf(),
        key,
    }
    .into())
}

/// Copy `path` to `<path>.<timestamp>.bak`.
fn backup(path: &Path) -> Result<PathBuf> {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut target = path.with_file_name(format!("{}.{}.bak", name, timestamp));
    let mut n = 1;
    while target.exists() {
        target = path.with_file_name(format!("{}.{}-{}.bak", name, timestamp, n));
        n += 1;
    }

    fs::copy(path, &target)?;
    debug!(backup = %target.display(), "backup written");
    Ok(target)
}

/// Replace `path` with `contents` via a temp file in the same directory.
fn write_replace(path: &Path, contents: &str) -> Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", name));

    fs::write(&tmp, contents)?;
    let permissions = fs::metadata(path)?.permissions();
    fs::set_permissions(&tmp, permissions)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

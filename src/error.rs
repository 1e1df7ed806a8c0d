//! Error types.
//!
//! One enum per concern, unified under [`Error`]. Every variant aborts the
//! call in progress; callers never see a partially resolved configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Seed material errors.
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("no seed found for environment '{environment}'")]
    Missing { environment: String },

    #[error("seed for environment '{environment}' is too short: {len} bytes (minimum {min})")]
    TooShort {
        environment: String,
        len: usize,
        min: usize,
    },

    #[error("invalid seed format: {0}")]
    InvalidFormat(String),

    #[error("seed for environment '{environment}' already exists at {} (use --force to overwrite)", .path.display())]
    AlreadyExists { environment: String, path: PathBuf },

    #[error("failed to read seed: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("failed to write seed: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("unable to determine home directory")]
    NoHomeDir,
}

/// Envelope and cipher errors.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("malformed envelope: {0}")]
    EnvelopeMalformed(String),

    #[error("decryption failed: authentication tag mismatch (wrong seed or tampered value)")]
    DecryptionFailed,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decrypted value is not valid UTF-8")]
    InvalidUtf8,
}

/// Configuration loading and resolution errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration for component '{component}' in environment '{environment}' (looked for {})", .path.display())]
    NotFound {
        environment: String,
        component: String,
        path: PathBuf,
    },

    #[error("invalid {kind} name '{name}': only letters, digits, '-' and '_' are allowed")]
    InvalidName { kind: &'static str, name: String },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid structure in {}: {reason}", .path.display())]
    InvalidStructure { path: PathBuf, reason: String },

    #[error("component '{component}' has no instance '{instance}'")]
    InstanceNotFound { component: String, instance: String },

    #[error("component '{component}' has multiple instances ({}) and no default_instance", .instances.join(", "))]
    NoDefaultInstance {
        component: String,
        instances: Vec<String>,
    },

    #[error("cannot decrypt '{key}' in {component}/{instance}: {source}")]
    Decryption {
        component: String,
        instance: String,
        key: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid settings file {}: {reason}", .path.display())]
    Settings { path: PathBuf, reason: String },

    #[error("{failed} of {total} configurations failed to resolve")]
    Unresolved { failed: usize, total: usize },
}

/// Encryption tool errors.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("config file is empty: {}", .0.display())]
    EmptyDocument(PathBuf),

    #[error("cannot rewrite '{key}' in {}: value is not a single-line scalar", .path.display())]
    Unlocatable { path: PathBuf, key: String },

    #[error("no yaml files found under {}", .0.display())]
    NoFiles(PathBuf),

    #[error("encryption cancelled, {} left unchanged", .0.display())]
    Cancelled(PathBuf),

    #[error("{failed} of {total} files failed to encrypt")]
    Failed { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

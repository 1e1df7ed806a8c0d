//! Seed storage.
//!
//! Provides seed loading abstraction with implementations for different
//! storage backends. Seeds never live in the configuration tree; they come
//! from the process environment or from per-environment files under a
//! dedicated seed directory.
//!
//! ## Backends
//!
//! - **EnvVars**: `AUTOEVS_CRYPTO_SEED_<ENV>`, then `AUTOEVS_CRYPTO_SEED`.
//! - **Filesystem**: `<seed_dir>/<env>.seed`, owner-only permissions.
//! - **default_backend**: `<ENV>` variable, then the seed file, then the legacy variable.

use std::fmt;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroizing;

use crate::core::constants::{MIN_SEED_LEN, SEED_LEN};
use crate::error::{Result, SeedError};

mod backend;
mod env;
mod fs;

pub use backend::{default_backend, EnvThenFilesystem};
pub use env::EnvVars;
pub use fs::Filesystem;

/// Seed storage trait.
///
/// Abstracts where seed material comes from so the resolver and the
/// encryption tool never touch files or variables directly.
pub trait SeedStore {
    /// Load the seed for an environment.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Missing` if the backend has no material for
    /// `environment`, or a format error if the material is unusable.
    fn load_seed(&self, environment: &str) -> Result<Seed>;

    /// Check if seed material exists for an environment.
    fn has_seed(&self, environment: &str) -> bool;

    /// Human-readable location the seed for `environment` is read from.
    fn location(&self, environment: &str) -> String;
}

/// Per-environment seed material.
///
/// Immutable once loaded, zeroed on drop, redacted in `Debug`.
pub struct Seed(Zeroizing<Vec<u8>>);

impl Seed {
    /// Generate `SEED_LEN` bytes from the OS random number generator.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new(vec![0u8; SEED_LEN]);
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap raw bytes, enforcing the minimum length.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::TooShort` if fewer than `MIN_SEED_LEN` bytes are given.
    pub fn from_bytes(environment: &str, bytes: Vec<u8>) -> Result<Self> {
        let bytes = Zeroizing::new(bytes);
        if bytes.len() < MIN_SEED_LEN {
            return Err(SeedError::TooShort {
                environment: environment.to_string(),
                len: bytes.len(),
                min: MIN_SEED_LEN,
            }
            .into());
        }
        Ok(Self(bytes))
    }

    /// Parse textual seed material.
    ///
    /// Base64 is the canonical form when it decodes to at least
    /// `MIN_SEED_LEN` bytes. Any other text that is long enough is taken as
    /// raw bytes, which keeps hand-set passphrase seeds working.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::InvalidFormat` for empty input and
    /// `SeedError::TooShort` for material below `MIN_SEED_LEN` bytes.
    pub fn parse(environment: &str, text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SeedError::InvalidFormat("seed is empty".to_string()).into());
        }

        // A passphrase made only of base64 characters decodes to fewer bytes
        // than it holds; when that falls below the minimum but the text
        // itself is long enough, the text is the seed.
        match STANDARD.decode(text).map(Zeroizing::new) {
            Ok(bytes) if bytes.len() >= MIN_SEED_LEN || text.len() < MIN_SEED_LEN => {
                Self::from_bytes(environment, bytes.to_vec())
            }
            _ => Self::from_bytes(environment, text.as_bytes().to_vec()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical base64 encoding.
    pub fn encode(&self) -> Zeroizing<String> {
        Zeroizing::new(STANDARD.encode(&self.0[..]))
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed([REDACTED; {} bytes])", self.0.len())
    }
}

/// Name of the per-environment seed variable (`AUTOEVS_CRYPTO_SEED_PROD`).
pub fn env_var_name(environment: &str) -> String {
    format!(
        "{}_{}",
        crate::core::constants::SEED_ENV_VAR,
        environment.to_ascii_uppercase().replace('-', "_")
    )
}

//! AES-256-GCM cipher keyed from an environment seed.

use std::fmt;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use tracing::trace;
use zeroize::Zeroizing;

use super::envelope::NONCE_LEN;
use super::{Cipher, Envelope};
use crate::core::store::Seed;
use crate::error::{CipherError, Result};

/// AES key size: 256 bits.
const KEY_LEN: usize = 32;

/// Fixed HKDF salt. Changing it invalidates every existing envelope.
const KDF_SALT: &[u8] = b"autoevs-config-seed-v1";

/// HKDF context string binding the key to its use.
const KDF_INFO: &[u8] = b"autoevs aes-256-gcm envelope key";

/// Seed-derived key material for one environment.
///
/// Constructed once per environment and handed to whatever needs to
/// encrypt or decrypt. The key is zeroed on drop.
pub struct CryptoContext {
    environment: String,
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl CryptoContext {
    /// Derive the context for `environment` from its seed.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` if key derivation fails.
    pub fn new(environment: &str, seed: &Seed) -> Result<Self> {
        let hk = Hkdf::<Sha256>::new(Some(KDF_SALT), seed.as_bytes());
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        hk.expand(KDF_INFO, &mut key[..])
            .map_err(|e| CipherError::EncryptionFailed(format!("key derivation failed: {}", e)))?;

        Ok(Self {
            environment: environment.to_string(),
            key,
        })
    }

    /// Environment this context was derived for.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Short, non-reversible identifier of the derived key.
    ///
    /// Two contexts share a fingerprint exactly when they share a key, which
    /// lets operators compare machines without exposing the seed.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.key[..]);
        digest[..6].iter().map(|b| format!("{:02x}", b)).collect()
    }

    fn aead(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key[..]))
    }
}

impl Cipher for CryptoContext {
    fn name(&self) -> &'static str {
        "aes-256-gcm"
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope> {
        trace!(plaintext_len = plaintext.len(), "encrypting");

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .aead()
            .encrypt(&nonce, plaintext)
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        nonce_bytes.copy_from_slice(nonce.as_slice());

        trace!(sealed_len = sealed.len(), "encrypted");
        Ok(Envelope::new(nonce_bytes, sealed))
    }

    fn decrypt(&self, envelope: &Envelope) -> Result<Zeroizing<Vec<u8>>> {
        trace!(sealed_len = envelope.sealed().len(), "decrypting");

        let nonce = Nonce::from_slice(envelope.nonce());
        let plaintext = self
            .aead()
            .decrypt(nonce, envelope.sealed())
            .map_err(|_| CipherError::DecryptionFailed)?;

        Ok(Zeroizing::new(plaintext))
    }
}

impl fmt::Debug for CryptoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoContext")
            .field("environment", &self.environment)
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

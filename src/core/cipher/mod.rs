//! Cryptographic operations.
//!
//! Provides the `Cipher` abstraction and the AES-256-GCM implementation
//! used for configuration values.
//!
//! ## Key derivation
//!
//! The per-environment seed is expanded with HKDF-SHA256 under a fixed
//! application salt, so a seed always maps to the same key. Freshness comes
//! from the random nonce drawn for every encryption.
//!
//! ## Envelope
//!
//! Ciphertexts travel as `ENCRYPTED:<base64>` strings, see [`Envelope`].

use zeroize::Zeroizing;

use crate::error::{CipherError, Result};

mod aes;
mod envelope;

pub use aes::CryptoContext;
pub use envelope::{is_envelope, Envelope};

/// Symmetric cipher over configuration values.
///
/// Implementors own their key material; callers only see envelopes and
/// plaintext bytes.
pub trait Cipher {
    /// Encrypt plaintext bytes into an envelope.
    ///
    /// Every call draws a fresh nonce, so encrypting the same plaintext
    /// twice yields different envelopes.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` if the backend rejects the input.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope>;

    /// Decrypt an envelope back to plaintext bytes.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` when the authentication tag
    /// does not verify. Never returns the input unchanged.
    fn decrypt(&self, envelope: &Envelope) -> Result<Zeroizing<Vec<u8>>>;

    /// Backend name for display.
    fn name(&self) -> &'static str;

    /// Encrypt a string and return the tagged envelope text.
    fn encrypt_str(&self, plaintext: &str) -> Result<String> {
        Ok(self.encrypt(plaintext.as_bytes())?.seal())
    }

    /// Parse a tagged string and decrypt it to UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EnvelopeMalformed` for structurally invalid
    /// input, `CipherError::DecryptionFailed` on authentication failure,
    /// or `CipherError::InvalidUtf8` if the plaintext is not text.
    fn decrypt_str(&self, value: &str) -> Result<Zeroizing<String>> {
        let envelope = Envelope::parse(value)?;
        let bytes = self.decrypt(&envelope)?;
        let text = std::str::from_utf8(&bytes).map_err(|_| CipherError::InvalidUtf8)?;
        Ok(Zeroizing::new(text.to_string()))
    }
}

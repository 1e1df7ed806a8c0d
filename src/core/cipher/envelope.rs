//! Envelope codec.
//!
//! An envelope is the textual form of an encrypted value:
//!
//! ```text
//! ENCRYPTED:<base64(version || nonce || ciphertext || tag)>
//! ```
//!
//! Decoding rejects anything that is not structurally a version-1 envelope
//! with `CipherError::EnvelopeMalformed`, before any key is involved.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::core::constants::{ENVELOPE_PREFIX, ENVELOPE_VERSION};
use crate::error::{CipherError, Result};

/// AES-GCM nonce size: 96 bits.
pub(crate) const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag size: 128 bits.
pub(crate) const TAG_LEN: usize = 16;

/// Decoded envelope: nonce plus sealed bytes (ciphertext with trailing tag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    nonce: [u8; NONCE_LEN],
    sealed: Vec<u8>,
}

impl Envelope {
    pub(crate) fn new(nonce: [u8; NONCE_LEN], sealed: Vec<u8>) -> Self {
        Self { nonce, sealed }
    }

    /// Parse a tagged string into an envelope.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EnvelopeMalformed` if the prefix is missing, the
    /// payload is not valid base64, the version byte is unknown, or the
    /// payload is too short to hold a nonce and tag.
    pub fn parse(value: &str) -> Result<Self> {
        let payload = value
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or_else(|| malformed(format!("missing {} prefix", ENVELOPE_PREFIX)))?;

        if payload.is_empty() {
            return Err(malformed("empty payload").into());
        }

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| malformed(format!("invalid base64: {}", e)))?;

        let (version, rest) = bytes
            .split_first()
            .ok_or_else(|| malformed("empty payload"))?;
        if *version != ENVELOPE_VERSION {
            return Err(malformed(format!("unsupported version {}", version)).into());
        }
        if rest.len() < NONCE_LEN + TAG_LEN {
            return Err(malformed(format!(
                "truncated payload: {} bytes, need at least {}",
                rest.len(),
                NONCE_LEN + TAG_LEN
            ))
            .into());
        }

        let (nonce_bytes, sealed) = rest.split_at(NONCE_LEN);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            nonce,
            sealed: sealed.to_vec(),
        })
    }

    /// Encode the envelope as a tagged string.
    pub fn seal(&self) -> String {
        let mut bytes = Vec::with_capacity(1 + NONCE_LEN + self.sealed.len());
        bytes.push(ENVELOPE_VERSION);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.sealed);
        format!("{}{}", ENVELOPE_PREFIX, STANDARD.encode(bytes))
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// Ciphertext followed by the authentication tag.
    pub fn sealed(&self) -> &[u8] {
        &self.sealed
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.seal())
    }
}

/// Check whether a value carries the envelope prefix.
///
/// This is the only test used to decide between "plaintext, leave alone"
/// and "must decrypt". It does not validate the payload.
pub fn is_envelope(value: &str) -> bool {
    value.starts_with(ENVELOPE_PREFIX)
}

fn malformed(reason: impl Into<String>) -> CipherError {
    CipherError::EnvelopeMalformed(reason.into())
}

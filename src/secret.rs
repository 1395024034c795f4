//! Shared secret value objects and the enrollment state.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::base32;
use crate::error::{Error, Result};
use crate::provision;

/// Raw shared secret.
///
/// The bytes are wiped on drop and never appear in `Debug` output; the only
/// way to read them is one of the `reveal` methods.
#[derive(Clone)]
pub struct Secret {
    bytes: Zeroizing<Vec<u8>>,
}

impl Secret {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Decode a secret from its Base32 text form.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `text` contains a character outside the Base32
    /// alphabet before padding.
    pub fn from_base32(text: &str) -> Result<Self> {
        base32::decode(text).map(Self::from_bytes)
    }

    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Raw bytes, for an explicit caller-requested reveal.
    pub fn reveal(&self) -> &[u8] {
        &self.bytes
    }

    /// Unpadded Base32 text, for backup display or copy.
    pub fn reveal_base32(&self) -> String {
        base32::encode(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Zeroizing<Vec<u8>>> for Secret {
    fn from(bytes: Zeroizing<Vec<u8>>) -> Self {
        Self { bytes }
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq::constant_time_eq(&self.bytes, &other.bytes)
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Persisted form of a secret: `{ "secret_base32": "..." }`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    /// Older records name the field `secret_key`.
    #[serde(alias = "secret_key")]
    pub secret_base32: String,
}

impl SecretRecord {
    pub fn from_secret(secret: &Secret) -> Self {
        Self {
            secret_base32: secret.reveal_base32(),
        }
    }

    /// Decode the stored text.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the stored text is not Base32.
    pub fn to_secret(&self) -> Result<Secret> {
        Secret::from_base32(&self.secret_base32)
    }
}

impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRecord")
            .field("secret_base32", &"[REDACTED]")
            .finish()
    }
}

/// Whether a secret is currently held.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Enrollment {
    #[default]
    Unconfigured,
    Configured(Secret),
}

impl Enrollment {
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    pub fn secret(&self) -> Option<&Secret> {
        match self {
            Self::Configured(secret) => Some(secret),
            Self::Unconfigured => None,
        }
    }

    /// Generate a secret if none is held yet, otherwise keep the current one.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the secure random source is unavailable.
    pub fn enroll(&mut self, byte_length: usize) -> Result<&Secret> {
        if let Self::Unconfigured = self {
            *self = Self::Configured(provision::generate_secret(byte_length)?);
            tracing::info!(byte_length, "secret enrolled");
        }

        self.secret().ok_or(Error::NotConfigured)
    }

    /// Replace any held secret with a freshly generated one. The previous
    /// secret is dropped and cannot be recovered.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the secure random source is unavailable; the current
    /// state is then left untouched.
    pub fn reset(&mut self, byte_length: usize) -> Result<&Secret> {
        let secret = provision::generate_secret(byte_length)?;
        let replaced = self.is_configured();
        *self = Self::Configured(secret);
        tracing::info!(byte_length, replaced, "secret reset");

        self.secret().ok_or(Error::NotConfigured)
    }

    /// Drop the held secret.
    pub fn clear(&mut self) {
        *self = Self::Unconfigured;
    }
}

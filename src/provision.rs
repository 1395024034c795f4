//! Secret generation and `otpauth://` provisioning URIs.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::clock::TotpClock;
use crate::error::{Error, Result};
use crate::secret::{Secret, SecretRecord};

/// RFC 4226 recommends at least 160 bits.
pub const DEFAULT_SECRET_LENGTH: usize = 20;

/// Everything except RFC 3986 unreserved characters.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Fill `byte_length` bytes from the operating system CSPRNG.
///
/// # Errors
///
/// Returns `Err` if the OS random source cannot be read. There is no
/// fallback to a weaker generator.
pub fn generate_secret(byte_length: usize) -> Result<Secret> {
    let mut bytes = Zeroizing::new(vec![0u8; byte_length]);

    OsRng.try_fill_bytes(&mut bytes).map_err(|err| {
        tracing::error!(error = %err, "secure random source unavailable");
        Error::RandomSourceUnavailable(err)
    })?;

    Ok(Secret::from(bytes))
}

/// Build an `otpauth://totp/` URI for authenticator apps.
///
/// An empty `issuer` yields a bare account label and no `issuer` parameter.
pub fn provisioning_uri(
    secret: &Secret,
    account: &str,
    issuer: &str,
    step: u64,
    digits: u32,
) -> String {
    let account = utf8_percent_encode(account, URI_COMPONENT);

    if issuer.is_empty() {
        return format!(
            "otpauth://totp/{account}?secret={}&algorithm=SHA1&digits={digits}&period={step}",
            secret.reveal_base32(),
        );
    }

    let issuer = utf8_percent_encode(issuer, URI_COMPONENT);
    format!(
        "otpauth://totp/{issuer}:{account}?secret={}&issuer={issuer}&algorithm=SHA1&digits={digits}&period={step}",
        secret.reveal_base32(),
    )
}

/// One-shot bundle handed to the enrollment screen.
#[derive(Debug)]
pub struct ProvisioningRecord {
    secret: Secret,
    account: String,
    issuer: String,
    clock: TotpClock,
}

impl ProvisioningRecord {
    pub fn new(
        secret: Secret,
        account: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            secret,
            account: account.into(),
            issuer: issuer.into(),
            clock: TotpClock::default(),
        }
    }

    /// Generate a fresh secret and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the secure random source is unavailable.
    pub fn generate(
        byte_length: usize,
        account: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(generate_secret(byte_length)?, account, issuer))
    }

    /// Advertise a non-default step or width in the URI.
    pub fn with_clock(mut self, clock: TotpClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn uri(&self) -> String {
        provisioning_uri(
            &self.secret,
            &self.account,
            &self.issuer,
            self.clock.step(),
            self.clock.digits(),
        )
    }

    /// Record to persist for later verification.
    pub fn secret_record(&self) -> SecretRecord {
        SecretRecord::from_secret(&self.secret)
    }

    /// Consume the bundle, keeping only the secret.
    pub fn into_secret(self) -> Secret {
        self.secret
    }
}

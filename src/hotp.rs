//! HOTP generator using HMAC-SHA1 (RFC 4226).

use std::fmt;

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

/// Default code width.
pub const DEFAULT_DIGITS: u32 = 6;
/// Largest width whose modulus still fits in a `u32`.
pub const MAX_DIGITS: u32 = 9;

/// Decimal one-time code, left-padded with zeros to a fixed width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code {
    value: String,
}

impl Code {
    /// Parse a user-submitted code.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `candidate` is not exactly `digits` ASCII digits.
    pub fn parse(candidate: &str, digits: u32) -> Result<Self> {
        if candidate.len() != digits as usize
            || !candidate.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::InvalidCodeFormat { expected: digits });
        }

        Ok(Self {
            value: candidate.to_owned(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn digits(&self) -> u32 {
        self.value.len() as u32
    }

    /// Compare against another code without short-circuiting on content.
    pub fn matches(&self, other: &Code) -> bool {
        constant_time_eq::constant_time_eq(
            self.value.as_bytes(),
            other.value.as_bytes(),
        )
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Ensure `digits` is a usable code width.
///
/// # Errors
///
/// Returns `Err` if `digits` is not contained between 1 and [`MAX_DIGITS`].
pub fn validate_digits(digits: u32) -> Result<()> {
    if !(1..=MAX_DIGITS).contains(&digits) {
        return Err(Error::config(
            "digits",
            format!("digits must be between 1 and {MAX_DIGITS}"),
        ));
    }

    Ok(())
}

/// Dynamic truncation: 31-bit integer read at the offset given by the low
/// nibble of the last digest byte.
#[inline]
fn truncate(digest: &[u8]) -> u32 {
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;

    u32::from_be_bytes([
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]) & 0x7fff_ffff
}

/// Generate the HOTP code for `counter`.
///
/// # Errors
///
/// Returns `Err` if `digits` is out of range.
pub fn generate(secret: &[u8], counter: u64, digits: u32) -> Result<Code> {
    validate_digits(digits)?;

    let mut mac = HmacSha1::new_from_slice(secret)
        .map_err(|err| Error::config("secret", err.to_string()))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let code_int = truncate(&digest) % 10u32.pow(digits);

    Ok(Code {
        value: format!("{:0>width$}", code_int, width = digits as usize),
    })
}

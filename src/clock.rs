//! Time adapters and the TOTP time-step arithmetic (RFC 6238).

use crate::error::{Error, Result};
use crate::hotp::{self, Code};
use crate::secret::Secret;

/// Default time step in seconds.
pub const DEFAULT_STEP: u64 = 30;

/// Port for getting the current time.
pub trait Clock: Send + Sync {
    /// Get the current Unix timestamp in seconds.
    fn now(&self) -> u64;
}

/// System clock using the OS time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH)
        {
            Ok(elapsed) => elapsed.as_secs(),
            Err(err) => {
                tracing::warn!(error = %err, "system time before Unix epoch");
                0
            },
        }
    }
}

/// Clock frozen at a given timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    timestamp: u64,
}

impl FixedClock {
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.timestamp
    }
}

/// Maps wall-clock time onto HOTP counters.
///
/// The step is shared knowledge between generator and verifier: two parties
/// using different steps never agree on a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotpClock {
    step: u64,
    digits: u32,
}

impl TotpClock {
    /// Create a new clock with validation.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `step` is zero or `digits` is out of range.
    pub fn new(step: u64, digits: u32) -> Result<Self> {
        if step == 0 {
            return Err(Error::config("period", "time step must be greater than 0"));
        }
        hotp::validate_digits(digits)?;

        Ok(Self { step, digits })
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Counter of the step containing `now`.
    #[inline]
    pub fn counter_at(&self, now: u64) -> u64 {
        now / self.step
    }

    /// Seconds left in the step containing `now`, in `1..=step`.
    #[inline]
    pub fn remaining_seconds(&self, now: u64) -> u64 {
        self.step - (now % self.step)
    }

    /// Code for the step containing `now`. Meant for display; verification
    /// goes through [`crate::verifier::Verifier`].
    pub fn current_code(&self, secret: &Secret, now: u64) -> Result<Code> {
        hotp::generate(secret.as_bytes(), self.counter_at(now), self.digits)
    }

    /// Same as [`TotpClock::current_code`] reading time from `clock`.
    pub fn code_now(&self, secret: &Secret, clock: &dyn Clock) -> Result<Code> {
        self.current_code(secret, clock.now())
    }
}

impl Default for TotpClock {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            digits: hotp::DEFAULT_DIGITS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfc_secret() -> Secret {
        Secret::from_bytes(b"12345678901234567890".to_vec())
    }

    #[test]
    fn test_counter_at() {
        let clock = TotpClock::default();

        assert_eq!(clock.counter_at(0), 0);
        assert_eq!(clock.counter_at(29), 0);
        assert_eq!(clock.counter_at(30), 1);
        assert_eq!(clock.counter_at(59), 1);
        assert_eq!(clock.counter_at(1_111_111_109), 37_037_036);
    }

    #[test]
    fn test_remaining_seconds_boundary() {
        let clock = TotpClock::default();

        assert_eq!(clock.remaining_seconds(0), 30);
        assert_eq!(clock.remaining_seconds(60), 30);
        assert_eq!(clock.remaining_seconds(59), 1);
        assert_eq!(clock.remaining_seconds(45), 15);

        let clock = TotpClock::new(1, 6).unwrap();
        assert_eq!(clock.remaining_seconds(12345), 1);
    }

    #[test]
    fn test_rfc6238_sha1_vectors() {
        let clock = TotpClock::new(30, 8).unwrap();
        let secret = rfc_secret();

        for (time, expected) in [
            (59, "94287082"),
            (1_111_111_109, "07081804"),
            (1_111_111_111, "14050471"),
            (1_234_567_890, "89005924"),
            (2_000_000_000, "69279037"),
            (20_000_000_000, "65353130"),
        ] {
            let code = clock.current_code(&secret, time).unwrap();
            assert_eq!(code.as_str(), expected, "time {time}");
        }
    }

    #[test]
    fn test_six_digit_default() {
        let code = TotpClock::default()
            .code_now(&rfc_secret(), &FixedClock::new(59))
            .unwrap();

        assert_eq!(code.as_str(), "287082");
    }

    #[test]
    fn test_invalid_clock() {
        assert!(TotpClock::new(0, 6).is_err());
        assert!(TotpClock::new(30, 0).is_err());
        assert!(TotpClock::new(30, 10).is_err());
    }

    #[test]
    fn test_system_clock() {
        // 2020-01-01.
        assert!(SystemClock::new().now() > 1_577_836_800);
    }
}

//! Code verification with clock-skew tolerance.

use crate::clock::{Clock, TotpClock};
use crate::error::Result;
use crate::hotp::{self, Code};
use crate::secret::Secret;

/// Default number of adjacent steps accepted on each side.
pub const DEFAULT_WINDOW: u32 = 1;

/// Checks candidate codes against the current step and its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verifier {
    clock: TotpClock,
    window: u32,
}

impl Verifier {
    /// Create a new verifier.
    ///
    /// `window` is the number of steps tolerated before and after the
    /// current one. Each extra step widens the span during which an
    /// observed code stays valid.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `step` is zero or `digits` is out of range.
    pub fn new(step: u64, window: u32, digits: u32) -> Result<Self> {
        Ok(Self {
            clock: TotpClock::new(step, digits)?,
            window,
        })
    }

    pub fn with_clock(clock: TotpClock, window: u32) -> Self {
        Self { clock, window }
    }

    pub fn clock(&self) -> &TotpClock {
        &self.clock
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    /// Whether `candidate` matches any step of the window around `now`.
    ///
    /// A badly formatted candidate is a plain mismatch.
    pub fn check(&self, candidate: &str, secret: &Secret, now: u64) -> bool {
        self.matched_counter(candidate, secret, now).is_some()
    }

    /// Same as [`Verifier::check`] reading time from `clock`.
    pub fn check_now(
        &self,
        candidate: &str,
        secret: &Secret,
        clock: &dyn Clock,
    ) -> bool {
        self.check(candidate, secret, clock.now())
    }

    /// Counter of the step `candidate` was generated for, if any in the
    /// window.
    pub fn matched_counter(
        &self,
        candidate: &str,
        secret: &Secret,
        now: u64,
    ) -> Option<u64> {
        self.matched_counter_after(candidate, secret, now, None)
    }

    /// Like [`Verifier::matched_counter`], ignoring counters at or below
    /// `floor`.
    pub fn matched_counter_after(
        &self,
        candidate: &str,
        secret: &Secret,
        now: u64,
        floor: Option<u64>,
    ) -> Option<u64> {
        let candidate = match Code::parse(candidate, self.clock.digits()) {
            Ok(code) => code,
            Err(err) => {
                tracing::debug!(error = %err, "rejected malformed code");
                return None;
            },
        };

        let current = self.clock.counter_at(now);
        let matched = window_counters(current, self.window)
            .filter(|&counter| floor.is_none_or(|floor| counter > floor))
            .find(|&counter| {
                hotp::generate(secret.as_bytes(), counter, self.clock.digits())
                    .is_ok_and(|code| code.matches(&candidate))
            });

        match matched {
            Some(counter) => tracing::debug!(
                counter,
                offset = counter as i128 - current as i128,
                "code accepted"
            ),
            None => tracing::debug!(
                counter = current,
                window = self.window,
                "code rejected"
            ),
        }

        matched
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self {
            clock: TotpClock::default(),
            window: DEFAULT_WINDOW,
        }
    }
}

/// Counters in order `0, -1, +1, -2, +2, ...` around `current`, skipping
/// any that would leave the `u64` range.
fn window_counters(current: u64, window: u32) -> impl Iterator<Item = u64> {
    std::iter::once(current).chain((1..=window as u64).flat_map(move |offset| {
        current
            .checked_sub(offset)
            .into_iter()
            .chain(current.checked_add(offset))
    }))
}

/// Verifier that refuses to accept the same step twice for one secret.
///
/// Tracks the highest accepted counter; any code matching that counter or
/// an earlier one is rejected. The state belongs to a single secret and
/// must be reset alongside it.
#[derive(Debug, Clone)]
pub struct ReplayGuard {
    verifier: Verifier,
    last_accepted: Option<u64>,
}

impl ReplayGuard {
    pub fn new(verifier: Verifier) -> Self {
        Self {
            verifier,
            last_accepted: None,
        }
    }

    /// Resume from a previously persisted counter.
    pub fn with_last_accepted(mut self, counter: Option<u64>) -> Self {
        self.last_accepted = counter;
        self
    }

    pub fn last_accepted(&self) -> Option<u64> {
        self.last_accepted
    }

    /// Verify and, on success, record the matched counter.
    pub fn check(&mut self, candidate: &str, secret: &Secret, now: u64) -> bool {
        match self.verifier.matched_counter_after(
            candidate,
            secret,
            now,
            self.last_accepted,
        ) {
            Some(counter) => {
                self.last_accepted = Some(counter);
                true
            },
            None => false,
        }
    }

    /// Forget accepted counters, e.g. after a secret reset.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

//! Time-based one-time passwords (RFC 6238) on top of HOTP (RFC 4226).
//!
//! Every operation takes the [`Secret`] explicitly and holds no shared state.
//! Only [`store`] performs I/O.
//!
//! ```rust
//! use totp_engine::{Secret, TotpClock, Verifier};
//!
//! let secret = Secret::from_base32("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap();
//! let code = TotpClock::default().current_code(&secret, 59).unwrap();
//!
//! assert_eq!(code.as_str(), "287082");
//! assert!(Verifier::default().check("287082", &secret, 59));
//! ```

#![forbid(unsafe_code)]
#![deny(unused_mut)]

pub mod base32;
pub mod clock;
pub mod config;
pub mod error;
pub mod hotp;
pub mod provision;
pub mod secret;
pub mod store;
pub mod telemetry;
pub mod verifier;

pub use clock::{Clock, FixedClock, SystemClock, TotpClock};
pub use error::{Error, Result};
pub use hotp::Code;
pub use provision::{ProvisioningRecord, generate_secret, provisioning_uri};
pub use secret::{Enrollment, Secret, SecretRecord};
pub use store::{JsonFileStore, SecretStore};
pub use verifier::{ReplayGuard, Verifier};

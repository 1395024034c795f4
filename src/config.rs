//! Configuration manager.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clock::{DEFAULT_STEP, TotpClock};
use crate::error::{Error, Result};
use crate::hotp::DEFAULT_DIGITS;
use crate::provision::{DEFAULT_SECRET_LENGTH, ProvisioningRecord};
use crate::secret::Secret;
use crate::store::JsonFileStore;
use crate::verifier::{DEFAULT_WINDOW, Verifier};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_SECRET_PATH: &str = "totp_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Issuer label shown by authenticator apps.
    pub issuer: String,
    /// Account label shown by authenticator apps.
    pub account: String,
    /// Where the secret record lives.
    pub secret_path: PathBuf,
    /// Related to code generation and verification.
    pub totp: Totp,
    #[serde(skip)]
    path: PathBuf,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            issuer: "ExpressSystem".into(),
            account: "admin".into(),
            secret_path: PathBuf::from(DEFAULT_SECRET_PATH),
            totp: Totp::default(),
            path: PathBuf::default(),
        }
    }
}

/// TOTP configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totp {
    /// Only `SHA1` is supported.
    pub algorithm: String,
    /// Number of digits for the code.
    pub digits: u32,
    /// Seconds each code stays valid.
    pub period: u64,
    /// Adjacent periods accepted on each side.
    pub window: u32,
    /// Bytes of randomness in a new secret.
    pub secret_length: usize,
}

impl Default for Totp {
    fn default() -> Self {
        Self {
            algorithm: "SHA1".into(),
            digits: DEFAULT_DIGITS,
            period: DEFAULT_STEP,
            window: DEFAULT_WINDOW,
            secret_length: DEFAULT_SECRET_LENGTH,
        }
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the configuration from the path set with
    /// [`Configuration::path`], or from `config.yaml` in the working
    /// directory. Only the implicit default location may be missing, in
    /// which case defaults apply.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an explicit path cannot be opened, or if the file is
    /// not valid YAML or fails validation.
    pub fn read(self) -> Result<Self> {
        let config = if self.path.as_os_str().is_empty() {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);

            match File::open(default_path) {
                Ok(file) => Self::parse(file, default_path.to_path_buf())?,
                Err(err) => {
                    tracing::error!(error = %err, path = %default_path.display(), "configuration file not found, using defaults");
                    self
                },
            }
        } else {
            let file = File::open(&self.path).inspect_err(|err| {
                tracing::error!(error = %err, path = %self.path.display(), "cannot open configuration file");
            })?;
            Self::parse(file, self.path)?
        };

        config.validate()?;
        Ok(config)
    }

    fn parse(file: File, path: PathBuf) -> Result<Self> {
        let mut config: Configuration = serde_yaml::from_reader(file)?;
        config.path = path;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `yaml` is invalid or fails validation.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Configuration = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values both sides of a TOTP exchange must agree on.
    pub fn validate(&self) -> Result<()> {
        if !self.totp.algorithm.eq_ignore_ascii_case("SHA1") {
            return Err(Error::config("algorithm", "only SHA1 is supported"));
        }

        if self.totp.secret_length == 0 {
            return Err(Error::config(
                "secret_length",
                "secret must be at least one byte",
            ));
        }

        TotpClock::new(self.totp.period, self.totp.digits).map(|_| ())
    }

    pub fn clock(&self) -> Result<TotpClock> {
        TotpClock::new(self.totp.period, self.totp.digits)
    }

    pub fn verifier(&self) -> Result<Verifier> {
        Ok(Verifier::with_clock(self.clock()?, self.totp.window))
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.secret_path)
    }

    /// Bundle `secret` with this instance's labels for enrollment.
    pub fn provisioning(&self, secret: Secret) -> Result<ProvisioningRecord> {
        Ok(
            ProvisioningRecord::new(secret, &self.account, &self.issuer)
                .with_clock(self.clock()?),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Configuration::from_yaml("{}").unwrap();

        assert_eq!(config, Configuration::default());
        assert_eq!(config.verifier().unwrap(), Verifier::default());
        assert_eq!(config.totp.secret_length, 20);
    }

    #[test]
    fn test_parse() {
        let config = Configuration::from_yaml(
            r#"
issuer: Express System
account: root
secret_path: /var/lib/totp/secret.json
totp:
  algorithm: sha1
  digits: 8
  period: 60
  window: 2
"#,
        )
        .unwrap();

        assert_eq!(config.issuer, "Express System");
        assert_eq!(config.account, "root");
        assert_eq!(config.store().path(), Path::new("/var/lib/totp/secret.json"));
        assert_eq!(config.clock().unwrap(), TotpClock::new(60, 8).unwrap());
        assert_eq!(config.verifier().unwrap().window(), 2);
        assert_eq!(config.totp.secret_length, 20);
    }

    #[test]
    fn test_validation() {
        assert!(Configuration::from_yaml("totp: { period: 0 }").is_err());
        assert!(Configuration::from_yaml("totp: { digits: 12 }").is_err());
        assert!(Configuration::from_yaml("totp: { algorithm: SHA256 }").is_err());
        assert!(Configuration::from_yaml("totp: { secret_length: 0 }").is_err());
        assert!(Configuration::from_yaml("totp: [").is_err());
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "account: operator\n").unwrap();

        let config = Configuration::default().path(path).read().unwrap();
        assert_eq!(config.account, "operator");
        assert_eq!(config.issuer, "ExpressSystem");
    }

    #[test]
    fn test_read_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");

        assert!(matches!(
            Configuration::default().path(path).read(),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_provisioning() {
        let config = Configuration::from_yaml("totp: { digits: 8 }").unwrap();
        let record = config
            .provisioning(Secret::from_base32("JBSWY3DPEHPK3PXP").unwrap())
            .unwrap();

        assert_eq!(
            record.uri(),
            "otpauth://totp/ExpressSystem:admin?secret=JBSWY3DPEHPK3PXP&issuer=ExpressSystem&algorithm=SHA1&digits=8&period=30"
        );
    }
}

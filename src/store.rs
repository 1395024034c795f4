//! Secret persistence.
//!
//! The engine only needs something that can read and write a
//! [`SecretRecord`]; [`JsonFileStore`] keeps it in a small JSON file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

use crate::error::Result;
use crate::secret::{Enrollment, Secret, SecretRecord};

/// Port for loading and saving the active secret.
pub trait SecretStore: Send + Sync {
    /// Load the current state. A missing record means [`Enrollment::Unconfigured`].
    fn load(&self) -> Result<Enrollment>;

    /// Persist `secret`, overwriting any previous one.
    fn save(&self, secret: &Secret) -> Result<()>;

    /// Remove the persisted secret.
    fn clear(&self) -> Result<()>;
}

/// Stores the secret as `{ "secret_base32": "..." }` in one file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the record, created on demand.
    fn directory(&self) -> Result<&Path> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                Ok(parent)
            },
            _ => Ok(Path::new(".")),
        }
    }

    /// Write a sibling temporary file (mode 0600 on unix) through `write`,
    /// then rename it over the record. The previous record stays intact
    /// until the rename succeeds.
    fn replace_with(
        &self,
        write: impl FnOnce(&mut NamedTempFile) -> std::io::Result<()>,
    ) -> Result<()> {
        let mut file = Builder::new()
            .prefix(".totp_record")
            .suffix(".tmp")
            .tempfile_in(self.directory()?)?;

        write(&mut file)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|err| err.error)?;

        Ok(())
    }
}

impl SecretStore for JsonFileStore {
    fn load(&self) -> Result<Enrollment> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no secret record found");
                return Ok(Enrollment::Unconfigured);
            },
            Err(err) => return Err(err.into()),
        };

        let record: SecretRecord = serde_json::from_str(&content)?;
        Ok(Enrollment::Configured(record.to_secret()?))
    }

    fn save(&self, secret: &Secret) -> Result<()> {
        let json = serde_json::to_string(&SecretRecord::from_secret(secret))?;
        self.replace_with(|file| file.write_all(json.as_bytes()))?;

        tracing::info!(path = %self.path.display(), "secret record saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

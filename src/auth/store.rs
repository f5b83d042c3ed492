//! Disk-backed credential cache.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::BaseDirs;

use super::Credential;
use crate::{Error, Result};

const CACHE_DIR: &str = ".authrelay";

/// One JSON file per (session name, environment) under a fixed root.
///
/// No locking: a single process is assumed to own a given entry. Writes go
/// directly to the destination file; a torn write shows up later as a
/// corrupt entry and is recovered as a cache miss.
#[derive(Clone, Debug)]
pub struct CredentialStore {
    root: PathBuf,
}

impl CredentialStore {
    /// Store under the user's home directory.
    pub fn user_scoped() -> Result<Self> {
        let dirs =
            BaseDirs::new().ok_or_else(|| Error::config("user home directory not available"))?;
        Ok(Self {
            root: dirs.home_dir().join(CACHE_DIR),
        })
    }

    /// Store under an explicit root.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, name: &str, environment: &str) -> PathBuf {
        self.root.join(format!("{name}-{environment}.json"))
    }

    /// Read the cached credential, if a readable and parseable one exists.
    ///
    /// Every failure mode is a cache miss: a missing file is logged at
    /// debug, an unreadable or corrupt one at warn. Nothing propagates.
    pub async fn load(&self, name: &str, environment: &str) -> Option<Credential> {
        let path = self.entry_path(name, environment);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no cached credentials");
                return None;
            }
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "failed to read cached credentials, treating as a miss"
                );
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(credential) => Some(credential),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "cached credentials are corrupt, treating as a miss"
                );
                None
            }
        }
    }

    /// Serialize and write the credential, overwriting unconditionally.
    pub async fn save(&self, name: &str, environment: &str, credential: &Credential) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let content = serde_json::to_string(credential)?;
        tokio::fs::write(self.entry_path(name, environment), content).await?;
        Ok(())
    }

    /// Delete the cached entry. Succeeds if it was already absent.
    pub async fn clear(&self, name: &str, environment: &str) -> Result<()> {
        match tokio::fs::remove_file(self.entry_path(name, environment)).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

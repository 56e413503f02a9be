//! On-disk session token cache.

use smartconnect_types::{CacheError, Session};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Persists the [`Session`] as a single JSON file.
///
/// The file is overwritten wholesale on every store. There is no locking or
/// schema versioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Creates a cache backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the cache file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the cache file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the cached session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not contain a
    /// session record.
    pub fn load(&self) -> Result<Session, CacheError> {
        let content = fs::read_to_string(&self.path).map_err(|e| CacheError::ReadFile {
            path: self.path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| CacheError::ParseJson {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Writes the session, replacing any previous snapshot.
    ///
    /// Missing parent directories are created. On unix the file is made
    /// readable by the owner only.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized or written.
    pub fn store(&self, session: &Session) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(session).map_err(CacheError::SerializeJson)?;
        let write_err = |e| CacheError::WriteFile {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(write_err)?;

        // An existing file keeps its old mode on open; narrow it before writing.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;
        }

        file.write_all(json.as_bytes()).map_err(write_err)?;

        tracing::debug!(path = %self.path.display(), "stored session tokens");
        Ok(())
    }
}

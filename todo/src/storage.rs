//! File-backed key-value storage.
//!
//! All keys live in one JSON object file, `{"key": "value", ...}`. Every
//! write re-encodes the whole map, writes it to a temporary file next to
//! the target, and renames it into place, so readers never see a torn
//! file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use todo_desk_core::storage::{KeyValueStorage, Result, StorageError};

/// Default byte quota, the usual browser local-storage limit
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Key-value store persisted to a single JSON file
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    quota: usize,
    /// Serializes read-modify-write cycles within the process
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Opens storage at `path` with the default quota
    ///
    /// The file is not touched until the first read or write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_quota(path, DEFAULT_QUOTA_BYTES)
    }

    /// Opens storage at `path` limited to `quota` encoded bytes
    #[must_use]
    pub fn with_quota(path: impl Into<PathBuf>, quota: usize) -> Self {
        Self {
            path: path.into(),
            quota,
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured quota in bytes
    #[must_use]
    pub const fn quota(&self) -> usize {
        self.quota
    }

    /// Where an unreadable storage file is copied before it is replaced
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        self.sibling("corrupt")
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(error) => return Err(error.into()),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let encoded = serde_json::to_string(map)?;
        if encoded.len() > self.quota {
            return Err(StorageError::QuotaExceeded {
                size: encoded.len(),
                limit: self.quota,
            });
        }

        let tmp = self.temp_path();
        fs::write(&tmp, &encoded)?;
        if let Err(error) = fs::rename(&tmp, &self.path) {
            // Best effort; the rename error is the one worth reporting
            let _ = fs::remove_file(&tmp);
            return Err(error.into());
        }

        tracing::trace!(path = %self.path.display(), bytes = encoded.len(), "Storage file written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling("tmp")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "storage".into(), |n| n.to_string_lossy().into_owned());
        self.path.with_file_name(format!(".{name}.{suffix}"))
    }

    /// Map to write into: the current contents, or an empty map when the
    /// file cannot be decoded
    fn map_for_write(&self) -> Result<BTreeMap<String, String>> {
        match self.read_map() {
            Err(StorageError::Serialization(error)) => {
                let backup = self.backup_path();
                match fs::copy(&self.path, &backup) {
                    Ok(_) => tracing::warn!(
                        path = %self.path.display(),
                        backup = %backup.display(),
                        %error,
                        "Storage file is malformed, replacing it"
                    ),
                    Err(copy_error) => tracing::warn!(
                        path = %self.path.display(),
                        %error,
                        %copy_error,
                        "Storage file is malformed and could not be backed up, replacing it"
                    ),
                }
                Ok(BTreeMap::new())
            },
            other => other,
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut map = self.read_map()?;
        Ok(map.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut map = self.map_for_write()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }
}

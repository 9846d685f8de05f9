//! Key-value storage for persisted application state.
//!
//! Mirrors the contract of browser local storage: string keys map to
//! string values, reads of an absent key return `None`, and a write
//! replaces whatever was stored under the key before.

use thiserror::Error;

/// Error types for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("Storage data is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The write would grow the store past its byte quota.
    #[error("Storage quota exceeded: {size} bytes requested, limit is {limit} bytes")]
    QuotaExceeded {
        /// Size in bytes the store would have after the write
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A local key-value store with string values.
///
/// Operations are synchronous: the store is local to the process and a
/// write has completed once `set` returns.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing medium cannot be read or is corrupt.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails or exceeds the quota.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

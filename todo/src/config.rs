//! Configuration for the todo-desk binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::storage::DEFAULT_QUOTA_BYTES;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Directory override for the storage file
pub const DATA_DIR_VAR: &str = "TODO_DESK_DATA_DIR";
/// File name of the storage file inside the data directory
pub const STORAGE_FILE_VAR: &str = "TODO_DESK_STORAGE_FILE";
/// Byte quota for the storage file
pub const STORAGE_QUOTA_VAR: &str = "TODO_DESK_STORAGE_QUOTA";
/// Default log filter, used when `RUST_LOG` is unset
pub const LOG_VAR: &str = "TODO_DESK_LOG";

const DEFAULT_STORAGE_FILE: &str = "local-storage.json";
const DEFAULT_LOG_FILTER: &str = "todo_desk=info,todo_desk_runtime=info";
const APP_DIR: &str = "todo-desk";

/// Errors from reading configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The quota is not a positive integer.
    #[error("{var} must be a positive byte count, got {value:?}")]
    InvalidQuota {
        /// Variable name
        var: &'static str,
        /// Rejected value
        value: String,
    },

    /// The storage file name is unusable.
    #[error("{var} must be a plain file name, got {value:?}")]
    InvalidFileName {
        /// Variable name
        var: &'static str,
        /// Rejected value
        value: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the storage file
    pub data_dir: PathBuf,
    /// Name of the storage file
    pub storage_file: String,
    /// Maximum encoded size of the storage file in bytes
    pub storage_quota: usize,
    /// Default `tracing` filter directive
    pub log_filter: String,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let data_dir = get(DATA_DIR_VAR).map_or_else(
            || default_data_dir(get("XDG_DATA_HOME"), get("HOME")),
            PathBuf::from,
        );

        let storage_file = match get(STORAGE_FILE_VAR) {
            Some(name) if is_plain_file_name(&name) => name,
            Some(name) => {
                return Err(ConfigError::InvalidFileName {
                    var: STORAGE_FILE_VAR,
                    value: name,
                });
            },
            None => DEFAULT_STORAGE_FILE.to_string(),
        };

        let storage_quota = match get(STORAGE_QUOTA_VAR) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(quota) if quota > 0 => quota,
                _ => {
                    return Err(ConfigError::InvalidQuota {
                        var: STORAGE_QUOTA_VAR,
                        value: raw,
                    });
                },
            },
            None => DEFAULT_QUOTA_BYTES,
        };

        let log_filter = get(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            data_dir,
            storage_file,
            storage_quota,
            log_filter,
        })
    }

    /// Full path of the storage file
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage_file)
    }
}

fn default_data_dir(xdg_data_home: Option<String>, home: Option<String>) -> PathBuf {
    match (xdg_data_home, home) {
        (Some(xdg), _) => PathBuf::from(xdg).join(APP_DIR),
        (None, Some(home)) => PathBuf::from(home).join(".local").join("share").join(APP_DIR),
        (None, None) => PathBuf::from(".").join(format!(".{APP_DIR}")),
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.contains(['/', '\\']) && name != "." && name != ".."
}

use std::io;
use std::path::Path;
use thiserror::Error;

use crate::models::key_path::KeyPath;

#[cfg(test)]
pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("unrecognized registry root: {0}")]
    MalformedKeyPath(String),
    #[error("failed to export {key}: {detail}")]
    ExportFailed { key: String, detail: String },
    #[error("registry access is not supported on this platform")]
    Unsupported,
    #[error("{key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn from_io(key: &KeyPath, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(key.to_string()),
            io::ErrorKind::PermissionDenied => Self::AccessDenied(key.to_string()),
            _ => Self::Io {
                key: key.to_string(),
                source: err,
            },
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Hierarchical key/value store holding application registrations.
pub trait ResourceStore {
    /// Names of the immediate subkeys of `key`, in store order.
    fn enumerate_children(&self, key: &KeyPath) -> StoreResult<Vec<String>>;

    /// A string value of `key`; `Ok(None)` when the value is absent.
    fn read_value(&self, key: &KeyPath, name: &str) -> StoreResult<Option<String>>;

    /// Writes `key` and everything below it to `destination`.
    fn export_subtree(&self, key: &KeyPath, destination: &Path) -> StoreResult<()>;

    /// Deletes `key` together with all of its subkeys.
    fn delete_subtree(&self, key: &KeyPath) -> StoreResult<()>;
}

//! File-backed key-value store.
//!
//! Mirrors browser local storage: a flat map of string keys to string values,
//! persisted as one JSON object. Every write replaces the whole file, going
//! through a temporary file and a rename so a crash never leaves a torn file.

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the store file inside the data directory.
pub const STORE_FILE_NAME: &str = "storage.json";

/// Default maximum store file size (32MB).
///
/// Writes that would grow the file past the limit are refused, so a store
/// that was readable stays readable.
pub const MAX_FILE_SIZE: u64 = 32 * 1024 * 1024;

/// Persistent string-to-string map.
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    path: PathBuf,
    max_size: u64,
}

impl KeyValueStore {
    /// Opens the store in `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir).map_err(|e| Error::OperationFailed {
            operation: "create_data_dir".to_string(),
            cause: format!("{}: {e}", data_dir.display()),
        })?;

        Ok(Self {
            path: data_dir.join(STORE_FILE_NAME),
            max_size: MAX_FILE_SIZE,
        })
    }

    /// Sets the file size limit.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Returns the file size limit in bytes.
    #[must_use]
    pub const fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Returns the path of the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the value stored under `key`.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut map = self.read_all().await?;
        Ok(map.remove(key))
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub async fn set(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let mut map = self.read_all().await?;
        map.insert(key.to_string(), value.into());
        self.write_all(&map).await
    }

    /// Removes `key`. Returns true if it was present.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let mut map = self.read_all().await?;
        if map.remove(key).is_none() {
            return Ok(false);
        }
        self.write_all(&map).await?;
        Ok(true)
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let read_failed = |e: std::io::Error| Error::OperationFailed {
            operation: "read_kv_file".to_string(),
            cause: format!("{}: {e}", self.path.display()),
        };

        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(read_failed(e)),
        };
        if metadata.len() > self.max_size {
            return Err(Error::OperationFailed {
                operation: "read_kv_file".to_string(),
                cause: format!(
                    "{} exceeds maximum size of {} bytes",
                    self.path.display(),
                    self.max_size
                ),
            });
        }

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(read_failed(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| Error::OperationFailed {
            operation: "parse_kv_file".to_string(),
            cause: e.to_string(),
        })
    }

    async fn write_all(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_vec_pretty(map).map_err(|e| Error::OperationFailed {
            operation: "serialize_kv_file".to_string(),
            cause: e.to_string(),
        })?;

        if json.len() as u64 > self.max_size {
            return Err(Error::OperationFailed {
                operation: "write_kv_file".to_string(),
                cause: format!(
                    "store would grow to {} bytes, over the {} byte limit",
                    json.len(),
                    self.max_size
                ),
            });
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| Error::OperationFailed {
                operation: "write_kv_file".to_string(),
                cause: format!("{}: {e}", tmp.display()),
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::OperationFailed {
                operation: "replace_kv_file".to_string(),
                cause: format!("{}: {e}", self.path.display()),
            })
    }
}

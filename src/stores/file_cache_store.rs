use crate::errors::ToolError;
use crate::stores::CacheStore;
use crate::utils::fs_atomic::atomic_write_text_file;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Shared on-disk key-value store: one JSON file per key under a dedicated
/// cache directory, written atomically so concurrent agent processes never
/// observe torn entries.
pub struct FileCacheStore {
    cache_dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            cache_dir: cache_dir.as_ref().to_path_buf(),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Result<Option<Value>, ToolError> {
        let raw = match std::fs::read_to_string(self.entry_path(key)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(ToolError::internal(format!(
                    "Failed to read cache entry: {}",
                    err
                )))
            }
        };
        // A corrupt entry counts as a miss, not a failure.
        Ok(serde_json::from_str(&raw).ok())
    }

    fn set(&self, key: &str, entry: &Value) -> Result<(), ToolError> {
        std::fs::create_dir_all(&self.cache_dir)
            .map_err(|err| ToolError::internal(format!("Failed to create cache dir: {}", err)))?;
        let serialized = serde_json::to_string(entry).map_err(|err| {
            ToolError::internal(format!("Failed to serialize cache entry: {}", err))
        })?;
        atomic_write_text_file(self.entry_path(key), &serialized, 0o600)
            .map_err(|err| ToolError::internal(format!("Failed to write cache entry: {}", err)))
    }

    fn remove(&self, key: &str) -> Result<(), ToolError> {
        match std::fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ToolError::internal(format!(
                "Failed to remove cache entry: {}",
                err
            ))),
        }
    }
}

mod file_cache_store;
mod memory_cache_store;

pub use file_cache_store::FileCacheStore;
pub use memory_cache_store::MemoryCacheStore;

use crate::errors::ToolError;
use serde_json::Value;

/// Backing store for cached WP-CLI read results. Entries are opaque JSON
/// payloads; TTL bookkeeping lives in the cache service, not the store.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, ToolError>;
    fn set(&self, key: &str, entry: &Value) -> Result<(), ToolError>;
    fn remove(&self, key: &str) -> Result<(), ToolError>;
}

use crate::errors::ToolError;
use crate::stores::CacheStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-process fallback store, used when the shared on-disk store is
/// unavailable. Scoped to the process lifetime.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<Value>, ToolError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, entry: &Value) -> Result<(), ToolError> {
        self.entries
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .insert(key.to_string(), entry.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ToolError> {
        self.entries
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .remove(key);
        Ok(())
    }
}

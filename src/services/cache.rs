use crate::services::logger::Logger;
use crate::stores::CacheStore;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Memoizes idempotent WP-CLI reads. Keys are content hashes of the full
/// argument vector; entries carry a TTL and belong to a resource family
/// (posts, plugins, themes, options, system) so mutating tools can evict
/// everything the mutation may have stale-ified.
///
/// Store trouble is never allowed to fail the surrounding request: on any
/// primary-store error the service logs a warning and degrades to the
/// in-process fallback.
pub struct CacheService {
    logger: Logger,
    primary: Arc<dyn CacheStore>,
    fallback: Arc<dyn CacheStore>,
    // Explicit key index per family. A pattern delete against the simple
    // stores would silently no-op, so invalidation walks this index instead.
    families: Mutex<HashMap<String, HashSet<String>>>,
}

impl CacheService {
    pub fn new(logger: Logger, primary: Arc<dyn CacheStore>, fallback: Arc<dyn CacheStore>) -> Self {
        Self {
            logger: logger.child("cache"),
            primary,
            fallback,
            families: Mutex::new(HashMap::new()),
        }
    }

    /// Derives the cache key from the full joined argument vector. Distinct
    /// invocations never collide; identical invocations always hit.
    pub fn build_key(argv: &[String]) -> String {
        let mut hasher = Sha256::new();
        for (idx, arg) in argv.iter().enumerate() {
            if idx > 0 {
                hasher.update([0u8]);
            }
            hasher.update(arg.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    fn is_expired(entry: &Value) -> bool {
        let Some(ttl_ms) = entry.get("ttl_ms").and_then(|v| v.as_u64()) else {
            return false;
        };
        let Some(created_at) = entry
            .get("created_at")
            .and_then(|v| v.as_str())
            .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
        else {
            return false;
        };
        let elapsed = chrono::Utc::now().timestamp_millis() - created_at.timestamp_millis();
        elapsed > ttl_ms as i64
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let entry = match self.primary.get(key) {
            Ok(entry) => entry,
            Err(err) => {
                self.logger.warn(
                    "Cache store read failed, falling back to memory",
                    Some(&serde_json::json!({"error": err.message})),
                );
                self.fallback.get(key).ok().flatten()
            }
        }?;
        if Self::is_expired(&entry) {
            self.remove(key);
            return None;
        }
        entry.get("value").cloned()
    }

    pub fn set(&self, family: &str, key: &str, value: &Value, ttl_ms: u64) {
        let entry = serde_json::json!({
            "created_at": chrono::Utc::now().to_rfc3339(),
            "ttl_ms": ttl_ms,
            "family": family,
            "value": value,
        });
        if let Err(err) = self.primary.set(key, &entry) {
            self.logger.warn(
                "Cache store write failed, falling back to memory",
                Some(&serde_json::json!({"error": err.message})),
            );
            let _ = self.fallback.set(key, &entry);
        }
        self.families
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .entry(family.to_string())
            .or_default()
            .insert(key.to_string());
    }

    /// Evicts every key recorded for the family. Runs after a successful
    /// mutating call, before the tool result is returned.
    pub fn invalidate(&self, family: &str) {
        let keys = self
            .families
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .remove(family)
            .unwrap_or_default();
        for key in &keys {
            self.remove(key);
        }
        if !keys.is_empty() {
            self.logger.debug(
                "Cache invalidated",
                Some(&serde_json::json!({"family": family, "keys": keys.len()})),
            );
        }
    }

    fn remove(&self, key: &str) {
        if let Err(err) = self.primary.remove(key) {
            self.logger.warn(
                "Cache store remove failed",
                Some(&serde_json::json!({"error": err.message})),
            );
        }
        let _ = self.fallback.remove(key);
    }
}

use crate::constants::{breaker, cache, limits, timeouts, wordpress};
use std::path::PathBuf;

/// Runtime configuration, resolved once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Static credential expected in `X-API-KEY`. `None` means the agent
    /// runs unauthenticated (degraded dev mode, logged loudly).
    pub api_key: Option<String>,
    /// WP-CLI binary to invoke.
    pub wp_bin: String,
    /// WordPress installation path, passed as `--path=` on every invocation.
    pub wp_path: PathBuf,
    /// Root directory file tools may not escape. Defaults to `wp_path`.
    pub sandbox_root: PathBuf,
    /// Where pre-write backups land. Kept outside the sandbox.
    pub backup_dir: PathBuf,
    /// Shared on-disk cache location for idempotent WP-CLI reads.
    pub cache_dir: PathBuf,
    pub allowed_extensions: Vec<String>,
    pub max_file_bytes: usize,
    pub command_timeout_ms: u64,
    pub cache_ttl_ms: u64,
    pub breaker_failure_threshold: u32,
    pub breaker_recovery_ms: u64,
    pub host: String,
    pub port: u16,
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

impl AgentConfig {
    pub fn from_env() -> Self {
        let wp_path = PathBuf::from(env_string("WP_PATH", "/var/www/html"));
        let sandbox_root = std::env::var("WP_AGENT_SANDBOX_ROOT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| wp_path.clone());
        Self {
            api_key: std::env::var("A2A_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            wp_bin: env_string("WP_CLI_BIN", "wp"),
            wp_path,
            sandbox_root,
            backup_dir: PathBuf::from(env_string("WP_AGENT_BACKUP_DIR", "/var/backups/wp-agent")),
            cache_dir: PathBuf::from(env_string("WP_AGENT_CACHE_DIR", "/var/cache/wp-agent")),
            allowed_extensions: wordpress::EDITABLE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_bytes: env_u64("WP_AGENT_MAX_FILE_BYTES", limits::MAX_FILE_BYTES as u64)
                as usize,
            command_timeout_ms: env_u64("WP_AGENT_TIMEOUT_MS", timeouts::WP_CLI_TIMEOUT_MS),
            cache_ttl_ms: env_u64("WP_AGENT_CACHE_TTL_MS", cache::READ_TTL_MS),
            breaker_failure_threshold: breaker::FAILURE_THRESHOLD,
            breaker_recovery_ms: breaker::RECOVERY_TIMEOUT_MS,
            host: env_string("A2A_HOST", "0.0.0.0"),
            port: env_u64("A2A_PORT", 5000) as u16,
        }
    }
}

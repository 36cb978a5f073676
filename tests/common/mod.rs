#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use wp_agent::config::AgentConfig;
use wp_agent::constants::{limits, wordpress};

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Scratch layout for one test: sandbox, backups, and cache all live under a
/// tempdir that is removed on drop.
pub struct TestEnv {
    pub config: AgentConfig,
    pub root: PathBuf,
    _dir: tempfile::TempDir,
}

pub fn test_env(wp_bin: &str) -> TestEnv {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    let sandbox = root.join("sandbox");
    std::fs::create_dir_all(&sandbox).expect("sandbox dir");
    let config = AgentConfig {
        api_key: Some("test-key".to_string()),
        wp_bin: wp_bin.to_string(),
        wp_path: sandbox.clone(),
        sandbox_root: sandbox,
        backup_dir: root.join("backups"),
        cache_dir: root.join("cache"),
        allowed_extensions: wordpress::EDITABLE_EXTENSIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        max_file_bytes: limits::MAX_FILE_BYTES,
        command_timeout_ms: 5_000,
        cache_ttl_ms: 600_000,
        breaker_failure_threshold: 5,
        breaker_recovery_ms: 60_000,
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    TestEnv {
        config,
        root,
        _dir: dir,
    }
}

/// Drops a stand-in `wp` executable into `dir`. The body is plain `sh`; the
/// incoming `--path`/`--allow-root` prefix arrives as `$1`/`$2`.
pub fn write_fake_wp(dir: &Path, body: &str) -> String {
    let path = dir.join("wp");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write fake wp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod fake wp");
    }
    path.to_string_lossy().into_owned()
}

mod common;
use common::{test_env, write_fake_wp, ENV_LOCK};

use serde_json::Value;
use std::sync::Arc;
use wp_agent::config::AgentConfig;
use wp_agent::errors::ToolErrorKind;
use wp_agent::managers::wp_cli::WpCliRunner;
use wp_agent::services::breaker::{BreakerState, CircuitBreaker};
use wp_agent::services::cache::CacheService;
use wp_agent::services::logger::Logger;
use wp_agent::stores::{FileCacheStore, MemoryCacheStore};

fn runner(config: AgentConfig) -> (Arc<WpCliRunner>, Arc<CircuitBreaker>) {
    let logger = Logger::new("test");
    let config = Arc::new(config);
    let breaker = Arc::new(CircuitBreaker::new(
        logger.clone(),
        config.breaker_failure_threshold,
        config.breaker_recovery_ms,
    ));
    let cache = Arc::new(CacheService::new(
        logger.clone(),
        Arc::new(FileCacheStore::new(config.cache_dir.clone())),
        Arc::new(MemoryCacheStore::new()),
    ));
    let wp = Arc::new(WpCliRunner::new(
        logger,
        config.clone(),
        breaker.clone(),
        cache,
    ));
    (wp, breaker)
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn plain_output_is_returned_trimmed() {
    let _guard = ENV_LOCK.lock().await;
    let mut env = test_env("wp");
    env.config.wp_bin = write_fake_wp(&env.root, "echo '6.5.2'");
    let (wp, _) = runner(env.config.clone());

    let value = wp
        .run(&args(&["core", "version"]), false)
        .await
        .expect("run");
    assert_eq!(value, Value::String("6.5.2".to_string()));
}

#[tokio::test]
async fn nonzero_exit_surfaces_stderr() {
    let _guard = ENV_LOCK.lock().await;
    let mut env = test_env("wp");
    env.config.wp_bin = write_fake_wp(&env.root, "echo 'Error: no such plugin' >&2\nexit 1");
    let (wp, _) = runner(env.config.clone());

    let err = wp
        .run(&args(&["plugin", "activate", "nope"]), false)
        .await
        .expect_err("must fail");
    assert_eq!(err.kind, ToolErrorKind::External);
    assert!(err.message.contains("WP-CLI Error: Error: no such plugin"));
}

#[tokio::test]
async fn hung_command_is_killed_on_timeout() {
    let _guard = ENV_LOCK.lock().await;
    let mut env = test_env("wp");
    env.config.wp_bin = write_fake_wp(&env.root, "sleep 30");
    env.config.command_timeout_ms = 200;
    let (wp, _) = runner(env.config.clone());

    let err = wp
        .run(&args(&["core", "version"]), false)
        .await
        .expect_err("must time out");
    assert_eq!(err.kind, ToolErrorKind::Timeout);
    assert!(err.message.contains("timed out after 200ms"));
    assert!(err.retryable);
}

#[tokio::test]
async fn empty_stdout_decodes_to_empty_object() {
    let _guard = ENV_LOCK.lock().await;
    let mut env = test_env("wp");
    env.config.wp_bin = write_fake_wp(&env.root, "exit 0");
    let (wp, _) = runner(env.config.clone());

    let value = wp.run(&args(&["cli", "info"]), true).await.expect("run");
    assert_eq!(value, serde_json::json!({}));
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let _guard = ENV_LOCK.lock().await;
    let mut env = test_env("wp");
    env.config.wp_bin = write_fake_wp(&env.root, "echo 'PHP Warning: boom'");
    let (wp, _) = runner(env.config.clone());

    let err = wp
        .run(&args(&["plugin", "list", "--format=json"]), true)
        .await
        .expect_err("must fail decode");
    assert_eq!(err.kind, ToolErrorKind::Decode);
    assert!(err.message.contains("WP-CLI JSON Decode Error"));
}

#[tokio::test]
async fn breaker_opens_after_consecutive_failures_and_stops_spawning() {
    let _guard = ENV_LOCK.lock().await;
    let mut env = test_env("wp");
    let counter = env.root.join("calls");
    env.config.wp_bin = write_fake_wp(
        &env.root,
        &format!("echo x >> {}\nexit 1", counter.display()),
    );
    let (wp, breaker) = runner(env.config.clone());

    for _ in 0..5 {
        let err = wp
            .run(&args(&["core", "version"]), false)
            .await
            .expect_err("failing command");
        assert_eq!(err.kind, ToolErrorKind::External);
    }
    assert_eq!(breaker.state(), BreakerState::Open);

    let err = wp
        .run(&args(&["core", "version"]), false)
        .await
        .expect_err("rejected by breaker");
    assert_eq!(err.kind, ToolErrorKind::CircuitOpen);
    assert!(err.retryable);

    let calls = std::fs::read_to_string(&counter).expect("counter file");
    assert_eq!(calls.lines().count(), 5, "no process spawned while open");
}

#[tokio::test]
async fn breaker_recovers_through_a_successful_trial_call() {
    let _guard = ENV_LOCK.lock().await;
    let mut env = test_env("wp");
    let flag = env.root.join("failing");
    std::fs::write(&flag, "").expect("flag file");
    env.config.wp_bin = write_fake_wp(
        &env.root,
        &format!(
            "if [ -e {} ]; then echo down >&2; exit 1; fi\necho ok",
            flag.display()
        ),
    );
    env.config.breaker_recovery_ms = 50;
    let (wp, breaker) = runner(env.config.clone());

    for _ in 0..5 {
        let _ = wp.run(&args(&["core", "version"]), false).await;
    }
    assert_eq!(breaker.state(), BreakerState::Open);

    // Backend recovers, then the window elapses.
    std::fs::remove_file(&flag).expect("clear flag");
    tokio::time::sleep(std::time::Duration::from_millis(80)).await;

    let value = wp
        .run(&args(&["core", "version"]), false)
        .await
        .expect("trial call passes");
    assert_eq!(value, Value::String("ok".to_string()));
    assert_eq!(breaker.state(), BreakerState::Closed);
}

#[tokio::test]
async fn failed_trial_call_reopens_the_breaker() {
    let _guard = ENV_LOCK.lock().await;
    let mut env = test_env("wp");
    env.config.wp_bin = write_fake_wp(&env.root, "echo down >&2\nexit 1");
    env.config.breaker_recovery_ms = 50;
    let (wp, breaker) = runner(env.config.clone());

    for _ in 0..5 {
        let _ = wp.run(&args(&["core", "version"]), false).await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(80)).await;

    let err = wp
        .run(&args(&["core", "version"]), false)
        .await
        .expect_err("trial fails");
    assert_eq!(err.kind, ToolErrorKind::External);
    assert_eq!(breaker.state(), BreakerState::Open);
}

mod common;
use common::{test_env, write_fake_wp, ENV_LOCK};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use wp_agent::app::App;
use wp_agent::http::build_router;

fn router_for(config: wp_agent::config::AgentConfig) -> Router {
    let app = App::initialize(config).expect("app init");
    build_router(&app)
}

async fn post_task(router: Router, api_key: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/a2a/task")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    let response = router
        .oneshot(builder.body(Body::from(body.to_string())).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn create_post_round_trip() {
    let _guard = ENV_LOCK.lock().await;
    let mut env = test_env("wp");
    env.config.wp_bin = write_fake_wp(&env.root, "echo 123");
    let router = router_for(env.config.clone());

    let (status, body) = post_task(
        router,
        Some("test-key"),
        &json!({
            "tool": "create_wordpress_post",
            "args": {"title": "Hello", "content": "World", "status": "draft"}
        })
        .to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status").and_then(Value::as_str), Some("success"));
    assert_eq!(body.get("post_id").and_then(Value::as_str), Some("123"));
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Post created successfully with ID: 123")
    );
}

#[tokio::test]
async fn missing_api_key_is_401() {
    let _guard = ENV_LOCK.lock().await;
    let env = test_env("wp");
    let router = router_for(env.config.clone());

    let (status, body) = post_task(
        router,
        None,
        &json!({"tool": "get_system_information"}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.get("status").and_then(Value::as_str), Some("error"));
    assert!(body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("Invalid or missing API Key"));
}

#[tokio::test]
async fn wrong_api_key_is_401() {
    let _guard = ENV_LOCK.lock().await;
    let env = test_env("wp");
    let router = router_for(env.config.clone());

    let (status, _) = post_task(
        router,
        Some("wrong"),
        &json!({"tool": "get_system_information"}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_tool_is_404() {
    let _guard = ENV_LOCK.lock().await;
    let env = test_env("wp");
    let router = router_for(env.config.clone());

    let (status, body) = post_task(
        router,
        Some("test-key"),
        &json!({"tool": "drop_database"}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("Unknown tool: drop_database"));
}

#[tokio::test]
async fn invalid_json_body_is_400() {
    let _guard = ENV_LOCK.lock().await;
    let env = test_env("wp");
    let router = router_for(env.config.clone());

    let (status, body) = post_task(router, Some("test-key"), "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("Invalid JSON payload"));
}

#[tokio::test]
async fn missing_tool_field_is_400() {
    let _guard = ENV_LOCK.lock().await;
    let env = test_env("wp");
    let router = router_for(env.config.clone());

    let (status, body) = post_task(
        router,
        Some("test-key"),
        &json!({"args": {"title": "x"}}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("Missing 'tool' field"));
}

#[tokio::test]
async fn invalid_tool_arguments_are_400_with_detail() {
    let _guard = ENV_LOCK.lock().await;
    let env = test_env("wp");
    let router = router_for(env.config.clone());

    let (status, body) = post_task(
        router,
        Some("test-key"),
        &json!({
            "tool": "create_wordpress_post",
            "args": {"content": "no title"}
        })
        .to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    assert!(message.contains("Invalid tool arguments"));
    assert!(message.contains("Missing required argument: title"));
}

#[tokio::test]
async fn sandbox_denial_is_a_business_error_with_200() {
    let _guard = ENV_LOCK.lock().await;
    let env = test_env("wp");
    let router = router_for(env.config.clone());

    let (status, body) = post_task(
        router,
        Some("test-key"),
        &json!({
            "tool": "read_file",
            "args": {"file_path": "../../etc/passwd"}
        })
        .to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status").and_then(Value::as_str), Some("error"));
    assert!(body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("outside allowed directory"));
}

#[tokio::test]
async fn external_tool_failure_is_a_business_error_with_200() {
    let _guard = ENV_LOCK.lock().await;
    let mut env = test_env("wp");
    env.config.wp_bin = write_fake_wp(&env.root, "echo 'Error: plugin not found' >&2\nexit 1");
    let router = router_for(env.config.clone());

    let (status, body) = post_task(
        router,
        Some("test-key"),
        &json!({
            "tool": "activate_wordpress_plugin",
            "args": {"plugin_slug": "nope"}
        })
        .to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status").and_then(Value::as_str), Some("error"));
    assert!(body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("WP-CLI Error"));
}

#[tokio::test]
async fn unauthenticated_mode_allows_requests_without_key() {
    let _guard = ENV_LOCK.lock().await;
    let mut env = test_env("wp");
    env.config.api_key = None;
    env.config.wp_bin = write_fake_wp(&env.root, "echo '[]'");
    let router = router_for(env.config.clone());

    let (status, body) = post_task(
        router,
        None,
        &json!({"tool": "list_wordpress_plugins"}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status").and_then(Value::as_str), Some("success"));
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let _guard = ENV_LOCK.lock().await;
    let env = test_env("wp");
    let router = router_for(env.config.clone());

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body.get("status").and_then(Value::as_str), Some("healthy"));
}

use crate::app::App;
use crate::constants::limits;
use crate::errors::{ToolError, ToolErrorKind};
use crate::services::tool_executor::ToolExecutor;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
struct HttpState {
    tool_executor: Arc<ToolExecutor>,
}

/// Maps dispatch failures onto transport status codes. Business errors never
/// reach this function; handlers fold them into `{status: error}` envelopes
/// that go out as 200.
fn error_response(err: &ToolError) -> Response {
    let status = match err.kind {
        ToolErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ToolErrorKind::InvalidParams => StatusCode::BAD_REQUEST,
        ToolErrorKind::NotFound => StatusCode::NOT_FOUND,
        ToolErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    let body = json!({ "status": "error", "message": err.message });
    (status, Json(body)).into_response()
}

async fn a2a_task(
    State(state): State<HttpState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let api_key = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());
    match state.tool_executor.dispatch(api_key, &body).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "message": "Agent is running" }))
}

pub fn build_router(app: &App) -> Router {
    let state = HttpState {
        tool_executor: app.tool_executor.clone(),
    };
    Router::new()
        .route("/a2a/task", post(a2a_task))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(limits::MAX_BODY_BYTES))
        .with_state(state)
}

pub async fn start_server(app: App) -> Result<(), ToolError> {
    let addr = format!("{}:{}", app.config.host, app.config.port);
    let router = build_router(&app);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|err| ToolError::internal(format!("Failed to bind {}: {}", addr, err)))?;
    app.logger.info(
        "A2A agent listening",
        Some(&json!({ "addr": addr })),
    );
    axum::serve(listener, router)
        .await
        .map_err(|err| ToolError::internal(format!("HTTP server error: {}", err)))
}

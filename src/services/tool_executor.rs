use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{ToolError, ToolErrorKind};
use crate::services::auth::AuthGate;
use crate::services::logger::Logger;

/// Every tool in the catalog. Closed at build time; `App::initialize`
/// verifies each name has a wired handler.
pub const TOOL_CATALOG: &[&str] = &[
    "get_system_information",
    "create_wordpress_post",
    "install_wordpress_plugin",
    "activate_wordpress_plugin",
    "deactivate_wordpress_plugin",
    "delete_wordpress_plugin",
    "list_wordpress_plugins",
    "install_wordpress_theme",
    "activate_wordpress_theme",
    "delete_wordpress_theme",
    "list_wordpress_themes",
    "get_active_wordpress_theme",
    "get_wordpress_option",
    "update_wordpress_option",
    "read_file",
    "edit_file",
    "append_to_file",
];

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError>;
}

/// Maps tool names to handlers and normalizes every outcome into the uniform
/// envelope contract: handlers return `{status: success, ...}` or a business
/// `{status: error, message}`; the dispatcher owns auth, payload parsing,
/// lookup, and the catch-all for unexpected faults.
pub struct ToolExecutor {
    logger: Logger,
    auth: Arc<AuthGate>,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(
        logger: Logger,
        auth: Arc<AuthGate>,
        handlers: HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Self {
        Self {
            logger: logger.child("executor"),
            auth,
            handlers: Arc::new(handlers),
        }
    }

    pub fn has_handler(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    /// Full dispatch path for one inbound request body.
    pub async fn dispatch(&self, api_key: Option<&str>, body: &[u8]) -> Result<Value, ToolError> {
        self.auth.check(api_key)?;

        let payload: Value = serde_json::from_slice(body)
            .map_err(|_| ToolError::invalid_params("Invalid JSON payload"))?;
        let Some(request) = payload.as_object() else {
            return Err(ToolError::invalid_params("Invalid JSON payload"));
        };
        let tool = request
            .get("tool")
            .and_then(|v| v.as_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ToolError::invalid_params("Missing 'tool' field in request"))?;
        let args = request.get("args").cloned().unwrap_or(Value::Null);

        self.execute(tool, args).await
    }

    pub async fn execute(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let handler = self
            .handlers
            .get(tool)
            .ok_or_else(|| ToolError::not_found(format!("Unknown tool: {}", tool)))?;

        let task_id = uuid::Uuid::new_v4().to_string();
        self.logger.info(
            "Received A2A task",
            Some(&serde_json::json!({"tool": tool, "task_id": task_id})),
        );
        let started = chrono::Utc::now().timestamp_millis();

        match handler.handle(tool, args).await {
            Ok(envelope) => {
                self.logger.debug(
                    "Tool completed",
                    Some(&serde_json::json!({
                        "tool": tool,
                        "task_id": task_id,
                        "duration_ms": chrono::Utc::now().timestamp_millis() - started,
                    })),
                );
                Ok(envelope)
            }
            Err(err) if err.kind == ToolErrorKind::InvalidParams => {
                self.logger.warn(
                    "Tool argument error",
                    Some(&serde_json::json!({"tool": tool, "error": err.message})),
                );
                Err(ToolError::invalid_params(format!(
                    "Invalid tool arguments: {}",
                    err.message
                )))
            }
            Err(err) => {
                // Full detail stays server-side; the caller gets a generic
                // message with no paths, argv, or secrets.
                self.logger.error(
                    "Unhandled error in tool",
                    Some(&serde_json::json!({
                        "tool": tool,
                        "task_id": task_id,
                        "kind": err.kind,
                        "error": err.message,
                    })),
                );
                Err(ToolError::internal("An internal error occurred"))
            }
        }
    }
}

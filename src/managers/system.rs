use crate::constants::families;
use crate::errors::ToolError;
use crate::managers::business_result;
use crate::managers::wp_cli::WpCliRunner;
use crate::services::logger::Logger;
use serde_json::Value;
use std::sync::Arc;

/// Version introspection across the host, PHP, WordPress, and WP-CLI.
pub struct SystemManager {
    logger: Logger,
    wp: Arc<WpCliRunner>,
}

impl SystemManager {
    pub fn new(logger: Logger, wp: Arc<WpCliRunner>) -> Self {
        Self {
            logger: logger.child("system"),
            wp,
        }
    }

    async fn os_version(&self) -> String {
        let output = tokio::process::Command::new("uname")
            .arg("-a")
            .output()
            .await;
        match output {
            Ok(out) if out.status.success() => {
                String::from_utf8_lossy(&out.stdout).trim().to_string()
            }
            _ => "N/A".to_string(),
        }
    }

    async fn get_system_information(&self) -> Result<Value, ToolError> {
        let os_version = self.os_version().await;

        let cli_info = self
            .wp
            .run_cached(
                families::SYSTEM,
                &[
                    "cli".to_string(),
                    "info".to_string(),
                    "--format=json".to_string(),
                ],
                true,
            )
            .await?;
        let php_version = cli_info
            .get("php_version")
            .and_then(|v| v.as_str())
            .unwrap_or("N/A")
            .to_string();

        let wordpress_version = self
            .wp
            .run_cached(
                families::SYSTEM,
                &["core".to_string(), "version".to_string()],
                false,
            )
            .await?;
        let wp_cli_version = self
            .wp
            .run_cached(
                families::SYSTEM,
                &["cli".to_string(), "version".to_string()],
                false,
            )
            .await?;

        Ok(serde_json::json!({
            "status": "success",
            "data": {
                "os_version": os_version,
                "php_version": php_version,
                "wordpress_version": wordpress_version,
                "wp_cli_version": wp_cli_version,
            },
        }))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for SystemManager {
    async fn handle(&self, tool: &str, _args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle", Some(&Value::String(tool.to_string())));
        business_result(self.get_system_information().await)
    }
}

use crate::constants::families;
use crate::errors::ToolError;
use crate::managers::business_result;
use crate::managers::wp_cli::WpCliRunner;
use crate::services::logger::Logger;
use crate::services::validation::{FieldKind, FieldSpec, Validation};
use serde_json::Value;
use std::sync::Arc;

/// Plugin lifecycle: install (optionally pinned to a version), activate,
/// deactivate, delete, list. Mutations evict the plugin cache family.
pub struct PluginManager {
    logger: Logger,
    validation: Validation,
    wp: Arc<WpCliRunner>,
}

impl PluginManager {
    pub fn new(logger: Logger, validation: Validation, wp: Arc<WpCliRunner>) -> Self {
        Self {
            logger: logger.child("plugins"),
            validation,
            wp,
        }
    }

    fn extract_slug(&self, args: &Value) -> Result<String, ToolError> {
        let fields = self
            .validation
            .extract(args, &[FieldSpec::required("plugin_slug", FieldKind::Str)])?;
        self.validation
            .ensure_string(&fields["plugin_slug"], "plugin_slug")
    }

    async fn install(&self, args: &Value) -> Result<Value, ToolError> {
        let fields = self.validation.extract(
            args,
            &[
                FieldSpec::required("plugin_slug", FieldKind::Str),
                FieldSpec::optional("version", FieldKind::Str),
            ],
        )?;
        let slug = self
            .validation
            .ensure_string(&fields["plugin_slug"], "plugin_slug")?;
        let mut argv = vec!["plugin".to_string(), "install".to_string(), slug];
        if let Some(version) = fields.get("version").and_then(|v| v.as_str()) {
            argv.push("--version".to_string());
            argv.push(version.to_string());
        }
        let result = self.wp.run_mutating(families::PLUGINS, &argv, false).await?;
        Ok(message_envelope(&result))
    }

    async fn lifecycle(&self, action: &str, args: &Value) -> Result<Value, ToolError> {
        let slug = self.extract_slug(args)?;
        let argv = vec!["plugin".to_string(), action.to_string(), slug];
        let result = self.wp.run_mutating(families::PLUGINS, &argv, false).await?;
        Ok(message_envelope(&result))
    }

    async fn list(&self) -> Result<Value, ToolError> {
        let argv = vec![
            "plugin".to_string(),
            "list".to_string(),
            "--format=json".to_string(),
        ];
        let plugins = self.wp.run_cached(families::PLUGINS, &argv, true).await?;
        Ok(serde_json::json!({ "status": "success", "data": plugins }))
    }
}

pub(crate) fn message_envelope(result: &Value) -> Value {
    serde_json::json!({
        "status": "success",
        "message": result.as_str().unwrap_or_default(),
    })
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for PluginManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle", Some(&Value::String(tool.to_string())));
        let result = match tool {
            "install_wordpress_plugin" => self.install(&args).await,
            "activate_wordpress_plugin" => self.lifecycle("activate", &args).await,
            "deactivate_wordpress_plugin" => self.lifecycle("deactivate", &args).await,
            "delete_wordpress_plugin" => self.lifecycle("delete", &args).await,
            "list_wordpress_plugins" => self.list().await,
            other => Err(ToolError::internal(format!(
                "Plugin handler wired to unknown tool: {}",
                other
            ))),
        };
        business_result(result)
    }
}

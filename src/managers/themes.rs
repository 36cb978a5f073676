use crate::constants::families;
use crate::errors::ToolError;
use crate::managers::business_result;
use crate::managers::plugins::message_envelope;
use crate::managers::wp_cli::WpCliRunner;
use crate::services::logger::Logger;
use crate::services::validation::{FieldKind, FieldSpec, Validation};
use serde_json::Value;
use std::sync::Arc;

pub struct ThemeManager {
    logger: Logger,
    validation: Validation,
    wp: Arc<WpCliRunner>,
}

impl ThemeManager {
    pub fn new(logger: Logger, validation: Validation, wp: Arc<WpCliRunner>) -> Self {
        Self {
            logger: logger.child("themes"),
            validation,
            wp,
        }
    }

    fn extract_slug(&self, args: &Value) -> Result<String, ToolError> {
        let fields = self
            .validation
            .extract(args, &[FieldSpec::required("theme_slug", FieldKind::Str)])?;
        self.validation
            .ensure_string(&fields["theme_slug"], "theme_slug")
    }

    async fn install(&self, args: &Value) -> Result<Value, ToolError> {
        let fields = self.validation.extract(
            args,
            &[
                FieldSpec::required("theme_slug", FieldKind::Str),
                FieldSpec::optional("version", FieldKind::Str),
            ],
        )?;
        let slug = self
            .validation
            .ensure_string(&fields["theme_slug"], "theme_slug")?;
        let mut argv = vec!["theme".to_string(), "install".to_string(), slug];
        if let Some(version) = fields.get("version").and_then(|v| v.as_str()) {
            argv.push("--version".to_string());
            argv.push(version.to_string());
        }
        let result = self.wp.run_mutating(families::THEMES, &argv, false).await?;
        Ok(message_envelope(&result))
    }

    async fn lifecycle(&self, action: &str, args: &Value) -> Result<Value, ToolError> {
        let slug = self.extract_slug(args)?;
        let argv = vec!["theme".to_string(), action.to_string(), slug];
        let result = self.wp.run_mutating(families::THEMES, &argv, false).await?;
        Ok(message_envelope(&result))
    }

    async fn list(&self) -> Result<Value, ToolError> {
        let argv = vec![
            "theme".to_string(),
            "list".to_string(),
            "--format=json".to_string(),
        ];
        let themes = self.wp.run_cached(families::THEMES, &argv, true).await?;
        Ok(serde_json::json!({ "status": "success", "data": themes }))
    }

    async fn active(&self) -> Result<Value, ToolError> {
        let argv = vec![
            "theme".to_string(),
            "list".to_string(),
            "--status=active".to_string(),
            "--format=json".to_string(),
        ];
        let themes = self.wp.run_cached(families::THEMES, &argv, true).await?;
        let active = themes
            .as_array()
            .and_then(|list| list.first())
            .cloned()
            .unwrap_or(Value::Null);
        Ok(serde_json::json!({ "status": "success", "data": active }))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for ThemeManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle", Some(&Value::String(tool.to_string())));
        let result = match tool {
            "install_wordpress_theme" => self.install(&args).await,
            "activate_wordpress_theme" => self.lifecycle("activate", &args).await,
            "delete_wordpress_theme" => self.lifecycle("delete", &args).await,
            "list_wordpress_themes" => self.list().await,
            "get_active_wordpress_theme" => self.active().await,
            other => Err(ToolError::internal(format!(
                "Theme handler wired to unknown tool: {}",
                other
            ))),
        };
        business_result(result)
    }
}

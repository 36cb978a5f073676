use crate::constants::families;
use crate::errors::ToolError;
use crate::managers::business_result;
use crate::managers::plugins::message_envelope;
use crate::managers::wp_cli::WpCliRunner;
use crate::services::logger::Logger;
use crate::services::validation::{FieldKind, FieldSpec, Validation};
use serde_json::Value;
use std::sync::Arc;

pub struct OptionManager {
    logger: Logger,
    validation: Validation,
    wp: Arc<WpCliRunner>,
}

impl OptionManager {
    pub fn new(logger: Logger, validation: Validation, wp: Arc<WpCliRunner>) -> Self {
        Self {
            logger: logger.child("options"),
            validation,
            wp,
        }
    }

    async fn get_option(&self, args: &Value) -> Result<Value, ToolError> {
        let fields = self
            .validation
            .extract(args, &[FieldSpec::required("option_name", FieldKind::Str)])?;
        let name = self
            .validation
            .ensure_string(&fields["option_name"], "option_name")?;
        let argv = vec![
            "option".to_string(),
            "get".to_string(),
            name.clone(),
            "--format=json".to_string(),
        ];
        let value = self.wp.run_cached(families::OPTIONS, &argv, true).await?;
        Ok(serde_json::json!({
            "status": "success",
            "option_name": name,
            "value": value,
        }))
    }

    async fn update_option(&self, args: &Value) -> Result<Value, ToolError> {
        let fields = self.validation.extract(
            args,
            &[
                FieldSpec::required("option_name", FieldKind::Str),
                FieldSpec::required("option_value", FieldKind::Any),
            ],
        )?;
        let name = self
            .validation
            .ensure_string(&fields["option_name"], "option_name")?;
        let value = &fields["option_value"];

        let mut argv = vec!["option".to_string(), "update".to_string(), name];
        // Structured values travel as JSON; scalars as their string form.
        match value {
            Value::Object(_) | Value::Array(_) => {
                argv.push(serde_json::to_string(value).map_err(|err| {
                    ToolError::invalid_params(format!("option_value is not serializable: {}", err))
                })?);
                argv.push("--format=json".to_string());
            }
            Value::String(text) => argv.push(text.clone()),
            other => argv.push(other.to_string()),
        }
        let result = self.wp.run_mutating(families::OPTIONS, &argv, false).await?;
        Ok(message_envelope(&result))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for OptionManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle", Some(&Value::String(tool.to_string())));
        let result = match tool {
            "get_wordpress_option" => self.get_option(&args).await,
            "update_wordpress_option" => self.update_option(&args).await,
            other => Err(ToolError::internal(format!(
                "Option handler wired to unknown tool: {}",
                other
            ))),
        };
        business_result(result)
    }
}

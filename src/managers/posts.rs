use crate::constants::{families, limits, wordpress};
use crate::errors::ToolError;
use crate::managers::business_result;
use crate::managers::wp_cli::WpCliRunner;
use crate::services::logger::Logger;
use crate::services::validation::{FieldKind, FieldSpec, Validation};
use crate::utils::text::truncate_chars;
use serde_json::Value;
use std::sync::Arc;

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub struct PostManager {
    logger: Logger,
    validation: Validation,
    wp: Arc<WpCliRunner>,
}

impl PostManager {
    pub fn new(logger: Logger, validation: Validation, wp: Arc<WpCliRunner>) -> Self {
        Self {
            logger: logger.child("posts"),
            validation,
            wp,
        }
    }

    async fn create_post(&self, args: &Value) -> Result<Value, ToolError> {
        let fields = self.validation.extract(
            args,
            &[
                FieldSpec::required("title", FieldKind::Str),
                FieldSpec::required("content", FieldKind::Str),
                FieldSpec::with_default("status", FieldKind::Str, Value::String("publish".into())),
                FieldSpec::with_default("post_type", FieldKind::Str, Value::String("post".into())),
            ],
        )?;

        let title = truncate_chars(
            fields["title"].as_str().unwrap_or_default(),
            limits::MAX_TITLE_CHARS,
        );
        let content = truncate_chars(
            fields["content"].as_str().unwrap_or_default(),
            limits::MAX_CONTENT_CHARS,
        );
        let status = self.validation.ensure_enum(
            fields["status"].as_str().unwrap_or_default(),
            "status",
            wordpress::POST_STATUSES,
        )?;
        let post_type = self.validation.ensure_enum(
            fields["post_type"].as_str().unwrap_or_default(),
            "post_type",
            wordpress::POST_TYPES,
        )?;

        let argv = vec![
            "post".to_string(),
            "create".to_string(),
            format!("--post_title={}", title),
            format!("--post_content={}", content),
            format!("--post_status={}", status),
            format!("--post_type={}", post_type),
            // Porcelain output is just the new post id.
            "--porcelain".to_string(),
        ];
        let output = self.wp.run_mutating(families::POSTS, &argv, false).await?;
        let post_id = output.as_str().unwrap_or_default().trim().to_string();

        Ok(serde_json::json!({
            "status": "success",
            "message": format!(
                "{} created successfully with ID: {}",
                capitalize(&post_type),
                post_id
            ),
            "post_id": post_id,
        }))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for PostManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle", Some(&Value::String(tool.to_string())));
        business_result(self.create_post(&args).await)
    }
}

use crate::config::AgentConfig;
use crate::constants::limits;
use crate::errors::ToolError;
use crate::managers::business_result;
use crate::services::logger::Logger;
use crate::services::validation::{FieldKind, FieldSpec, Validation};
use crate::utils::fs_atomic::{atomic_write_binary_file, backup_file};
use crate::utils::sandbox::{ensure_allowed_extension, resolve_sandbox_path};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Sandboxed file tools. Every path is resolved against the sandbox root
/// before any filesystem access; write-type tools additionally require an
/// allow-listed extension and take a timestamped backup of the previous
/// content before mutating anything.
pub struct FileManager {
    logger: Logger,
    validation: Validation,
    config: Arc<AgentConfig>,
}

fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

fn last_modified_rfc3339(path: &Path) -> Option<String> {
    let modified = std::fs::metadata(path).and_then(|meta| meta.modified()).ok()?;
    Some(DateTime::<Utc>::from(modified).to_rfc3339())
}

impl FileManager {
    pub fn new(logger: Logger, validation: Validation, config: Arc<AgentConfig>) -> Self {
        Self {
            logger: logger.child("files"),
            validation,
            config,
        }
    }

    fn extract_path(&self, args: &Value) -> Result<(String, PathBuf), ToolError> {
        let fields = self
            .validation
            .extract(args, &[FieldSpec::required("file_path", FieldKind::Str)])?;
        let raw = self
            .validation
            .ensure_string(&fields["file_path"], "file_path")?;
        let resolved = resolve_sandbox_path(&self.config.sandbox_root, &raw)?;
        Ok((raw, resolved))
    }

    fn extract_path_and_content(&self, args: &Value) -> Result<(String, PathBuf, String), ToolError> {
        let fields = self.validation.extract(
            args,
            &[
                FieldSpec::required("file_path", FieldKind::Str),
                FieldSpec::required("content", FieldKind::Str),
            ],
        )?;
        let raw = self
            .validation
            .ensure_string(&fields["file_path"], "file_path")?;
        let content = fields["content"].as_str().unwrap_or_default().to_string();
        if content.len() > self.config.max_file_bytes {
            return Err(ToolError::too_large(format!(
                "Content exceeds maximum allowed size of {} bytes",
                self.config.max_file_bytes
            )));
        }
        let resolved = resolve_sandbox_path(&self.config.sandbox_root, &raw)?;
        Ok((raw, resolved, content))
    }

    async fn read_file(&self, args: &Value) -> Result<Value, ToolError> {
        let (raw, path) = self.extract_path(args)?;

        if !path.exists() {
            return Err(ToolError::not_found(format!("File not found: {}", raw)));
        }
        if !path.is_file() {
            return Err(ToolError::not_a_file(format!("Path is not a file: {}", raw)));
        }
        let size = tokio::fs::metadata(&path).await?.len();
        if size > self.config.max_file_bytes as u64 {
            return Err(ToolError::too_large(format!(
                "File exceeds maximum allowed size of {} bytes",
                self.config.max_file_bytes
            )));
        }

        let bytes = tokio::fs::read(&path).await?;
        Ok(serde_json::json!({
            "status": "success",
            "file_path": raw,
            "content": String::from_utf8_lossy(&bytes),
            "size": bytes.len(),
            "sha256": sha256_hex(&bytes),
            "last_modified": last_modified_rfc3339(&path),
        }))
    }

    async fn edit_file(&self, args: &Value) -> Result<Value, ToolError> {
        let (raw, path, content) = self.extract_path_and_content(args)?;
        ensure_allowed_extension(&path, &self.config.allowed_extensions)?;

        let backup_path = if path.is_file() {
            let backup = backup_file(&path, &self.config.backup_dir).map_err(|err| {
                ToolError::external(format!("Failed to back up file before writing: {}", err))
            })?;
            self.logger.info(
                "Backup created",
                Some(&serde_json::json!({"backup": backup.display().to_string()})),
            );
            Some(backup.display().to_string())
        } else {
            None
        };

        atomic_write_binary_file(&path, content.as_bytes(), limits::FILE_MODE)?;

        // Read back and compare: the write is only reported as a success once
        // the bytes on disk match what was requested.
        let written = tokio::fs::read(&path).await?;
        if written != content.as_bytes() {
            return Err(ToolError::integrity(format!(
                "Verification failed after writing file: {}",
                raw
            )));
        }

        Ok(serde_json::json!({
            "status": "success",
            "message": format!("File '{}' written successfully.", raw),
            "backup_path": backup_path,
            "size": written.len(),
            "sha256": sha256_hex(&written),
        }))
    }

    async fn append_to_file(&self, args: &Value) -> Result<Value, ToolError> {
        let (raw, path, content) = self.extract_path_and_content(args)?;
        ensure_allowed_extension(&path, &self.config.allowed_extensions)?;

        let backup_path = if path.is_file() {
            let backup = backup_file(&path, &self.config.backup_dir).map_err(|err| {
                ToolError::external(format!("Failed to back up file before writing: {}", err))
            })?;
            Some(backup.display().to_string())
        } else {
            None
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut options = tokio::fs::OpenOptions::new();
        options.append(true).create(true);
        let mut file = options.open(&path).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, content.as_bytes()).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;

        Ok(serde_json::json!({
            "status": "success",
            "message": format!("Content appended to file '{}' successfully.", raw),
            "backup_path": backup_path,
        }))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for FileManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle", Some(&Value::String(tool.to_string())));
        let result = match tool {
            "read_file" => self.read_file(&args).await,
            "edit_file" => self.edit_file(&args).await,
            "append_to_file" => self.append_to_file(&args).await,
            other => Err(ToolError::internal(format!(
                "File handler wired to unknown tool: {}",
                other
            ))),
        };
        business_result(result)
    }
}

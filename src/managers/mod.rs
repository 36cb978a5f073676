pub mod files;
pub mod options;
pub mod plugins;
pub mod posts;
pub mod system;
pub mod themes;
pub mod wp_cli;

use crate::errors::{ToolError, ToolErrorKind};
use serde_json::Value;

pub(crate) fn error_envelope(message: &str) -> Value {
    serde_json::json!({ "status": "error", "message": message })
}

/// Handlers surface anticipated failures (external tool errors, sandbox
/// denials, file preconditions) as `{status: error}` envelopes rather than
/// raising. Only validation errors and truly unexpected faults escape to the
/// dispatcher.
pub(crate) fn business_result(result: Result<Value, ToolError>) -> Result<Value, ToolError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if matches!(err.kind, ToolErrorKind::InvalidParams | ToolErrorKind::Internal) => {
            Err(err)
        }
        Err(err) => Ok(error_envelope(&err.message)),
    }
}

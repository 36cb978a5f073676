use crate::errors::ToolError;
use crate::services::logger::Logger;

/// Compares the presented `X-API-KEY` against the configured secret. When no
/// secret is configured the gate stays open and every pass is logged as a
/// degraded-mode warning, matching the original deployment's dev behavior.
pub struct AuthGate {
    logger: Logger,
    api_key: Option<String>,
}

impl AuthGate {
    pub fn new(logger: Logger, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            logger.error("A2A_API_KEY not set. Agent will not be secured.", None);
        }
        Self {
            logger: logger.child("auth"),
            api_key,
        }
    }

    pub fn check(&self, presented: Option<&str>) -> Result<(), ToolError> {
        let Some(expected) = self.api_key.as_deref() else {
            self.logger
                .warn("API key not set on server, skipping authentication.", None);
            return Ok(());
        };
        match presented {
            Some(key) if key == expected => Ok(()),
            _ => {
                self.logger
                    .warn("Unauthorized access attempt. Invalid API key provided.", None);
                Err(ToolError::unauthorized(
                    "Unauthorized: Invalid or missing API Key",
                ))
            }
        }
    }
}

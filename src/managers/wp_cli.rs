use crate::config::AgentConfig;
use crate::constants::limits;
use crate::errors::ToolError;
use crate::utils::text::truncate_utf8_prefix;
use crate::services::breaker::CircuitBreaker;
use crate::services::cache::CacheService;
use crate::services::logger::Logger;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Builds and executes WP-CLI argument vectors. Every invocation carries the
/// fixed `--path=<wp_path> --allow-root` prefix, runs under the configured
/// timeout, and passes through the shared circuit breaker. Read-style
/// invocations can be memoized per resource family; mutating invocations
/// evict their family from the cache after a successful call.
pub struct WpCliRunner {
    logger: Logger,
    config: Arc<AgentConfig>,
    breaker: Arc<CircuitBreaker>,
    cache: Arc<CacheService>,
}

impl WpCliRunner {
    pub fn new(
        logger: Logger,
        config: Arc<AgentConfig>,
        breaker: Arc<CircuitBreaker>,
        cache: Arc<CacheService>,
    ) -> Self {
        Self {
            logger: logger.child("wp-cli"),
            config,
            breaker,
            cache,
        }
    }

    fn build_argv(&self, args: &[String]) -> Vec<String> {
        let mut argv = vec![
            format!("--path={}", self.config.wp_path.display()),
            "--allow-root".to_string(),
        ];
        argv.extend(args.iter().cloned());
        argv
    }

    /// One breaker-guarded invocation, no caching.
    pub async fn run(&self, args: &[String], decode_json: bool) -> Result<Value, ToolError> {
        self.breaker.before_call()?;
        match self.invoke(args, decode_json).await {
            Ok(value) => {
                self.breaker.record_success();
                Ok(value)
            }
            Err(err) => {
                self.breaker.record_failure();
                Err(err)
            }
        }
    }

    /// Idempotent read: serve from cache within the TTL, invoke and memoize
    /// under the given resource family otherwise.
    pub async fn run_cached(
        &self,
        family: &str,
        args: &[String],
        decode_json: bool,
    ) -> Result<Value, ToolError> {
        let key = CacheService::build_key(&self.build_argv(args));
        if let Some(hit) = self.cache.get(&key) {
            self.logger.debug(
                "Cache hit",
                Some(&serde_json::json!({"family": family})),
            );
            return Ok(hit);
        }
        let value = self.run(args, decode_json).await?;
        self.cache
            .set(family, &key, &value, self.config.cache_ttl_ms);
        Ok(value)
    }

    /// Mutation: invoke, then evict the affected family before returning.
    pub async fn run_mutating(
        &self,
        family: &str,
        args: &[String],
        decode_json: bool,
    ) -> Result<Value, ToolError> {
        let value = self.run(args, decode_json).await?;
        self.cache.invalidate(family);
        Ok(value)
    }

    async fn invoke(&self, args: &[String], decode_json: bool) -> Result<Value, ToolError> {
        let argv = self.build_argv(args);
        self.logger.info(
            "Executing WP-CLI command",
            Some(&serde_json::json!({"args": argv.join(" ")})),
        );

        let mut cmd = tokio::process::Command::new(&self.config.wp_bin);
        cmd.args(&argv);
        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|err| ToolError::external(format!("Failed to spawn WP-CLI: {}", err)))?;

        let mut stdout_reader = child.stdout.take();
        let mut stderr_reader = child.stderr.take();
        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(reader) = stdout_reader.as_mut() {
                let _ = reader.read_to_end(&mut buf).await;
            }
            buf
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(reader) = stderr_reader.as_mut() {
                let _ = reader.read_to_end(&mut buf).await;
            }
            buf
        });

        let timeout = std::time::Duration::from_millis(self.config.command_timeout_ms);
        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(result) => result
                .map_err(|err| ToolError::internal(format!("Failed to wait for WP-CLI: {}", err)))?,
            Err(_) => {
                // Kill, then reap: the process must not be left orphaned.
                let _ = child.kill().await;
                let _ = child.wait().await;
                return Err(ToolError::timeout(format!(
                    "WP-CLI command timed out after {}ms",
                    self.config.command_timeout_ms
                )));
            }
        };

        let stdout_buf = stdout_task.await.unwrap_or_default();
        let stderr_buf = stderr_task.await.unwrap_or_default();
        let stdout = String::from_utf8_lossy(&stdout_buf).trim().to_string();
        let stderr = String::from_utf8_lossy(&stderr_buf).trim().to_string();

        if !status.success() {
            let detail = if stderr.is_empty() { &stdout } else { &stderr };
            self.logger.error(
                "WP-CLI command failed",
                Some(&serde_json::json!({
                    "exit_code": status.code(),
                    "stderr": stderr,
                })),
            );
            return Err(ToolError::external(format!(
                "WP-CLI Error: {}",
                truncate_utf8_prefix(detail, limits::MAX_ERROR_OUTPUT_BYTES)
            )));
        }

        if decode_json {
            if stdout.is_empty() {
                return Ok(serde_json::json!({}));
            }
            return serde_json::from_str(&stdout).map_err(|err| {
                self.logger.error(
                    "Failed to decode JSON from WP-CLI output",
                    Some(&serde_json::json!({"error": err.to_string()})),
                );
                ToolError::decode(format!(
                    "WP-CLI JSON Decode Error: {}",
                    truncate_utf8_prefix(&stdout, limits::MAX_ERROR_OUTPUT_BYTES)
                ))
            });
        }
        Ok(Value::String(stdout))
    }
}

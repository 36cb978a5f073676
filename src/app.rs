use crate::config::AgentConfig;
use crate::errors::ToolError;
use crate::managers::files::FileManager;
use crate::managers::options::OptionManager;
use crate::managers::plugins::PluginManager;
use crate::managers::posts::PostManager;
use crate::managers::system::SystemManager;
use crate::managers::themes::ThemeManager;
use crate::managers::wp_cli::WpCliRunner;
use crate::services::auth::AuthGate;
use crate::services::breaker::CircuitBreaker;
use crate::services::cache::CacheService;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolExecutor, ToolHandler, TOOL_CATALOG};
use crate::services::validation::Validation;
use crate::stores::{FileCacheStore, MemoryCacheStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Wires the service graph once at startup. Everything downstream of the
/// executor is shared through `Arc`; nothing is constructed per request.
pub struct App {
    pub logger: Logger,
    pub config: Arc<AgentConfig>,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    pub fn initialize(config: AgentConfig) -> Result<Self, ToolError> {
        let logger = Logger::new("wp-agent");
        let config = Arc::new(config);
        let validation = Validation::new();

        let auth = Arc::new(AuthGate::new(logger.clone(), config.api_key.clone()));
        let breaker = Arc::new(CircuitBreaker::new(
            logger.clone(),
            config.breaker_failure_threshold,
            config.breaker_recovery_ms,
        ));
        let cache = Arc::new(CacheService::new(
            logger.clone(),
            Arc::new(FileCacheStore::new(config.cache_dir.clone())),
            Arc::new(MemoryCacheStore::new()),
        ));
        let wp = Arc::new(WpCliRunner::new(
            logger.clone(),
            config.clone(),
            breaker,
            cache,
        ));

        let system = Arc::new(SystemManager::new(logger.clone(), wp.clone()));
        let posts = Arc::new(PostManager::new(
            logger.clone(),
            validation.clone(),
            wp.clone(),
        ));
        let plugins = Arc::new(PluginManager::new(
            logger.clone(),
            validation.clone(),
            wp.clone(),
        ));
        let themes = Arc::new(ThemeManager::new(
            logger.clone(),
            validation.clone(),
            wp.clone(),
        ));
        let options = Arc::new(OptionManager::new(logger.clone(), validation.clone(), wp));
        let files = Arc::new(FileManager::new(
            logger.clone(),
            validation,
            config.clone(),
        ));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert("get_system_information".to_string(), system);
        handlers.insert("create_wordpress_post".to_string(), posts);
        for tool in [
            "install_wordpress_plugin",
            "activate_wordpress_plugin",
            "deactivate_wordpress_plugin",
            "delete_wordpress_plugin",
            "list_wordpress_plugins",
        ] {
            handlers.insert(tool.to_string(), plugins.clone());
        }
        for tool in [
            "install_wordpress_theme",
            "activate_wordpress_theme",
            "delete_wordpress_theme",
            "list_wordpress_themes",
            "get_active_wordpress_theme",
        ] {
            handlers.insert(tool.to_string(), themes.clone());
        }
        for tool in ["get_wordpress_option", "update_wordpress_option"] {
            handlers.insert(tool.to_string(), options.clone());
        }
        for tool in ["read_file", "edit_file", "append_to_file"] {
            handlers.insert(tool.to_string(), files.clone());
        }

        Self::validate_tool_wiring(&handlers)?;

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), auth, handlers));
        Ok(Self {
            logger,
            config,
            tool_executor,
        })
    }

    fn validate_tool_wiring(
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        for tool in TOOL_CATALOG {
            if !handlers.contains_key(*tool) {
                return Err(ToolError::internal(format!(
                    "Tool '{}' is in the catalog but has no handler",
                    tool
                )));
            }
        }
        for tool in handlers.keys() {
            if !TOOL_CATALOG.contains(&tool.as_str()) {
                return Err(ToolError::internal(format!(
                    "Handler wired for unknown tool '{}'",
                    tool
                )));
            }
        }
        Ok(())
    }
}

pub mod auth;
pub mod breaker;
pub mod cache;
pub mod logger;
pub mod tool_executor;
pub mod validation;

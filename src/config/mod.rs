// src/config/mod.rs

pub mod app;
pub mod environment;
pub mod loader;
pub mod validation;

pub use app::{AppConfig, PollerConfig, ServerConfig};
pub use environment::EnvironmentConfig;
pub use loader::{apply_env_overrides, load_config};
pub use validation::ConfigValidator;

//! Configuration loading

mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, AppSettings, BroadcastConfig, ConfigError, CorsConfig, DataConfig,
    Environment, JwtConfig, ServerConfig,
};

//! # poll-common
//!
//! Shared utilities including configuration, error handling, admin
//! authentication, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{AdminClaims, JwtService};
pub use config::{
    AdminConfig, AppConfig, AppSettings, BroadcastConfig, ConfigError, CorsConfig, DataConfig,
    Environment, JwtConfig, ServerConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};

//! Application state
//!
//! Shared dependencies for all HTTP and WebSocket handlers. Everything is
//! constructed in the server bootstrap and injected here; there is no
//! ambient module-level state.

use std::sync::Arc;

use poll_common::{AppConfig, JwtService};
use poll_core::traits::RecordStore;

use crate::broadcast::ResultsScheduler;
use crate::connection::ConnectionRegistry;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Durable poll state behind the record store port
    store: Arc<dyn RecordStore>,
    /// Live WebSocket connections
    registry: Arc<ConnectionRegistry>,
    /// Coalescing results broadcaster
    scheduler: Arc<ResultsScheduler>,
    /// Admin token service
    jwt_service: Arc<JwtService>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        store: Arc<dyn RecordStore>,
        registry: Arc<ConnectionRegistry>,
        scheduler: Arc<ResultsScheduler>,
        jwt_service: Arc<JwtService>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            registry,
            scheduler,
            jwt_service,
            config: Arc::new(config),
        }
    }

    /// Get the record store
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Get the connection registry
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Get the results scheduler
    pub fn scheduler(&self) -> &Arc<ResultsScheduler> {
        &self.scheduler
    }

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("registry", &self.registry)
            .field("config", &"AppConfig")
            .finish_non_exhaustive()
    }
}
